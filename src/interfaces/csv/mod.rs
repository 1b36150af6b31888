//! Batch CSV surface: scan requests in, routing decisions out.

pub mod decision_writer;
pub mod scan_reader;
