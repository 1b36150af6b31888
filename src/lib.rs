//! Scan-code routing for shared merchant QR codes.
//!
//! A scan is classified by client type ([`application::classifier`]) and
//! resolved to one merchant among those sharing its code
//! ([`application::resolver`]). [`application::router`] combines both into a
//! response action for the transport layer.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
