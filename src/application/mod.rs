//! Application layer containing the decision engines.
//!
//! `AppClassifier` and `MerchantResolver` are independent and stateless.
//! `ScanRouter` composes them per scan and picks the response action.

pub mod classifier;
pub mod resolver;
pub mod router;
