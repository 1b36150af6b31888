//! Value types and collaborator ports shared by the decision engines.

pub mod geo;
pub mod merchant;
pub mod ports;
pub mod signals;
pub mod tokens;
