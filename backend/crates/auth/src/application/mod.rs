//! Application Layer

pub mod authenticate;
pub mod config;
