//! Domain Entities

pub mod principal;
pub mod user;
