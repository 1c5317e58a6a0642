//! Value Objects

pub mod authority;
pub mod credentials;
pub mod username;
