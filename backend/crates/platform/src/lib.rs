//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, Base64, constant-time compare)
//! - Password encoding and verification (tagged multi-algorithm registry)

pub mod crypto;
pub mod password;
