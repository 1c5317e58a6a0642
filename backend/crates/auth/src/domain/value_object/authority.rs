//! Authority Value Object
//!
//! An authority is an opaque permission token (`beer.read`,
//! `customer.read`, ...). The store groups authorities into roles; the
//! authentication core only ever sees the flattened set attached to a
//! principal.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// An atomic permission granted to a principal
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(permission: impl Into<String>) -> Self {
        Self(permission.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Authority {
    fn from(permission: &str) -> Self {
        Self::new(permission)
    }
}
