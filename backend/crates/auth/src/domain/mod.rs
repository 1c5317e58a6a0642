//! Domain Layer

pub mod access;
pub mod entity;
pub mod repository;
pub mod value_object;
