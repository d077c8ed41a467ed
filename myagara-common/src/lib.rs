//! # Myagara Common Library
//!
//! Shared code for the Myagara services:
//! - Error and result types
//! - Configuration file model and root folder resolution
//! - SQLite pool initialization
//! - Timestamp and identifier helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
