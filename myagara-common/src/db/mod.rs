//! Database pool and schema

pub mod init;

pub use init::*;
