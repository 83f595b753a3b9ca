//! Validation and diagnosis of rotation song data against the ability and palette reference tables.

pub mod cli;
pub mod data;
pub mod error;
pub mod report;
pub mod verify;

pub use error::{Result, VerifyError};
