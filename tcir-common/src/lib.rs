//! # TCIR Common Library
//!
//! Shared code for the TCI report workspace including:
//! - Scale and subscale catalog (seven primary scales)
//! - Bootstrap configuration loading (TOML)
//! - Common error types

pub mod config;
pub mod error;
pub mod scales;

pub use error::{Error, Result};
pub use scales::{ScaleCode, ScaleDefinition, SubscaleDefinition};
