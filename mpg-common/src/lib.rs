//! # MPG Common Library
//!
//! Shared code for the MPG chart crates:
//! - Error type
//! - Bootstrap configuration loading
//! - Player field and position vocabulary

pub mod config;
pub mod error;
pub mod fields;

pub use config::{ClientConfig, ColorScheme, TomlConfig};
pub use error::{Error, Result};
pub use fields::{PlayerField, Position, PLAYER_FULL_NAME};
