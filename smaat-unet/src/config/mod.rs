//! Configuration module.
//!
//! This module provides configuration structures and enums for the model family.
//! It is organized into two main submodules:
//! - `core`: Contains the main configuration structures
//! - `enums`: Contains all enumeration types used in configurations

pub mod core;
pub mod enums;

// Re-export all configuration structures from core
pub use core::{ModelConfig, StageLayout, DEPTH, SPATIAL_MULTIPLE};

// Re-export all enums from enums
pub use enums::{ConvKind, Upsampling, Variant};
