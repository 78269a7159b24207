// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while configuring, building or writing a model.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid {name}: {value} (must be a finite value greater than zero)")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Pipe {index} has a non-finite coordinate ({x}, {y}, {z})")]
    NonFiniteCoordinate { index: usize, x: f64, y: f64, z: f64 },

    #[error("Pipe {index} starts at z = {z} m, above the wall height of {wall_height} m")]
    PipeAboveWall {
        index: usize,
        z: f64,
        wall_height: f64,
    },

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ifc_wallgen_core::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Output verification failed: {0}")]
    VerificationFailed(String),

    #[error("Core error: {0}")]
    Core(#[from] ifc_wallgen_core::Error),
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Config(format!("JSON error: {}", err))
    }
}
