// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generator configuration.
//!
//! Defaults reproduce the reference model: a 500 × 300 × 20 cm wall with
//! three 5 cm pipes. Values can be replaced from a JSON file and individual
//! settings overridden through environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

/// Path to a JSON file deserialized into [`GeneratorConfig`].
pub const CONFIG_ENV: &str = "WALLGEN_CONFIG";
/// Overrides [`GeneratorConfig::output_dir`].
pub const OUTPUT_DIR_ENV: &str = "WALLGEN_OUTPUT_DIR";
/// Overrides [`GeneratorConfig::depth_policy`].
pub const DEPTH_POLICY_ENV: &str = "WALLGEN_DEPTH_POLICY";
/// Overrides [`GeneratorConfig::on_collision`].
pub const COLLISION_ENV: &str = "WALLGEN_ON_COLLISION";
/// Overrides [`GeneratorConfig::guids`].
pub const GUIDS_ENV: &str = "WALLGEN_GUIDS";

/// What to do with a pipe whose base lies above the top of the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPolicy {
    /// Fail the build.
    #[default]
    Reject,
    /// Record a depth of zero.
    Clamp,
    /// Record the negative depth unchanged.
    Legacy,
}

/// What to do when the timestamped output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    #[default]
    Overwrite,
    Error,
    /// Append `_1`, `_2`, ... to the file stem until the name is free.
    Suffix,
}

/// How GlobalIds are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidMode {
    /// Readable identifiers derived from entity kind and sequence index.
    #[default]
    Deterministic,
    /// Compressed 22-character GUIDs from random UUIDs.
    Random,
}

macro_rules! impl_from_str {
    ($ty:ty, $label:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = GeneratorError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(GeneratorError::Config(format!(
                        "unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

impl_from_str!(DepthPolicy, "depth policy", {
    "reject" => DepthPolicy::Reject,
    "clamp" => DepthPolicy::Clamp,
    "legacy" => DepthPolicy::Legacy,
});

impl_from_str!(CollisionPolicy, "collision policy", {
    "overwrite" => CollisionPolicy::Overwrite,
    "error" => CollisionPolicy::Error,
    "suffix" => CollisionPolicy::Suffix,
});

impl_from_str!(GuidMode, "guid mode", {
    "deterministic" => GuidMode::Deterministic,
    "random" => GuidMode::Random,
});

/// Wall dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub length_cm: f64,
    pub height_cm: f64,
    pub thickness_cm: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            length_cm: 500.0,
            height_cm: 300.0,
            thickness_cm: 20.0,
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub wall: WallConfig,
    /// Pipe radius in centimetres.
    pub pipe_radius_cm: f64,
    /// Pipe base positions `[x, y, z]` in centimetres, in creation order.
    pub pipe_positions_cm: Vec<[f64; 3]>,
    pub project_name: String,
    pub author: String,
    pub organization: String,
    pub output_dir: PathBuf,
    pub file_stem: String,
    pub extension: String,
    pub depth_policy: DepthPolicy,
    pub on_collision: CollisionPolicy,
    pub guids: GuidMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            wall: WallConfig::default(),
            pipe_radius_cm: 5.0,
            pipe_positions_cm: vec![
                [50.0, 25.0, 50.0],
                [150.0, 25.0, 100.0],
                [300.0, 25.0, 150.0],
            ],
            project_name: "WallWithPipesProject".into(),
            author: String::new(),
            organization: String::new(),
            output_dir: PathBuf::from("ifc_outputs"),
            file_stem: "wall_with_pipes".into(),
            extension: "ifc".into(),
            depth_policy: DepthPolicy::default(),
            on_collision: CollisionPolicy::default(),
            guids: GuidMode::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from the environment.
    ///
    /// Starts from the JSON file named by `WALLGEN_CONFIG` (or the defaults)
    /// and applies the single-value overrides on top.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(value) = std::env::var(DEPTH_POLICY_ENV) {
            config.depth_policy = value.parse()?;
        }
        if let Ok(value) = std::env::var(COLLISION_ENV) {
            config.on_collision = value.parse()?;
        }
        if let Ok(value) = std::env::var(GUIDS_ENV) {
            config.guids = value.parse()?;
        }

        Ok(config)
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
