// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output location and timestamped file naming

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::config::{CollisionPolicy, GeneratorConfig};
use crate::error::{GeneratorError, Result};

/// `MMDDYY_HHMM`, local time
pub const FILE_STAMP_FORMAT: &str = "%m%d%y_%H%M";

/// Where and under which name a model is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub stem: String,
    pub extension: String,
    pub on_collision: CollisionPolicy,
}

impl OutputTarget {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            dir: config.output_dir.clone(),
            stem: config.file_stem.clone(),
            extension: config.extension.clone(),
            on_collision: config.on_collision,
        }
    }

    /// Create the output directory and any missing parents. Succeeds if it
    /// already exists.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| GeneratorError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// `<stem>_<MMDDYY_HHMM>.<extension>`
    pub fn file_name(&self, now: NaiveDateTime) -> String {
        format!(
            "{}_{}.{}",
            self.stem,
            now.format(FILE_STAMP_FORMAT),
            self.extension
        )
    }

    /// Pick the path to write to, applying the collision policy when a file
    /// with the timestamped name already exists
    pub fn resolve(&self, now: NaiveDateTime) -> Result<PathBuf> {
        let path = self.dir.join(self.file_name(now));
        if !path.exists() {
            return Ok(path);
        }

        match self.on_collision {
            CollisionPolicy::Overwrite => {
                warn!(path = %path.display(), "Overwriting existing output file");
                Ok(path)
            }
            CollisionPolicy::Error => Err(GeneratorError::OutputExists(path)),
            CollisionPolicy::Suffix => {
                let base = format!("{}_{}", self.stem, now.format(FILE_STAMP_FORMAT));
                let free = (1u32..)
                    .map(|n| self.dir.join(format!("{}_{}.{}", base, n, self.extension)))
                    .find(|candidate| !candidate.exists())
                    .ok_or(GeneratorError::OutputExists(path))?;
                debug!(path = %free.display(), "Output name taken, using suffix");
                Ok(free)
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
