// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Wallgen
//!
//! Generates an IFC4 model of a single wall with vertical pipe segments
//! embedded in it and writes it to a timestamped `.ifc` file.
//!
//! ## Pipeline
//!
//! 1. [`GeneratorConfig`] (centimetres) → [`ModelParameters`] (metres)
//! 2. [`ModelParameters::validate`]
//! 3. [`generate_model`]: spatial hierarchy, wall, one pipe per position
//! 4. [`OutputTarget`] picks `<dir>/wall_with_pipes_<MMDDYY_HHMM>.ifc`
//! 5. STEP serialization, then [`verify_written`] re-reads the file
//!
//! ```rust,ignore
//! use ifc_wallgen::{run, GeneratorConfig};
//!
//! let report = run(&GeneratorConfig::default(), chrono::Local::now().naive_local())?;
//! println!("{}", report.path.display());
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod output;
pub mod parameters;
pub mod verify;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use ifc_wallgen_core::StepWriter;
use tracing::info;

pub use builder::{
    generate_model, pipe_depth, GeneratedModel, ModelBuilder, PlacedElement, SpatialHierarchy,
};
pub use config::{CollisionPolicy, DepthPolicy, GeneratorConfig, GuidMode, WallConfig};
pub use error::{GeneratorError, Result};
pub use output::OutputTarget;
pub use parameters::{cm_to_m, ModelParameters, PipePosition};
pub use verify::{verify_written, TypeCounts};

/// Time stamp format of the STEP `FILE_NAME` header entry
pub const HEADER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Summary of one generator run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub path: PathBuf,
    pub entity_count: usize,
    pub wall_depth: f64,
    pub pipe_depths: Vec<f64>,
    pub counts: TypeCounts,
}

/// Build the model described by `config` and write it under the configured
/// output directory, using `now` for the file name and header time stamp
pub fn run(config: &GeneratorConfig, now: NaiveDateTime) -> Result<GenerationReport> {
    let params = ModelParameters::from_config(config);
    params.validate()?;
    info!(
        length = params.wall_length,
        height = params.wall_height,
        thickness = params.wall_thickness,
        pipes = params.pipe_positions.len(),
        "Generating wall model"
    );

    let mut model = generate_model(&params)?;

    let target = OutputTarget::from_config(config);
    target.ensure_dir()?;
    let path = target.resolve(now)?;

    let header = model.document.header_mut();
    header.name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    header.time_stamp = now.format(HEADER_TIME_FORMAT).to_string();
    header.author = vec![config.author.clone()];
    header.organization = vec![config.organization.clone()];
    header.originating_system = concat!("ifc-wallgen ", env!("CARGO_PKG_VERSION")).to_string();

    StepWriter::new(&model.document)
        .write_to_path(&path)
        .map_err(|source| GeneratorError::Write {
            path: path.clone(),
            source,
        })?;

    let counts = verify_written(&path, &model)?;

    Ok(GenerationReport {
        entity_count: model.document.len(),
        wall_depth: model.wall.depth,
        pipe_depths: model.pipes.iter().map(|p| p.depth).collect(),
        counts,
        path,
    })
}
