// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Generate an IFC4 model of a wall with embedded pipes
//!
//! Takes no arguments. Configuration comes from the environment:
//!
//!   WALLGEN_CONFIG        JSON file with any subset of the generator settings
//!   WALLGEN_OUTPUT_DIR    output directory (default `ifc_outputs`)
//!   WALLGEN_DEPTH_POLICY  reject | clamp | legacy
//!   WALLGEN_ON_COLLISION  overwrite | error | suffix
//!   WALLGEN_GUIDS         deterministic | random
//!   RUST_LOG              log filter (default `info`)

use anyhow::Context;
use chrono::Local;
use ifc_wallgen::{run, GeneratorConfig};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the result line
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = GeneratorConfig::from_env().context("loading configuration")?;

    tracing::info!(
        output_dir = %config.output_dir.display(),
        depth_policy = ?config.depth_policy,
        on_collision = ?config.on_collision,
        guids = ?config.guids,
        "Starting wall-with-pipes generator"
    );

    let report = run(&config, Local::now().naive_local()).context("generating IFC model")?;

    tracing::info!(
        entities = report.entity_count,
        wall_depth = report.wall_depth,
        pipe_depths = ?report.pipe_depths,
        "Done"
    );
    println!("IFC file created and saved as: {}", report.path.display());

    Ok(())
}
