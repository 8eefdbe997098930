// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load, subdivide and export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chaikin3d_topology::{ChaikinReport, MeshStats, Polyhedron};
use chaikin3d_wavefront::{parse_obj, read_obj, write_obj, ObjData};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{ChaikinConfig, OutputFormat};
use crate::error::{Error, Result};

/// Counts for one generation of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    /// 0 for the input mesh.
    pub generation: usize,
    pub stats: MeshStats,
    /// `None` for the input mesh.
    pub report: Option<ChaikinReport>,
    pub elapsed_ms: u64,
}

/// A subdivided mesh and how it got there.
#[derive(Debug, Clone)]
pub struct ProcessedMesh {
    pub mesh: Polyhedron,
    /// One entry per generation, input mesh first.
    pub history: Vec<GenerationStats>,
}

impl ProcessedMesh {
    /// Stats of the final mesh.
    pub fn stats(&self) -> MeshStats {
        self.mesh.stats()
    }

    /// Number of Chaikin3D passes applied.
    pub fn generations(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// Per-generation history as pretty JSON.
    pub fn history_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.history)?)
    }
}

/// Builds a polyhedron from parsed OBJ data.
pub fn build_polyhedron(data: &ObjData, config: &ChaikinConfig) -> Result<Polyhedron> {
    let mesh = Polyhedron::from_vertex_lists_with(&data.vertices, &data.faces, config.mesh_options())?;
    Ok(mesh)
}

/// Runs `config.generations` Chaikin3D passes over `mesh`.
pub fn subdivide(mesh: Polyhedron, config: &ChaikinConfig) -> Result<ProcessedMesh> {
    config.validate()?;
    let options = config.chaikin_options();

    let mut history = Vec::with_capacity(config.generations + 1);
    history.push(GenerationStats {
        generation: 0,
        stats: mesh.stats(),
        report: None,
        elapsed_ms: 0,
    });

    let mut mesh = mesh;
    for generation in 1..=config.generations {
        let start = Instant::now();
        let (next, report) = mesh.chaikin3d_with(&options)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let stats = next.stats();

        tracing::info!(
            generation,
            nodes = stats.nodes,
            main_edges = stats.main_edges,
            groups = stats.groups,
            skipped = report.skipped_faces,
            elapsed_ms,
            "generation complete"
        );

        history.push(GenerationStats {
            generation,
            stats,
            report: Some(report),
            elapsed_ms,
        });
        mesh = next;
    }

    Ok(ProcessedMesh { mesh, history })
}

/// Parses OBJ text and subdivides it.
pub fn process_str(obj: &str, config: &ChaikinConfig) -> Result<ProcessedMesh> {
    config.validate()?;
    let data = parse_obj(obj, config.obj_options())?;
    subdivide(build_polyhedron(&data, config)?, config)
}

/// Reads an OBJ file and subdivides it.
pub fn process_file(path: impl AsRef<Path>, config: &ChaikinConfig) -> Result<ProcessedMesh> {
    let path = path.as_ref();
    config.validate()?;
    let data = read_obj(path, config.obj_options())?;
    tracing::debug!(
        path = %path.display(),
        vertices = data.vertices.len(),
        faces = data.faces.len(),
        "loaded mesh"
    );
    subdivide(build_polyhedron(&data, config)?, config)
}

/// Processes several OBJ files in parallel with the same configuration.
///
/// Results keep the order of `paths`. A failing file does not stop the others.
pub fn process_files(paths: &[PathBuf], config: &ChaikinConfig) -> Vec<Result<ProcessedMesh>> {
    paths
        .par_iter()
        .map(|path| process_file(path, config))
        .collect()
}

/// Writes the mesh to `path`, as OBJ or JSON by extension.
pub fn write_output(processed: &ProcessedMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path).ok_or_else(|| Error::UnsupportedOutput(path.to_path_buf()))?;

    let file = File::create(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    write_to(processed, format, &mut out)?;
    out.flush().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), ?format, "wrote mesh");
    Ok(())
}

/// Writes the mesh to any writer in `format`.
pub fn write_to<W: Write>(processed: &ProcessedMesh, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Obj => {
            let (vertices, faces) = processed.mesh.to_vertex_lists()?;
            write_obj(out, &vertices, &faces)?;
        }
        OutputFormat::Json => {
            let json = processed.mesh.to_json()?;
            out.write_all(json.as_bytes())
                .map_err(chaikin3d_wavefront::Error::Write)?;
        }
    }
    Ok(())
}
