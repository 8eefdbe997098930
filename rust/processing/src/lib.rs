// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Chaikin3D processing
//!
//! Loads Wavefront OBJ meshes, runs Chaikin3D passes over them and writes the
//! result as OBJ or JSON. Shared by the command line tool and tests.
//!
//! ```
//! use chaikin3d_processing::{process_str, ChaikinConfig};
//!
//! let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n";
//! let config = ChaikinConfig { generations: 1, ..ChaikinConfig::default() };
//! let processed = process_str(obj, &config).unwrap();
//! assert_eq!(processed.stats().nodes, 12);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{ChaikinConfig, OutputFormat};
pub use error::{Error, Result};
pub use pipeline::{
    build_polyhedron, process_file, process_files, process_str, subdivide, write_output, write_to,
    GenerationStats, ProcessedMesh,
};
