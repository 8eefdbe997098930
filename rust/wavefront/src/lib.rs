// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Chaikin3D Wavefront
//!
//! Minimal Wavefront OBJ support for Chaikin3D: reads vertex positions and
//! polygon faces (converted to 0-based indices) and writes them back.
//!
//! ```
//! use chaikin3d_wavefront::{parse_obj, ObjOptions};
//!
//! let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
//! let data = parse_obj(text, ObjOptions::default()).unwrap();
//! assert_eq!(data.faces, vec![vec![0, 1, 2]]);
//! ```

pub mod error;
pub mod parser;
pub mod writer;

pub use error::{Error, Result};
pub use parser::{parse_obj, read_obj, ObjData, ObjOptions};
pub use writer::write_obj;
