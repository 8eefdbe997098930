// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ output.

use std::io::Write;

use crate::error::Result;

/// Writes vertices and 0-based faces as OBJ `v` / `f` statements.
///
/// Face indices are written 1-based. Coordinates use the shortest
/// representation that reads back to the same `f64`.
pub fn write_obj<W, F>(out: &mut W, vertices: &[[f64; 3]], faces: &[F]) -> Result<()>
where
    W: Write,
    F: AsRef<[usize]>,
{
    writeln!(out, "# chaikin3d")?;
    writeln!(out, "# {} vertices, {} faces", vertices.len(), faces.len())?;

    for [x, y, z] in vertices {
        writeln!(out, "v {x} {y} {z}")?;
    }

    for face in faces {
        write!(out, "f")?;
        for index in face.as_ref() {
            write!(out, " {}", index + 1)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}
