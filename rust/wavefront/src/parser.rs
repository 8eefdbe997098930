// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ line parsers using nom.
//!
//! Only geometry is read: `v` lines give vertex positions (a trailing `w` is
//! ignored) and `f` lines give faces as vertex references `i`, `i/j`,
//! `i/j/k` or `i//k`, of which only `i` is used. Every other statement
//! (`vt`, `vn`, `o`, `g`, `s`, `usemtl`, ...) is skipped.

use std::path::Path;

use nom::{
    character::complete::{char, digit1, space0, space1},
    combinator::{eof, map, map_res, opt, recognize},
    error::ErrorKind,
    multi::many1,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// Options applied while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjOptions {
    /// Swap the Y and Z components of every vertex.
    pub rotate: bool,
}

/// Geometry read from an OBJ file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub vertices: Vec<[f64; 3]>,
    /// 0-based vertex indices, each face with at least 3 entries.
    pub faces: Vec<Vec<usize>>,
}

/// Parse a float with fast-float.
fn number(input: &str) -> IResult<&str, f64> {
    match fast_float::parse_partial::<f64, _>(input) {
        Ok((value, consumed)) if consumed > 0 => Ok((&input[consumed..], value)),
        _ => Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Float))),
    }
}

/// Parse the operands of a `v` statement: x y z [w]
fn vertex(input: &str) -> IResult<&str, [f64; 3]> {
    map(
        terminated(
            tuple((
                preceded(space1, number),
                preceded(space1, number),
                preceded(space1, number),
                opt(preceded(space1, number)),
            )),
            pair(space0, eof),
        ),
        |(x, y, z, _w)| [x, y, z],
    )(input)
}

/// Parse a signed vertex index: 12, -1
fn index(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| s.parse::<i64>())(input)
}

/// Parse one face vertex reference, keeping the position index:
/// i, i/j, i/j/k, i//k
fn face_ref(input: &str) -> IResult<&str, i64> {
    terminated(
        index,
        opt(pair(
            char('/'),
            pair(opt(index), opt(preceded(char('/'), opt(index)))),
        )),
    )(input)
}

/// Parse the operands of an `f` statement.
fn face(input: &str) -> IResult<&str, Vec<i64>> {
    terminated(many1(preceded(space1, face_ref)), pair(space0, eof))(input)
}

/// Drops a trailing `# comment`.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn statement(line: &str) -> (&str, &str) {
    line.find(char::is_whitespace)
        .map_or((line, ""), |i| line.split_at(i))
}

/// Parses OBJ text into vertices and 0-based faces.
///
/// Positive indices may refer to vertices defined later in the file;
/// negative indices count back from the vertices defined so far.
pub fn parse_obj(input: &str, options: ObjOptions) -> Result<ObjData> {
    let mut vertices = Vec::new();
    // (line, 0-based index as read, original reference)
    let mut faces: Vec<(usize, Vec<(i64, i64)>)> = Vec::new();
    let mut skipped = 0usize;

    for (i, raw) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        match statement(line) {
            ("v", rest) => {
                let (_, [x, y, z]) = vertex(rest)
                    .map_err(|e| Error::parse(line_no, format!("invalid vertex: {e}")))?;
                vertices.push(if options.rotate { [x, z, y] } else { [x, y, z] });
            }
            ("f", rest) => {
                let (_, refs) =
                    face(rest).map_err(|e| Error::parse(line_no, format!("invalid face: {e}")))?;
                if refs.len() < 3 {
                    return Err(Error::ShortFace {
                        line: line_no,
                        count: refs.len(),
                    });
                }
                let resolved = refs
                    .into_iter()
                    .map(|r| match r {
                        0 => Err(Error::ZeroIndex { line: line_no }),
                        r if r > 0 => Ok((r - 1, r)),
                        r => Ok((vertices.len() as i64 + r, r)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                faces.push((line_no, resolved));
            }
            _ => skipped += 1,
        }
    }

    let vertex_count = vertices.len();
    let faces = faces
        .into_iter()
        .map(|(line, refs)| {
            refs.into_iter()
                .map(|(index, original)| {
                    usize::try_from(index)
                        .ok()
                        .filter(|&i| i < vertex_count)
                        .ok_or(Error::IndexOutOfRange {
                            line,
                            index: original,
                            vertex_count,
                        })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        skipped,
        "parsed OBJ data"
    );
    Ok(ObjData { vertices, faces })
}

/// Reads and parses an OBJ file.
pub fn read_obj(path: impl AsRef<Path>, options: ObjOptions) -> Result<ObjData> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read OBJ file");
    parse_obj(&content, options)
}
