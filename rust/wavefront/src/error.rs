// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for OBJ reading and writing.

use std::path::PathBuf;

/// Result type alias for OBJ operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing OBJ data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A line could not be parsed. `line` is 1-based.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A face references vertex 0, which OBJ does not allow.
    #[error("line {line}: vertex index 0 is not valid, OBJ indices start at 1")]
    ZeroIndex { line: usize },

    /// A face references a vertex that does not exist.
    #[error("line {line}: vertex index {index} is out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        line: usize,
        index: i64,
        vertex_count: usize,
    },

    /// A face lists fewer than 3 vertices.
    #[error("line {line}: face has {count} vertices, at least 3 are required")]
    ShortFace { line: usize, count: usize },

    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing OBJ output failed.
    #[error("cannot write OBJ data: {0}")]
    Write(#[from] std::io::Error),
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// The 1-based line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. }
            | Self::ZeroIndex { line }
            | Self::IndexOutOfRange { line, .. }
            | Self::ShortFace { line, .. } => Some(*line),
            Self::Read { .. } | Self::Write(_) => None,
        }
    }
}
