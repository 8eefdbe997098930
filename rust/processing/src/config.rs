// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use std::path::{Path, PathBuf};

use chaikin3d_topology::{ChaikinOptions, MeshOptions, DEFAULT_COEFFICIENT, DEFAULT_EPSILON};
use chaikin3d_wavefront::ObjOptions;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Obj,
    Json,
}

impl OutputFormat {
    /// Format for `path`, by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaikinConfig {
    /// Number of Chaikin3D passes.
    pub generations: usize,
    /// Chaikin coefficient, at least 3.
    pub coefficient: u32,
    /// Coordinate tolerance.
    pub epsilon: f64,
    /// Swap Y and Z when loading.
    pub rotate: bool,
    /// Merge coincident input vertices.
    pub weld: bool,
    /// Drop faces that cannot be rebuilt instead of failing the pass.
    pub skip_unresolved: bool,
    /// Where to write the result, `.obj` or `.json`.
    pub output: Option<PathBuf>,
}

impl ChaikinConfig {
    /// Load configuration from environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            generations: std::env::var("CHAIKIN_GENERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.generations),
            coefficient: std::env::var("CHAIKIN_COEFFICIENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.coefficient),
            epsilon: std::env::var("CHAIKIN_EPSILON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.epsilon),
            rotate: env_flag("CHAIKIN_ROTATE").unwrap_or(defaults.rotate),
            weld: env_flag("CHAIKIN_WELD").unwrap_or(defaults.weld),
            skip_unresolved: env_flag("CHAIKIN_SKIP_UNRESOLVED").unwrap_or(defaults.skip_unresolved),
            output: std::env::var("CHAIKIN_OUTPUT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Checks the values a pass cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.coefficient < 3 {
            return Err(Error::InvalidConfig(format!(
                "coefficient must be at least 3, got {}",
                self.coefficient
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if let Some(path) = &self.output {
            if OutputFormat::from_path(path).is_none() {
                return Err(Error::UnsupportedOutput(path.clone()));
            }
        }
        Ok(())
    }

    pub fn obj_options(&self) -> ObjOptions {
        ObjOptions {
            rotate: self.rotate,
        }
    }

    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            epsilon: self.epsilon,
            weld_vertices: self.weld,
        }
    }

    pub fn chaikin_options(&self) -> ChaikinOptions {
        ChaikinOptions {
            coefficient: self.coefficient,
            skip_unresolved_faces: self.skip_unresolved,
        }
    }
}

impl Default for ChaikinConfig {
    fn default() -> Self {
        Self {
            generations: 0,
            coefficient: DEFAULT_COEFFICIENT,
            epsilon: DEFAULT_EPSILON,
            rotate: false,
            weld: false,
            skip_unresolved: false,
            output: None,
        }
    }
}

/// Reads a boolean flag: 1/true/yes/on or 0/false/no/off.
fn env_flag(name: &str) -> Option<bool> {
    parse_flag(&std::env::var(name).ok()?)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ChaikinConfig::default();
        assert_eq!(config.generations, 0);
        assert_eq!(config.coefficient, 4);
        assert_eq!(config.epsilon, 1e-5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = ChaikinConfig {
            coefficient: 2,
            ..ChaikinConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = ChaikinConfig {
            epsilon: 0.0,
            ..ChaikinConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = ChaikinConfig {
            output: Some(PathBuf::from("mesh.html")),
            ..ChaikinConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::UnsupportedOutput(_))));
    }

    #[test]
    fn output_format_by_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.obj")), Some(OutputFormat::Obj));
        assert_eq!(OutputFormat::from_path(Path::new("a.JSON")), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path(Path::new("a.stl")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn flags_parse() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ChaikinConfig = serde_json::from_str(r#"{"generations": 2}"#).unwrap();
        assert_eq!(config.generations, 2);
        assert_eq!(config.coefficient, 4);
        assert_eq!(config.output, None);
    }
}
