// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chaikin3d_processing::ChaikinConfig;

/// Log verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Normal,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    /// Default `RUST_LOG` directive for this level.
    pub fn filter(self) -> &'static str {
        match self {
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::VeryVerbose => "trace",
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub input: PathBuf,
    pub config: ChaikinConfig,
    pub verbosity: Verbosity,
}

/// Parses `args` (without the program name) on top of `base`.
///
/// Flags override whatever `base` holds, normally the environment.
pub fn parse_args<I, S>(args: I, base: ChaikinConfig) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut config = base;
    let mut input = None;
    let mut verbosity = Verbosity::Normal;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "-i" | "--input" => {
                input = Some(PathBuf::from(value(&args, &mut i)?));
            }
            "-g" | "--generations" => {
                config.generations = parse_value(&args, &mut i)?;
            }
            "-c" | "--coefficient" => {
                config.coefficient = parse_value(&args, &mut i)?;
            }
            "-e" | "--epsilon" => {
                config.epsilon = parse_value(&args, &mut i)?;
            }
            "-o" | "--output" => {
                config.output = Some(PathBuf::from(value(&args, &mut i)?));
            }
            "-r" | "--rotate-mesh" => config.rotate = true,
            "-w" | "--weld" => config.weld = true,
            "--skip-unresolved" => config.skip_unresolved = true,
            "-v" | "--verbose" => verbosity = verbosity.max(Verbosity::Verbose),
            "-vv" | "--very-verbose" => verbosity = Verbosity::VeryVerbose,
            other => bail!("unknown option: {other}"),
        }
        i += 1;
    }

    let input = input.ok_or_else(|| anyhow!("missing required option --input"))?;
    config.validate()?;

    Ok(Command::Run(RunArgs {
        input,
        config,
        verbosity,
    }))
}

/// Takes the value following the flag at `i`.
fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_value<T>(args: &[String], i: &mut usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let flag = args[*i].clone();
    let raw = value(args, i)?;
    raw.parse()
        .with_context(|| format!("invalid value for {flag}: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> RunArgs {
        match parse_args(args.iter().copied(), ChaikinConfig::default()).unwrap() {
            Command::Run(run) => run,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn short_flags() {
        let args = run(&["-i", "cube.obj", "-g", "3", "-c", "5", "-e", "0.001", "-r", "-w", "-o", "out.json"]);
        assert_eq!(args.input, PathBuf::from("cube.obj"));
        assert_eq!(args.config.generations, 3);
        assert_eq!(args.config.coefficient, 5);
        assert_eq!(args.config.epsilon, 0.001);
        assert!(args.config.rotate);
        assert!(args.config.weld);
        assert_eq!(args.config.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.verbosity, Verbosity::Normal);
    }

    #[test]
    fn long_flags() {
        let args = run(&[
            "--input",
            "m.obj",
            "--generations",
            "2",
            "--rotate-mesh",
            "--skip-unresolved",
            "--very-verbose",
        ]);
        assert_eq!(args.config.generations, 2);
        assert!(args.config.rotate);
        assert!(args.config.skip_unresolved);
        assert_eq!(args.verbosity, Verbosity::VeryVerbose);
        assert_eq!(args.verbosity.filter(), "trace");
    }

    #[test]
    fn flags_override_base() {
        let base = ChaikinConfig {
            generations: 5,
            coefficient: 6,
            ..ChaikinConfig::default()
        };
        let Command::Run(args) = parse_args(["-i", "a.obj", "-g", "1"], base).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(args.config.generations, 1);
        assert_eq!(args.config.coefficient, 6);
    }

    #[test]
    fn verbose_does_not_lower_very_verbose() {
        let args = run(&["-vv", "-v", "-i", "a.obj"]);
        assert_eq!(args.verbosity, Verbosity::VeryVerbose);
    }

    #[test]
    fn help_wins() {
        let cmd = parse_args(["-g", "2", "--help"], ChaikinConfig::default()).unwrap();
        assert_eq!(cmd, Command::Help);
    }

    #[test]
    fn errors() {
        let base = ChaikinConfig::default;
        assert!(parse_args(["-g", "2"], base()).is_err());
        assert!(parse_args(["-i", "a.obj", "-g"], base()).is_err());
        assert!(parse_args(["-i", "a.obj", "-g", "two"], base()).is_err());
        assert!(parse_args(["-i", "a.obj", "--frobnicate"], base()).is_err());
        assert!(parse_args(["-i", "a.obj", "-c", "2"], base()).is_err());
        assert!(parse_args(["-i", "a.obj", "-o", "a.ply"], base()).is_err());
    }
}
