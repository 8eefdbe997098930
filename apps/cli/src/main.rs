// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chaikin3D command-line tool.
//!
//! Usage:
//!   chaikin3d -i <input.obj> [options]

mod args;

use std::time::Instant;

use anyhow::{Context, Result};
use args::{parse_args, Command, RunArgs};
use chaikin3d_processing::{process_file, write_output, ChaikinConfig};

fn main() {
    let base = ChaikinConfig::from_env();
    let command = match parse_args(std::env::args().skip(1), base) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {err:#}");
            print_usage();
            std::process::exit(2);
        }
    };

    let run_args = match command {
        Command::Help => {
            print_usage();
            return;
        }
        Command::Run(run_args) => run_args,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| run_args.verbosity.filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&run_args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let start = Instant::now();
    tracing::info!(
        input = %args.input.display(),
        generations = args.config.generations,
        coefficient = args.config.coefficient,
        "starting"
    );

    let processed = process_file(&args.input, &args.config)
        .with_context(|| format!("failed to process {}", args.input.display()))?;

    if let Some(output) = &args.config.output {
        write_output(&processed, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    let skipped: usize = processed
        .history
        .iter()
        .filter_map(|g| g.report.map(|r| r.skipped_faces))
        .sum();
    println!(
        "{}: {} generation(s), {} ({} skipped faces) in {:.1?}",
        args.input.display(),
        processed.generations(),
        processed.stats(),
        skipped,
        start.elapsed()
    );
    Ok(())
}

fn print_usage() {
    eprintln!("Chaikin3D mesh subdivision");
    eprintln!();
    eprintln!("Usage: chaikin3d -i <input.obj> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -i, --input <path>         Wavefront OBJ file to load");
    eprintln!("  -g, --generations <n>      Number of Chaikin3D passes (default: 0)");
    eprintln!("  -c, --coefficient <n>      Chaikin coefficient, at least 3 (default: 4)");
    eprintln!("  -e, --epsilon <eps>        Coordinate tolerance (default: 1e-5)");
    eprintln!("  -r, --rotate-mesh          Swap Y and Z on load");
    eprintln!("  -w, --weld                 Merge coincident input vertices");
    eprintln!("      --skip-unresolved      Drop faces that cannot be rebuilt");
    eprintln!("  -o, --output <path>        Write the result as .obj or .json");
    eprintln!("  -v, --verbose              Debug logging");
    eprintln!("  -vv, --very-verbose        Trace logging");
    eprintln!("  -h, --help                 Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CHAIKIN_GENERATIONS, CHAIKIN_COEFFICIENT, CHAIKIN_EPSILON, CHAIKIN_ROTATE,");
    eprintln!("  CHAIKIN_WELD, CHAIKIN_SKIP_UNRESOLVED, CHAIKIN_OUTPUT, RUST_LOG");
}
