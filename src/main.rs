//! Binary entry point for the `kmerc` command-line tool.
//!
//! Parses arguments, resolves them into a [`kmerc::orchestrator::RunConfig`],
//! runs the pipeline, and maps the result onto a process exit code
//! (spec.md §6: 0 on a clean run; nonzero on table-full, I/O failure, or
//! invalid arguments).

use clap::Parser;

use kmerc::cli::args::Args;
use kmerc::cli::constants::set_display_level;
use kmerc::error::KmercError;
use kmerc::{displaylevel, orchestrator};

fn main() {
    let args = Args::parse();
    set_display_level(args.verbosity);
    std::process::exit(run(args));
}

/// Resolves `args` into a [`orchestrator::RunConfig`] and runs the pipeline,
/// returning the process exit code (spec.md §6).
fn run(args: Args) -> i32 {
    let cfg = match args.into_run_config() {
        Ok(cfg) => cfg,
        Err(err) => return report_and_exit(&err),
    };

    match orchestrator::run(cfg) {
        Ok(()) => {
            displaylevel!(2, "kmerc: done\n");
            0
        }
        Err(err) => report_and_exit(&err),
    }
}

/// Prints a diagnostic at display level 1 and returns the error's exit code
/// (spec.md §7: propagation policy — everything but an encoding break
/// unwinds to the orchestrator/CLI boundary and is reported here).
fn report_and_exit(err: &KmercError) -> i32 {
    displaylevel!(1, "kmerc: error: {}\n", err);
    err.exit_code()
}
