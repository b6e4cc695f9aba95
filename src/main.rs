//! assetpipe - command-line build orchestrator for front-end assets

use std::process::ExitCode;

use assetpipe::cli;

fn main() -> ExitCode {
    cli::run()
}
