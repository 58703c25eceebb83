//! Subjects Graph - curriculum prerequisite tracking

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = subjects_graph::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
