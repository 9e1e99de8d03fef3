//! Binary entrypoint for the call analyzer server.

use std::process::ExitCode;

use call_analyzer::start_call_analyzer;

fn main() -> ExitCode {
    start_call_analyzer::run()
}
