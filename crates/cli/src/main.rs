use std::process::ExitCode;

fn main() -> ExitCode {
    loadbridge_cli::run()
}
