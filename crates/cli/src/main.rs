use std::process::ExitCode;

fn main() -> ExitCode {
    dialogbridge_cli::run()
}
