use std::process::ExitCode;

fn main() -> ExitCode {
    medibot_cli::run()
}
