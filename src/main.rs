use std::process::ExitCode;

fn main() -> ExitCode {
    livedoc::cli::run()
}
