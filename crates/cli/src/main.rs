use std::process::ExitCode;

fn main() -> ExitCode {
    expoquote_cli::run()
}
