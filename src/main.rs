use std::process::ExitCode;

fn main() -> ExitCode {
    match polyserve::cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("polyserve: {err:#}");
            ExitCode::FAILURE
        }
    }
}
