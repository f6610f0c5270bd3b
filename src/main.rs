use std::process::ExitCode;

fn main() -> ExitCode {
    match xy_curves::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(exit_code = err.exit_code(), "{}", err.report());
            ExitCode::from(err.exit_code())
        }
    }
}
