use std::process::ExitCode;

use filminerctl::ui::output;

fn main() -> ExitCode {
    match filminerctl::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
