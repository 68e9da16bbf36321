use std::process::ExitCode;

fn main() -> ExitCode {
    match cpmg_hn_ap::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
