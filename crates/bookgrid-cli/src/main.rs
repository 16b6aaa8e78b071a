use std::process::ExitCode;

fn main() -> ExitCode {
  match bookgrid_core::run(std::env::args_os().collect()) {
    | Ok(()) => ExitCode::SUCCESS,
    | Err(err) => {
      eprintln!("bookgrid-check: {err:#}");
      ExitCode::FAILURE
    }
  }
}
