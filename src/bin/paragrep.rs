//! Entry point: installs the global allocator and tracing subscriber, then
//! hands off to `cli::run` for argument parsing and dispatch between
//! coordinator and worker roles.

use std::io::{self, Write};
use std::process::ExitCode;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    logging::init();

    let mut stdout = io::stdout().lock();
    match cli::run(std::env::args_os(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = stdout.flush();
            tracing::error!("{err}");
            eprintln!("paragrep: {err}");
            ExitCode::from(cli::exit_code_from(&err).as_i32() as u8)
        }
    }
}
