//! cmdweave demo console.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use cmdweave_command::CommandManager;
use cmdweave_runtime::{Shell, ShellConfig, demo};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    if env::args().skip(1).any(|arg| arg == "-V" || arg == "--version") {
        println!("cmdweave {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let manager = Arc::new(CommandManager::new());
    demo::register(&manager)?;

    let config = ShellConfig::new()
        .with_prompt("cmdweave> ")
        .with_banner("cmdweave demo console. Type 'help' for commands, Tab to complete, Ctrl+D to exit.");
    let mut shell = Shell::new(manager, config)?;
    shell.run()?;
    Ok(())
}
