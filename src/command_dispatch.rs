//! Purpose: Hold top-level CLI command dispatch for `yakshaver`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "yakshaver", &mut std::io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Shave(args) => {
            tracing::debug!(?args, "running shaves");
            run_shaves(&args)
        }
    }
}
