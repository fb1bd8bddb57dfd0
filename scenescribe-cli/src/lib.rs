// scenescribe-cli/src/lib.rs
//
// Library portion of the scenescribe CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, InfoArgs, ProcessArgs};
pub use commands::info::run_info;
pub use commands::process::run_process;
