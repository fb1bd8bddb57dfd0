// scenescribe-cli/src/commands/mod.rs
//
// One module per subcommand.

pub mod info;
pub mod process;
