//! CLI support
//!
//! Exit codes for scripting/automation, trimmed to the subset this
//! domain's `receive` subcommand actually produces.

pub mod exit_codes;

pub use exit_codes::{exit_code_description, print_exit_codes, CliResult, ExitCodes};
