//! Terminal output for the CLI
//!
//! Uses `cliclack` log lines in interactive terminals and plain bracketed
//! prefixes otherwise, so CI logs stay greppable.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{intro, key_value, outro, step, Status};
pub use progress::LoadProgress;
