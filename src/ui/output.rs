//! Line-level CLI output
//!
//! Every result line carries a `Status`. Interactive terminals get the
//! matching `cliclack` log glyph; plain output gets a bracketed tag so a
//! placeholder fallback can be grepped for in CI logs.

use super::context::UiContext;
use console::{style, StyledObject};

/// Severity of a result line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Image shown or action completed
    Ok,
    /// Placeholder shown without an error, or action skipped
    Warn,
    /// Load failed; the placeholder stays
    Error,
}

impl Status {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Status::Ok => style("[OK]").green(),
            Status::Warn => style("[WARN]").yellow(),
            Status::Error => style("[ERROR]").red(),
        }
    }
}

pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// One indented result line
pub fn step(ctx: &UiContext, status: Status, message: &str) {
    if ctx.use_fancy_output() {
        let _ = match status {
            Status::Ok => cliclack::log::success(message),
            Status::Warn => cliclack::log::warning(message),
            Status::Error => cliclack::log::error(message),
        };
    } else {
        println!("  {} {}", status.tag(), message);
    }
}

/// Closing summary line
pub fn outro(ctx: &UiContext, status: Status, message: &str) {
    if ctx.use_fancy_output() {
        let message = match status {
            Status::Ok => style(message).green().bold(),
            Status::Warn => style(message).yellow().bold(),
            Status::Error => style(message).red().bold(),
        };
        cliclack::outro(message).ok();
    } else {
        println!();
        println!("{} {}", status.tag(), message);
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}
