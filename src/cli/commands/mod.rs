//! CLI command implementations

pub mod config;
pub mod load;

pub use config::execute as config;
pub use load::execute as load;
