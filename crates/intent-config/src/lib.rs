//! Runtime configuration: settings resolution (env > file > default),
//! atomic persistence, and rebind notification for the rest of Intent Hub.

mod core;
mod error;
mod settings;

pub use core::ConfigCore;
pub use error::ConfigError;
pub use settings::Settings;
