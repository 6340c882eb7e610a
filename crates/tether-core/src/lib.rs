pub mod config;
pub mod error;

pub use config::{SchedulerConfig, ServerConfig, TetherConfig};
pub use error::{Result, TetherError};
