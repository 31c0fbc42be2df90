mod config;
mod mode;

pub use config::{Config, CONFIG_FILE};
pub use mode::PublishMode;
