pub mod error;
pub mod loader;
pub mod merge;

pub use error::ConfigError;
pub use loader::load_effective_config;
pub use merge::merge_sections;
