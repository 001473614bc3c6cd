pub mod config;
pub mod error;
pub mod handlers;
pub mod lookup;
pub mod processor;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
