mod application;
mod runtime_config;

pub mod data;

pub use application::{Application, ApplicationError, TreeReport};
pub use runtime_config::RuntimeConfig;
