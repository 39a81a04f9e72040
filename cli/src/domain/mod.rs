//! Domain layer: pure types, validation and change planning.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod args;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod host_group;
pub mod http;
pub mod nvm;
pub mod poll;
pub mod pool;
pub mod shadow_image;
pub mod size;
pub mod storage;
pub mod volume;

pub use args::{Ensure, ModuleArgs, State};
pub use config::{VspConfig, validate_config_key, validate_config_value};
pub use connection::{ConnectionInfo, ConnectionType, Credentials};
pub use endpoint::EndpointKey;
pub use error::{ConfigError, EndpointError, RestError, ValidationError};
pub use poll::{PollOutcome, PollPolicy};
