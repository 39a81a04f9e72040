//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the HTTP transport, the
//! config file store and log file setup.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod http;
pub mod logging;
