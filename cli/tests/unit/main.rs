//! Unit tests for the vsp CLI
//!
//! These tests drive the application services against a scripted HTTP
//! transport and run fast without network I/O.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod helpers;
mod host_group_service;
mod nvm_subsystem_service;
mod volume_service;
