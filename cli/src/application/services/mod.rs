//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`: never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_service;
pub mod connection_manager;
pub mod host_group;
pub mod nvm_subsystem;
pub mod poll;
pub mod pool;
pub mod reconcile;
pub mod shadow_image;
pub mod storage_system;
pub mod volume;
