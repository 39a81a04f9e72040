//! Command implementations

pub mod config;
pub mod host_group;
pub mod module;
pub mod nvm_subsystem;
pub mod pool;
pub mod shadow_image;
pub mod storage;
pub mod version;
pub mod volume;

pub use module::ModuleCmd;
