//! Wire types shared by the vsp client layers.

pub mod ldev;
pub mod types;

pub use ldev::{LdevId, LdevIdError, MAX_LDEV_ID};
pub use types::*;
