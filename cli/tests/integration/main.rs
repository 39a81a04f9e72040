//! Integration tests for the vsp CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them needs a reachable storage array.

mod cli_tests;
mod config_command;
