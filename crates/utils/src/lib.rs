//! Shared utilities for the sigmap workspace.

pub mod errors;
