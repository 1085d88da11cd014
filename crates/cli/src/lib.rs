//! Library surface of the sigmap CLI.

pub mod commands;
