//! Library side of the `territori` command-line tool.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod input;
pub mod logging;
pub mod summary;
