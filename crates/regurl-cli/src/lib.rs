//! Command-line front end for the registration URL builder.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
