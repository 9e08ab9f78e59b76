//! Library crate root for the .NET launcher shim and its launch-data tooling.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod config;
pub mod launch_info;
pub mod launcher;
pub mod runfiles;
