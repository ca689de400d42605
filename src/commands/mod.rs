//! # CLI Command Implementations
//!
//! Each subcommand of `orig-tarball` lives in its own file, with an `Args`
//! struct derived using `clap` and an `execute` function calling into the
//! `orig_tarball` library.

pub mod completions;
pub mod create;
pub mod version;
