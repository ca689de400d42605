//! Implementation of the stages of a tarball build.
//!
//! ## Overview
//!
//! A build runs these stages strictly in sequence:
//! 1. Checkout - Main tree (and auxiliary repositories) through the cache
//! 2. Locale Synchronization - One l10n checkout per locale, failures absorbed
//! 3. Validation - Every locale required on Linux must have been obtained
//! 4. Version Resolution - Snapshot or release version, checked against the tree
//! 5. Packaging - Versioned rename, archive, rename back
//!
//! Checkout and version resolution need no stage module of their own: they
//! are thin calls into `repository` and `version` made by the orchestrator.

pub mod orchestrator;
pub mod package;
pub mod sync;
pub mod validate;
