//! Common utilities for the Quokka renderer.
//!
//! This crate provides shared infrastructure used by all renderer components:
//! - **Warning System** - deduplicated diagnostics for unsupported features

pub mod warning;
