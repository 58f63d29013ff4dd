//! plook benchmarking suite
//!
//! Benchmarks for the hot per-request paths: repository slug extraction,
//! request path splitting, candidate URL building, version selection and the
//! slug cache.

pub mod common;

pub use common::*;
