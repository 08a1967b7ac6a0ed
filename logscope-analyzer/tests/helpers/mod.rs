//! Test Helper Utilities
//!
//! Shared utilities for testing logscope-analyzer
#![allow(dead_code)]

pub mod db_utils;
pub mod fake_enrichment;

pub use db_utils::{create_test_db, seed_file, seed_file_with_status, FaultyStore};
pub use fake_enrichment::ScriptedEnrichment;
