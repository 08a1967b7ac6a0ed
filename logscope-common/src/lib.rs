//! # logscope Common Library
//!
//! Shared code for the logscope services:
//! - Common error type
//! - Bootstrap configuration loading
//! - Root folder resolution and layout

pub mod config;
pub mod error;

pub use error::{Error, Result};
