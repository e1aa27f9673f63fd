//! Core components for awsfetch.
//!
//! This crate provides the foundational types shared by the awsfetch crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending,
//!   and environment access
//! - **Error**: The single error type used across the workspace, with a [`ErrorKind`] for
//!   every failure class
//! - **Utilities**: hashing, time formatting and secret redaction
//!
//! ## Example
//!
//! ```no_run
//! use awsfetch_core::{Context, OsEnv, Result};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//!
//! if let Some(path) = ctx.expand_home_dir("~/.aws/config") {
//!     let content = ctx.file_read_as_string(&path).await?;
//!     println!("{content}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, NoopEnv, NoopFileRead, NoopHttpSend};
mod fs;
pub use fs::FileRead;
mod http;
pub use http::{HttpSend, Timeout};
mod env;
pub use env::{Env, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};
