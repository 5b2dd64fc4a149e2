//! Core library for codepreview
//!
//! This crate implements the **Functional Core** of the codepreview tool,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`codepreview_core`** (this crate): validation, prompt construction and
//!   document normalization with no process, network or filesystem I/O
//! - **`codepreview`**: file operators, model clients, the CLI and the MCP
//!   server (the Imperative Shell)
//!
//! The shell asks the core what to do with a request, performs the I/O the
//! core cannot, and hands results back to the core for shaping.
//!
//! # Module Organization
//!
//! - [`preview`]: everything the `code_preview` tool decides without touching
//!   the outside world
//!     - [`preview::validate`]: argument and sandbox path checks
//!     - [`preview::prompt`]: the system instruction and conversation builder
//!     - [`preview::document`]: model-response extraction and HTML normalization
//!     - [`preview::history`]: the bounded, caller-owned generation history
//!     - [`preview::types`]: request, conversation and envelope types
//!
//! # Example Usage
//!
//! ```rust
//! use codepreview_core::preview::{finalize_response, ModelResponse};
//!
//! let document = finalize_response(ModelResponse::Text("<p>hello</p>".to_string())).unwrap();
//!
//! assert!(document.starts_with("<!DOCTYPE html>"));
//! assert!(document.contains("<p>hello</p>"));
//! ```

pub mod preview;
