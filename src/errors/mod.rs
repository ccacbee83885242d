//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures carrying a description of the offending construct
//! - Specific error variants for each failure, grouped into categories
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions
//!
//! Every error is fatal: the first one aborts the compilation.

pub mod errors;
