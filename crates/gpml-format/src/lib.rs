//! Versioned GPML readers and writer.
//!
//! This crate maps GPML XML documents onto the canonical model in
//! `gpml-core` and back. It includes:
//!
//! - **Dialects**: namespace-keyed version detection ([`dialect`] module)
//! - **Schema**: per-dialect attribute tables driving defaults, elision and
//!   validation ([`schema`] module)
//! - **Reader**: one reader covering all dialects plus the post-load
//!   passes ([`reader`] module)
//! - **Writer**: serialization to the current dialect ([`writer`] module)
//! - **Validation**: optional table-driven strict checks ([`validate`]
//!   module)
//! - **Errors**: the one error taxonomy every failure normalizes into
//!   ([`error`] module)

pub mod dialect;
pub mod error;
pub mod reader;
pub mod schema;
pub mod validate;
pub mod writer;

mod xml;

pub use dialect::DialectId;
pub use error::ConversionError;
pub use reader::{ReadOptions, read_pathway, read_pathway_str};
pub use writer::{WriteOptions, write_pathway, write_pathway_string};
