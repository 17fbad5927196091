//! GPML pathway diagrams: model, readers and writer.
//!
//! This crate ties the canonical pathway model (`gpml-core`) and the
//! versioned XML format layer (`gpml-format`) together behind simple
//! load/save entry points.
//!
//! # Examples
//!
//! ```rust,no_run
//! let mut model = gpml::load("pathways/glycolysis.gpml", false)
//!     .expect("failed to load");
//!
//! // ... mutate the model through its API ...
//!
//! gpml::save(&mut model, "pathways/glycolysis.gpml", true)
//!     .expect("failed to save");
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;

pub use gpml_core::{color, connector, element, event, geometry, model};
pub use gpml_format::{
    ConversionError, DialectId, ReadOptions, WriteOptions, read_pathway_str, write_pathway_string,
};

use gpml_core::model::PathwayModel;

/// Loads a pathway from a file, detecting the dialect from the document's
/// namespace.
///
/// With `validate` set, the document is checked against the dialect's
/// schema before mapping; without it, untrusted and sloppy legacy files
/// still load.
pub fn load<P: AsRef<Path>>(path: P, validate: bool) -> Result<PathwayModel, ConversionError> {
    info!(path:? = path.as_ref(); "loading pathway");
    let file = File::open(path)?;
    load_from(BufReader::new(file), validate)
}

/// Loads a pathway from any reader.
pub fn load_from<R: Read>(reader: R, validate: bool) -> Result<PathwayModel, ConversionError> {
    gpml_format::read_pathway(reader, &ReadOptions { validate })
}

/// Saves a pathway to a file in the current dialect.
///
/// Dangling references are repaired before writing; with `validate` set,
/// the produced document is checked against the current schema.
pub fn save<P: AsRef<Path>>(
    model: &mut PathwayModel,
    path: P,
    validate: bool,
) -> Result<(), ConversionError> {
    info!(path:? = path.as_ref(); "saving pathway");
    let file = File::create(path)?;
    save_to(model, BufWriter::new(file), validate)
}

/// Saves a pathway into any writer.
pub fn save_to<W: Write>(
    model: &mut PathwayModel,
    writer: W,
    validate: bool,
) -> Result<(), ConversionError> {
    model.fix_references();
    gpml_format::write_pathway(model, writer, &WriteOptions { validate })
}
