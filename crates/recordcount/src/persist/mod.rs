//! JSON model documents.
//!
//! ```no_run
//! use recordcount::persist::JsonWriteOptions;
//! use recordcount::repr::Model;
//!
//! let model = Model::load_json("model.json")?;
//! model.save_json("copy.json", JsonWriteOptions::compact())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod convert;
mod error;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Deserialize;

pub use error::{ReadError, WriteError};
use schema::ModelDocumentSchema;

pub use crate::repr::Model;

/// Output formatting for [`Model::write_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonWriteOptions {
    pub pretty: bool,
}

impl JsonWriteOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonWriteOptions {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Model {
    /// Read and validate a model document.
    ///
    /// Nodes nest as deep as their trees, so the parser's nesting limit is
    /// lifted.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, ReadError> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        de.disable_recursion_limit();
        let schema = ModelDocumentSchema::deserialize(&mut de)?;
        de.end()?;
        Model::try_from(schema)
    }

    /// Read and validate a model document from a file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        Self::read_json(BufReader::new(file))
    }

    /// Write this model as a document.
    pub fn write_json<W: Write>(&self, writer: W, options: JsonWriteOptions) -> Result<(), WriteError> {
        let schema = ModelDocumentSchema::from(self);
        if options.pretty {
            serde_json::to_writer_pretty(writer, &schema)?;
        } else {
            serde_json::to_writer(writer, &schema)?;
        }
        Ok(())
    }

    /// Render the whole document in memory.
    pub fn to_json_vec(&self, options: JsonWriteOptions) -> Result<Vec<u8>, WriteError> {
        let mut out = Vec::new();
        self.write_json(&mut out, options)?;
        if options.pretty {
            out.push(b'\n');
        }
        Ok(out)
    }

    /// Write this model as a document to a file, replacing its contents.
    pub fn save_json(&self, path: impl AsRef<Path>, options: JsonWriteOptions) -> Result<(), WriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer, options)?;
        writer.flush()?;
        Ok(())
    }
}
