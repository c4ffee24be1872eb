//! Metadata sidecar aligned row-for-row with the index artifact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BuildError, BuildResult};

/// Metadata for one indexed vector. `items[i]` describes index row `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarItem {
    /// IMDb identifier, if known.
    pub imdb_id: Option<Value>,
    /// Catalog identifier, if known.
    pub id: Option<Value>,
    /// Join key the vector was indexed under.
    pub key: String,
    /// Display title.
    pub title: Option<Value>,
    /// Release year.
    pub year: Option<Value>,
    /// Genre label(s).
    pub genre: Option<Value>,
    /// Production country.
    pub production_country: Option<Value>,
    /// Mood tags; empty array when unknown.
    #[serde(default = "empty_tags")]
    pub mood_tags: Value,
}

fn empty_tags() -> Value {
    Value::Array(Vec::new())
}

/// Sidecar document written next to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    /// Vector dimension.
    pub dim: usize,
    /// Number of indexed rows.
    pub count: usize,
    /// Vector records dropped during validation.
    pub skipped: usize,
    /// Per-row metadata in index order.
    pub items: Vec<SidecarItem>,
}

impl Sidecar {
    /// Builds a sidecar; `count` is taken from `items`.
    pub fn new(dim: usize, skipped: usize, items: Vec<SidecarItem>) -> Self {
        Self {
            dim,
            count: items.len(),
            skipped,
            items,
        }
    }

    /// Reads a sidecar back from disk.
    pub fn load(path: &Path) -> BuildResult<Self> {
        let file = File::open(path).map_err(|err| BuildError::io(path, err))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| BuildError::Sidecar {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Writes `sidecar` as 2-space pretty JSON with non-ASCII text kept verbatim.
///
/// The parent directory must already exist.
pub fn write_sidecar(path: &Path, sidecar: &Sidecar) -> BuildResult<()> {
    let file = File::create(path).map_err(|err| BuildError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, sidecar).map_err(|source| BuildError::Sidecar {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|err| BuildError::io(path, err))?;
    Ok(())
}
