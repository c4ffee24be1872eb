//! Join movie metadata with embedding rows and build the index plus sidecar.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::BuildPaths;
use crate::engine::IndexEngine;
use crate::error::{BuildError, BuildResult};
use crate::key::{is_truthy, stable_key, vector_key};
use crate::matrix::VectorMatrix;
use crate::records::{read_records, Record};
use crate::sidecar::{write_sidecar, Sidecar, SidecarItem};
use crate::vector::{coerce_vector, infer_dimension, VECTOR_FIELD};

/// Movie records indexed by stable key. Later records overwrite earlier ones.
#[derive(Debug, Default)]
pub struct JoinTable {
    by_key: HashMap<String, Record>,
}

impl JoinTable {
    /// Indexes `movies`, dropping records with no derivable key.
    pub fn from_records(movies: Vec<Record>) -> Self {
        let mut by_key = HashMap::with_capacity(movies.len());
        for movie in movies {
            let key = stable_key(&movie);
            if key.is_empty() {
                continue;
            }
            by_key.insert(key, movie);
        }
        Self { by_key }
    }

    /// Movie stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.by_key.get(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the table holds no movies.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Normalized vectors and their metadata, paired by position.
#[derive(Debug, Clone)]
pub struct JoinedBatch {
    /// Unit-norm rows; row `i` belongs to `items[i]`.
    pub matrix: VectorMatrix,
    /// Metadata per row.
    pub items: Vec<SidecarItem>,
    /// Vector records dropped for a missing key or an invalid vector.
    pub skipped: usize,
}

impl JoinedBatch {
    /// Inferred vector dimension.
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Consumes the batch into its sidecar document, keeping item order.
    pub fn into_sidecar(self) -> Sidecar {
        Sidecar::new(self.matrix.dim(), self.skipped, self.items)
    }
}

/// Joins vector records to movies, validates and normalizes the vectors.
///
/// `vectors_path` only labels the missing-input error. No I/O happens here.
pub fn assemble(
    movies: Vec<Record>,
    vectors: Vec<Record>,
    vectors_path: &Path,
) -> BuildResult<JoinedBatch> {
    let table = JoinTable::from_records(movies);
    tracing::debug!(movies = table.len(), "built join table");

    if vectors.is_empty() {
        return Err(BuildError::MissingInput {
            path: vectors_path.to_path_buf(),
        });
    }
    let dim = infer_dimension(&vectors).ok_or_else(|| {
        BuildError::InvalidInput(format!(
            "no valid vectors found in {}",
            vectors_path.display()
        ))
    })?;
    tracing::debug!(dim, records = vectors.len(), "inferred vector dimension");

    let empty = Record {
        line: 0,
        fields: Default::default(),
    };
    let mut matrix = VectorMatrix::new(dim);
    let mut items = Vec::new();
    let mut skipped = 0usize;
    for record in &vectors {
        let key = vector_key(record);
        if key.is_empty() {
            skipped += 1;
            continue;
        }
        let Ok(vector) = coerce_vector(record.get(VECTOR_FIELD), Some(dim)) else {
            skipped += 1;
            continue;
        };
        let movie = table.get(&key).unwrap_or(&empty);
        matrix.push_row(&vector);
        items.push(compose_item(key, movie, record));
    }

    if items.is_empty() {
        return Err(BuildError::InvalidInput("no valid vectors to index".into()));
    }
    matrix.l2_normalize_rows();

    Ok(JoinedBatch {
        matrix,
        items,
        skipped,
    })
}

// Movie values win when present; otherwise the vector row's own value is used.
fn compose_item(key: String, movie: &Record, vector: &Record) -> SidecarItem {
    let pick = |field: &str| -> Option<Value> {
        match movie.get(field) {
            Some(value) if is_truthy(value) => Some(value.clone()),
            _ => vector.get(field).filter(|value| !value.is_null()).cloned(),
        }
    };
    let mood_tags = [movie.get("moodTags"), vector.get("moodTags")]
        .into_iter()
        .flatten()
        .find(|value| is_truthy(value))
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    SidecarItem {
        imdb_id: pick("imdbId"),
        id: pick("id"),
        key,
        title: pick("title"),
        year: pick("year"),
        genre: pick("genre"),
        production_country: pick("productionCountry"),
        mood_tags,
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Rows written to the index.
    pub count: usize,
    /// Vector records dropped.
    pub skipped: usize,
    /// Vector dimension.
    pub dim: usize,
    /// Index artifact location.
    pub index_path: PathBuf,
    /// Sidecar location.
    pub meta_path: PathBuf,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[OK] Indexed {} item(s). skipped={} dim={}",
            self.count, self.skipped, self.dim
        )?;
        writeln!(f, "[OK] Wrote: {}", self.index_path.display())?;
        write!(f, "[OK] Wrote: {}", self.meta_path.display())
    }
}

/// Runs the whole build: read, join, normalize, index, write.
///
/// Every fatal check happens before the first output file is created.
pub fn build_index<E: IndexEngine>(paths: &BuildPaths, engine: &E) -> BuildResult<BuildSummary> {
    let movies = read_records(&paths.movies)?;
    let vectors = read_records(&paths.vectors)?;
    let batch = assemble(movies, vectors, &paths.vectors)?;

    let mut index = engine.build(batch.dim())?;
    engine.add(&mut index, &batch.matrix)?;

    ensure_parent(&paths.out_index)?;
    engine.serialize(&index, &paths.out_index)?;

    let sidecar = batch.into_sidecar();
    ensure_parent(&paths.out_meta)?;
    write_sidecar(&paths.out_meta, &sidecar)?;

    let summary = BuildSummary {
        count: sidecar.count,
        skipped: sidecar.skipped,
        dim: sidecar.dim,
        index_path: paths.out_index.clone(),
        meta_path: paths.out_meta.clone(),
    };
    tracing::info!(
        count = summary.count,
        skipped = summary.skipped,
        dim = summary.dim,
        "index build complete"
    );
    Ok(summary)
}

fn ensure_parent(path: &Path) -> BuildResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| BuildError::io(parent, err))
        }
        _ => Ok(()),
    }
}
