//! Command-line and environment configuration for index builds.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::{BuildError, BuildResult};

/// Environment variable naming the data root.
pub const ROOT_ENV: &str = "LOCAL_DATA_PATH";

/// Input and output locations for one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPaths {
    /// Movie metadata NDJSON (optional input).
    pub movies: PathBuf,
    /// Embedding NDJSON (required input).
    pub vectors: PathBuf,
    /// Index artifact destination.
    pub out_index: PathBuf,
    /// Sidecar metadata destination.
    pub out_meta: PathBuf,
}

impl BuildPaths {
    /// Default layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            movies: root.join("movies").join("movies.ndjson"),
            vectors: root.join("vectors").join("embeddings.ndjson"),
            out_index: root.join("index").join("faiss.index"),
            out_meta: root.join("index").join("meta.json"),
        }
    }
}

/// Command-line interface for the index builder.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "movie-index-build",
    about = "Build a flat inner-product index from movie and embedding NDJSON files"
)]
pub struct BuildCli {
    /// Root folder containing movies/, vectors/ and index/
    #[arg(long, env = ROOT_ENV)]
    pub local_data_path: Option<String>,

    /// Movies NDJSON (default: <root>/movies/movies.ndjson)
    #[arg(long, env = "MOVIE_INDEX_MOVIES")]
    pub movies: Option<String>,

    /// Embeddings NDJSON (default: <root>/vectors/embeddings.ndjson)
    #[arg(long, env = "MOVIE_INDEX_VECTORS")]
    pub vectors: Option<String>,

    /// Output index path (default: <root>/index/faiss.index)
    #[arg(long, env = "MOVIE_INDEX_OUT_INDEX")]
    pub out_index: Option<String>,

    /// Output metadata JSON path (default: <root>/index/meta.json)
    #[arg(long, env = "MOVIE_INDEX_OUT_META")]
    pub out_meta: Option<String>,
}

impl BuildCli {
    /// Resolves the root and applies per-path overrides.
    ///
    /// A blank `--local-data-path` falls back to [`ROOT_ENV`]. Fails with
    /// [`BuildError::Configuration`] before touching any file when the root is
    /// unset or blank.
    pub fn build_paths(&self) -> BuildResult<BuildPaths> {
        let env_root = std::env::var(ROOT_ENV).ok();
        let raw = root_value(self.local_data_path.as_deref(), env_root.as_deref());
        let root = resolve_root(raw)?;
        let defaults = BuildPaths::from_root(&root);
        Ok(BuildPaths {
            movies: pick(&self.movies, defaults.movies),
            vectors: pick(&self.vectors, defaults.vectors),
            out_index: pick(&self.out_index, defaults.out_index),
            out_meta: pick(&self.out_meta, defaults.out_meta),
        })
    }
}

// Flag value unless blank, then the environment value.
fn root_value<'a>(flag: Option<&'a str>, env: Option<&'a str>) -> Option<&'a str> {
    flag.filter(|raw| !raw.trim().is_empty()).or(env)
}

/// Expands `~` and makes the root absolute.
pub fn resolve_root(raw: Option<&str>) -> BuildResult<PathBuf> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty()).ok_or_else(|| {
        BuildError::Configuration(format!(
            "missing {ROOT_ENV}; set it (or pass --local-data-path) to a local output folder"
        ))
    })?;
    let expanded = expand_home(raw);
    std::path::absolute(&expanded).map_err(|err| BuildError::io(expanded, err))
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(raw),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

// Empty overrides count as unset.
fn pick(value: &Option<String>, default: PathBuf) -> PathBuf {
    value
        .as_deref()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}
