#![warn(missing_docs)]
//! Core library entry points for the movie index builder.

pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod matrix;
pub mod pipeline;
pub mod records;
pub mod sidecar;
pub mod vector;

pub use config::{BuildCli, BuildPaths, ROOT_ENV};
pub use engine::{FlatIpEngine, FlatIpIndex, IndexEngine, IndexError, Metric};
pub use error::{BuildError, BuildResult};
pub use key::{stable_key, vector_key};
pub use matrix::VectorMatrix;
pub use pipeline::{assemble, build_index, BuildSummary, JoinTable, JoinedBatch};
pub use records::{read_records, Record};
pub use sidecar::{write_sidecar, Sidecar, SidecarItem};
pub use vector::{coerce_vector, infer_dimension, VectorRejection};
