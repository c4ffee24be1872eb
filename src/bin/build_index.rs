use anyhow::{Context, Result};
use clap::Parser;
use movie_index::{build_index, BuildCli, FlatIpEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = BuildCli::parse();
    let paths = cli.build_paths()?;
    let summary = build_index(&paths, &FlatIpEngine).with_context(|| {
        format!(
            "failed to build index from {:?} and {:?}",
            paths.movies, paths.vectors
        )
    })?;
    println!("{summary}");
    Ok(())
}
