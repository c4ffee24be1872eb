use std::fs;
use std::path::Path;

use movie_index::{build_index, BuildError, BuildPaths, FlatIpEngine, FlatIpIndex, Sidecar};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn layout(movies: Option<&str>, vectors: Option<&str>) -> (TempDir, BuildPaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = BuildPaths::from_root(dir.path());
    if let Some(body) = movies {
        write(&paths.movies, body);
    }
    if let Some(body) = vectors {
        write(&paths.vectors, body);
    }
    (dir, paths)
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn norm(row: &[f32]) -> f32 {
    row.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[test]
fn single_joined_record() {
    let (_dir, paths) = layout(
        Some(r#"{"imdbId":"tt1","title":"X","year":2000}"#),
        Some(r#"{"key":"tt1","vector":[1,0,0]}"#),
    );
    let summary = build_index(&paths, &FlatIpEngine).expect("build");
    assert_eq!((summary.count, summary.skipped, summary.dim), (1, 0, 3));

    let sidecar = Sidecar::load(&paths.out_meta).expect("sidecar");
    assert_eq!((sidecar.dim, sidecar.count, sidecar.skipped), (3, 1, 0));
    let item = &sidecar.items[0];
    assert_eq!(item.imdb_id, Some(json!("tt1")));
    assert_eq!(item.title, Some(json!("X")));
    assert_eq!(item.year, Some(json!(2000)));
    assert_eq!(item.key, "tt1");

    let index = FlatIpIndex::load(&paths.out_index).expect("index");
    assert_eq!(index.len(), 1);
    assert_eq!(index.dim(), 3);
    assert_eq!(index.row(0), Some(&[1.0, 0.0, 0.0][..]));
}

#[test]
fn dimension_mismatch_is_skipped() {
    let (_dir, paths) = layout(
        None,
        Some("{\"key\":\"a\",\"vector\":[1,2]}\n{\"key\":\"b\",\"vector\":[1,2,3]}\n"),
    );
    let summary = build_index(&paths, &FlatIpEngine).expect("build");
    assert_eq!((summary.count, summary.skipped, summary.dim), (1, 1, 2));
}

#[test]
fn missing_movies_falls_back_to_vector_fields() {
    let vectors = [
        json!({"imdbId": "tt7", "title": "Solo", "genre": "drama", "vector": [0, 2]}),
        json!({"key": "bare", "vector": [3, 0]}),
    ]
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("\n");
    let (_dir, paths) = layout(None, Some(&vectors));
    build_index(&paths, &FlatIpEngine).expect("build");

    let sidecar = Sidecar::load(&paths.out_meta).expect("sidecar");
    let first = &sidecar.items[0];
    assert_eq!(first.key, "tt7");
    assert_eq!(first.imdb_id, Some(json!("tt7")));
    assert_eq!(first.title, Some(json!("Solo")));
    assert_eq!(first.genre, Some(json!("drama")));
    assert_eq!(first.year, None);

    let second = &sidecar.items[1];
    assert_eq!(second.key, "bare");
    assert_eq!(second.title, None);
    assert_eq!(second.mood_tags, json!([]));
}

#[test]
fn missing_or_empty_vectors_fail_without_output() {
    for vectors in [None, Some(""), Some("# only a comment\n\n")] {
        let (_dir, paths) = layout(Some(r#"{"imdbId":"tt1"}"#), vectors);
        let err = build_index(&paths, &FlatIpEngine).expect_err("must fail");
        assert!(
            matches!(err, BuildError::MissingInput { .. }),
            "unexpected error: {err}"
        );
        assert!(!paths.out_index.exists());
        assert!(!paths.out_meta.exists());
    }
}

#[test]
fn nothing_valid_fails_without_output() {
    let (_dir, paths) = layout(None, Some(r#"{"vector":[1,2,3]}"#));
    let err = build_index(&paths, &FlatIpEngine).expect_err("must fail");
    assert!(matches!(err, BuildError::InvalidInput(_)));
    assert!(!paths.out_index.parent().unwrap().exists());
}

#[test]
fn non_finite_vectors_are_skipped() {
    for bad in ["[NaN,0,1]", "[0,-Infinity,1]", "[null,0,1]"] {
        let vectors = format!(
            "{{\"key\":\"ok\",\"vector\":[0,1,0]}}\n{{\"key\":\"bad\",\"vector\":{bad}}}\n"
        );
        let (_dir, paths) = layout(None, Some(&vectors));
        let summary = build_index(&paths, &FlatIpEngine).expect("build");
        assert_eq!((summary.count, summary.skipped, summary.dim), (1, 1, 3), "{bad}");
    }
}

#[test]
fn non_finite_first_record_still_sets_dimension() {
    let (_dir, paths) = layout(
        None,
        Some("{\"key\":\"a\",\"vector\":[NaN,0,1]}\n{\"key\":\"b\",\"vector\":[1,2]}\n"),
    );
    let err = build_index(&paths, &FlatIpEngine).expect_err("must fail");
    assert!(
        matches!(err, BuildError::InvalidInput(_)),
        "unexpected error: {err}"
    );
    assert!(!paths.out_index.exists());
}

#[test]
fn only_non_finite_vectors_is_invalid_input() {
    let (_dir, paths) = layout(None, Some("{\"key\":\"a\",\"vector\":[Infinity,0,1]}\n"));
    let err = build_index(&paths, &FlatIpEngine).expect_err("must fail");
    assert!(
        matches!(err, BuildError::InvalidInput(_)),
        "unexpected error: {err}"
    );
}

#[test]
fn carriage_return_files_are_read_line_by_line() {
    let (_dir, paths) = layout(
        Some("{\"imdbId\":\"tt1\",\"title\":\"X\"}\r"),
        Some("{\"key\":\"tt1\",\"vector\":[1,0]}\r{\"key\":\"tt2\",\"vector\":[0,1]}\r"),
    );
    let summary = build_index(&paths, &FlatIpEngine).expect("build");
    assert_eq!((summary.count, summary.skipped), (2, 0));

    let sidecar = Sidecar::load(&paths.out_meta).expect("sidecar");
    assert_eq!(sidecar.items[0].title, Some(json!("X")));
}

#[test]
fn rows_align_with_items_and_are_unit_norm() {
    let movies = "{\"imdbId\":\"tt2\",\"title\":\"Two\",\"moodTags\":[\"dark\"]}\n\
                  {\"imdbId\":\"tt1\",\"title\":\"Old One\"}\n\
                  {\"imdbId\":\"tt1\",\"title\":\"One\"}\n";
    let vectors = "{\"key\":\"tt1\",\"vector\":[3,4]}\n\
                   {\"vector\":[1,1]}\n\
                   {\"imdbId\":\"tt2\",\"vector\":[0,0]}\n\
                   {\"id\":\"m3\",\"title\":\"Three\",\"vector\":[-5,0]}\n";
    let (_dir, paths) = layout(Some(movies), Some(vectors));
    let summary = build_index(&paths, &FlatIpEngine).expect("build");
    assert_eq!((summary.count, summary.skipped), (3, 1));

    let sidecar = Sidecar::load(&paths.out_meta).expect("sidecar");
    let index = FlatIpIndex::load(&paths.out_index).expect("index");
    assert_eq!(index.len(), sidecar.items.len());

    let keys: Vec<&str> = sidecar.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["tt1", "tt2", "m3"]);
    assert_eq!(sidecar.items[0].title, Some(json!("One")));
    assert_eq!(sidecar.items[1].mood_tags, json!(["dark"]));
    assert_eq!(sidecar.items[2].title, Some(json!("Three")));

    assert_eq!(index.row(0), Some(&[0.6, 0.8][..]));
    assert_eq!(index.row(1), Some(&[0.0, 0.0][..]));
    assert_eq!(index.row(2), Some(&[-1.0, 0.0][..]));
    for idx in [0, 2] {
        assert!((norm(index.row(idx).unwrap()) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn rebuilding_is_byte_identical() {
    let movies = "{\"imdbId\":\"tt1\",\"title\":\"Amélie\",\"productionCountry\":\"France\"}\n";
    let vectors = "// generated\n{\"key\":\"tt1\",\"vector\":[0.1,0.2,0.3]}\n\
                   {\"title\":\"Heat\",\"year\":1995,\"vector\":[1,2,3]}\n";
    let (_dir, paths) = layout(Some(movies), Some(vectors));

    build_index(&paths, &FlatIpEngine).expect("first build");
    let first_meta = fs::read(&paths.out_meta).unwrap();
    let first_index = fs::read(&paths.out_index).unwrap();

    build_index(&paths, &FlatIpEngine).expect("second build");
    assert_eq!(fs::read(&paths.out_meta).unwrap(), first_meta);
    assert_eq!(fs::read(&paths.out_index).unwrap(), first_index);

    let text = String::from_utf8(first_meta).unwrap();
    assert!(text.contains("\"title\": \"Amélie\""));
    assert!(text.contains("\"key\": \"heat|1995\""));
}
