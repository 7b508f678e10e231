//! Scratch directories for generated fixtures.

/// Fresh scratch directory, removed when the guard drops.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Scratch directory whose name starts with `prefix`.
///
/// Useful for paths containing characters that need escaping, e.g. `[`.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
