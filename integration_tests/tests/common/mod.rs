use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    debug_assert!(path.exists(), "missing fixture at {}", path.display());

    path
}
