use std::path::PathBuf;

/// Fresh per-test directory under the system temp dir; not created.
pub(crate) fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "layerdeck_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}
