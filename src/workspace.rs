use std::path::{Path, PathBuf};

use crate::core::PageIndex;

const TEMP_NAME: &str = "temp.svg";
const PAGE_PREFIX: &str = "slide-";

/// Owner of the temporary files of one run: the reused working document and one file per
/// rendered page.
#[derive(Clone, Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn temp_svg_path(&self) -> PathBuf {
        self.dir.join(TEMP_NAME)
    }

    pub fn page_path(&self, page: PageIndex, ext: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ext}", page.file_stem(PAGE_PREFIX)))
    }

    /// Remove the working document and every page file with extension `ext`, except `keep`.
    ///
    /// `keep` protects the merged output when it lives in the work dir under a page-like
    /// name. Best effort: a missing directory or a failed removal is not reported.
    pub fn clear(&self, ext: &str, keep: Option<&Path>) {
        let _ = std::fs::remove_file(self.temp_svg_path());

        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        let keep = keep.and_then(|p| std::fs::canonicalize(p).ok());
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_page_file(&path, ext) {
                continue;
            }
            if keep.is_some() && std::fs::canonicalize(&path).ok() == keep {
                continue;
            }
            tracing::debug!(path = %path.display(), "removing stale page");
            let _ = std::fs::remove_file(&path);
        }
    }
}

fn is_page_file(path: &Path, ext: &str) -> bool {
    let ext_matches = path.extension().is_some_and(|e| e == ext);
    let stem_matches = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix(PAGE_PREFIX))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    ext_matches && stem_matches
}
impl Default for Workspace {
    fn default() -> Self {
        Self::new(".")
    }
}
