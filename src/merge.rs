use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::{
    error::{DeckError, DeckResult},
    tool::{ensure_parent_dir, is_tool_on_path, run_tool},
};

/// Concatenates rendered pages, in the given order, into the final output.
pub trait PageMerger {
    fn merge(&mut self, pages: &[PathBuf], out: &Path) -> DeckResult<()>;
}

/// Single PDF through `pdftk <pages...> cat output <out>`.
#[derive(Clone, Debug)]
pub struct PdftkMerger {
    pub program: PathBuf,
}

impl Default for PdftkMerger {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pdftk"),
        }
    }
}

impl PageMerger for PdftkMerger {
    fn merge(&mut self, pages: &[PathBuf], out: &Path) -> DeckResult<()> {
        ensure_parent_dir(out)?;
        let mut cmd = Command::new(&self.program);
        cmd.args(pages).arg("cat").arg("output").arg(out);

        run_tool(&mut cmd, "pdftk").map_err(|e| {
            if is_tool_on_path(&self.program) {
                e
            } else {
                DeckError::external_tool(format!(
                    "failed to combine pages, check that pdftk is installed ({e})"
                ))
            }
        })
    }
}

/// Copies the pages, in order, into the directory `out`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectoryMerger;

impl PageMerger for DirectoryMerger {
    fn merge(&mut self, pages: &[PathBuf], out: &Path) -> DeckResult<()> {
        std::fs::create_dir_all(out)
            .with_context(|| format!("create output dir '{}'", out.display()))?;
        for page in pages {
            let name = page.file_name().ok_or_else(|| {
                DeckError::external_tool(format!("page path '{}' has no file name", page.display()))
            })?;
            let dest = out.join(name);
            std::fs::copy(page, &dest)
                .with_context(|| format!("copy '{}' to '{}'", page.display(), dest.display()))?;
        }
        Ok(())
    }
}
