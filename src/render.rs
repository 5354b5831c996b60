use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::{
    error::{DeckError, DeckResult},
    merge::{DirectoryMerger, PageMerger, PdftkMerger},
    tool::run_tool,
};

/// Renders the current working document into one page file.
pub trait Rasterizer {
    /// Extension of the page files this rasterizer writes (without the dot).
    fn page_extension(&self) -> &str;

    /// Render the page area of `svg` into `page`.
    fn rasterize(&mut self, svg: &Path, page: &Path) -> DeckResult<()>;
}

/// PDF pages through the `inkscape` command line.
#[derive(Clone, Debug)]
pub struct InkscapeRasterizer {
    pub program: PathBuf,
}

impl Default for InkscapeRasterizer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("inkscape"),
        }
    }
}

impl Rasterizer for InkscapeRasterizer {
    fn page_extension(&self) -> &str {
        "pdf"
    }

    fn rasterize(&mut self, svg: &Path, page: &Path) -> DeckResult<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-o").arg(page).arg("--export-area-page").arg(svg);
        run_tool(&mut cmd, "inkscape")
    }
}

/// PNG pages rendered in-process with `resvg`.
///
/// Text uses the system fonts; the viewport of the document is the page area.
pub struct ResvgRasterizer {
    fontdb: std::sync::Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self {
            fontdb: std::sync::Arc::new(db),
        }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn page_extension(&self) -> &str {
        "png"
    }

    fn rasterize(&mut self, svg: &Path, page: &Path) -> DeckResult<()> {
        let bytes =
            std::fs::read(svg).with_context(|| format!("read svg '{}'", svg.display()))?;
        let opts = usvg::Options {
            resources_dir: svg.parent().map(Path::to_path_buf),
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(&bytes, &opts).with_context(|| "parse svg tree")?;

        let size = tree.size().to_int_size();
        let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| DeckError::external_tool("failed to allocate page pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );

        // tiny-skia stores premultiplied pixels; PNG wants straight alpha.
        let mut data = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        image::save_buffer_with_format(
            page,
            &data,
            size.width(),
            size.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", page.display()))?;
        Ok(())
    }
}

/// Which rasterizer/merger pair renders the deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// `inkscape` PDF pages merged with `pdftk`.
    #[default]
    Inkscape,
    /// In-process PNG pages collected into a directory.
    Cpu,
}

impl BackendKind {
    /// Extension given to the merged output when no explicit path is requested.
    pub fn output_extension(self) -> &'static str {
        match self {
            Self::Inkscape => "pdf",
            Self::Cpu => "slides",
        }
    }
}

/// External programs used by the [`BackendKind::Inkscape`] backend.
#[derive(Clone, Debug)]
pub struct ToolPaths {
    pub inkscape: PathBuf,
    pub pdftk: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            inkscape: PathBuf::from("inkscape"),
            pdftk: PathBuf::from("pdftk"),
        }
    }
}

pub fn create_backend(
    kind: BackendKind,
    tools: &ToolPaths,
) -> (Box<dyn Rasterizer>, Box<dyn PageMerger>) {
    match kind {
        BackendKind::Inkscape => (
            Box::new(InkscapeRasterizer {
                program: tools.inkscape.clone(),
            }),
            Box::new(PdftkMerger {
                program: tools.pdftk.clone(),
            }),
        ),
        BackendKind::Cpu => (Box::new(ResvgRasterizer::new()), Box::new(DirectoryMerger)),
    }
}
