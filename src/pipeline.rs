use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    compose::{ComposeOpts, SlideComposer},
    core::{LayerId, PageIndex, SlideNumber},
    document::SvgDocument,
    error::DeckResult,
    merge::PageMerger,
    render::Rasterizer,
    workspace::Workspace,
};

/// Options for [`build_deck`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DeckOpts {
    pub compose: ComposeOpts,
}

/// Outcome of a [`build_deck`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DeckReport {
    /// Logical slides started by normal layers.
    pub slides: u32,
    /// Render requests processed (one page each).
    pub pages: u32,
    /// Pages whose rasterizer call failed; they are left out of the merge.
    pub failed_pages: Vec<PageIndex>,
    /// Merged output, `None` when nothing was rendered.
    pub output: Option<PathBuf>,
}

/// One page of a dry-run plan, with layer labels resolved.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlannedPage {
    pub page: PageIndex,
    pub slide: SlideNumber,
    pub trigger: String,
    pub layers: Vec<String>,
}

/// Compose the document without rendering anything.
pub fn plan_deck(doc: &SvgDocument, opts: ComposeOpts) -> Vec<PlannedPage> {
    let label = |id: LayerId| {
        doc.layer(id)
            .map(|l| l.label.clone())
            .unwrap_or_default()
    };
    SlideComposer::new(doc.layers(), opts)
        .map(|req| PlannedPage {
            page: req.page,
            slide: req.slide,
            trigger: label(req.trigger),
            layers: req.visible.iter().copied().map(label).collect(),
        })
        .collect()
}

/// Layers made visible for one render; hidden again when dropped, whether or not the render
/// succeeded.
struct ShownLayers<'a> {
    doc: &'a mut SvgDocument,
    shown: Vec<LayerId>,
}

impl<'a> ShownLayers<'a> {
    fn show(doc: &'a mut SvgDocument, layers: &[LayerId]) -> Self {
        for &id in layers {
            doc.set_visible(id, true);
        }
        Self {
            doc,
            shown: layers.to_vec(),
        }
    }

    fn doc(&mut self) -> &mut SvgDocument {
        &mut *self.doc
    }
}

impl Drop for ShownLayers<'_> {
    fn drop(&mut self) {
        for &id in &self.shown {
            self.doc.set_visible(id, false);
        }
    }
}

/// Render one page per composed request and merge them into `out_path`.
///
/// Pipeline:
/// 1. clear stale files from `workspace` and hide every layer,
/// 2. for each request: show its layers, fill `${slide}`, write the working document and
///    call `rasterizer`, then hide the layers again,
/// 3. merge the rendered pages in page order,
/// 4. clear `workspace` again.
///
/// Clearing never removes `out_path`, even when it sits in the work dir under a page name.
///
/// A failed rasterizer call is logged and recorded in [`DeckReport::failed_pages`]; the run
/// goes on with the next page. Merge failures are returned as errors. The source file of
/// `doc` is never written.
#[tracing::instrument(skip_all, fields(out = %out_path.display()))]
pub fn build_deck(
    doc: &mut SvgDocument,
    workspace: &Workspace,
    rasterizer: &mut dyn Rasterizer,
    merger: &mut dyn PageMerger,
    out_path: &Path,
    opts: &DeckOpts,
) -> DeckResult<DeckReport> {
    let ext = rasterizer.page_extension().to_string();
    workspace.clear(&ext, Some(out_path));

    let result = render_and_merge(doc, workspace, rasterizer, merger, out_path, opts, &ext);

    workspace.clear(&ext, Some(out_path));
    result
}

fn render_and_merge(
    doc: &mut SvgDocument,
    workspace: &Workspace,
    rasterizer: &mut dyn Rasterizer,
    merger: &mut dyn PageMerger,
    out_path: &Path,
    opts: &DeckOpts,
    ext: &str,
) -> DeckResult<DeckReport> {
    std::fs::create_dir_all(workspace.dir())
        .with_context(|| format!("create work dir '{}'", workspace.dir().display()))?;
    doc.hide_all();

    let mut composer = SlideComposer::new(doc.layers(), opts.compose);
    let temp_svg = workspace.temp_svg_path();
    let mut report = DeckReport::default();
    let mut pages = Vec::new();

    for req in composer.by_ref() {
        let page_path = workspace.page_path(req.page, ext);
        let label = doc
            .layer(req.trigger)
            .map(|l| l.label.clone())
            .unwrap_or_default();

        let rendered = {
            let mut shown = ShownLayers::show(doc, &req.visible);
            shown.doc().substitute_slide(req.slide);
            shown.doc().write_to(&temp_svg)?;
            tracing::info!(layer = %label, page = %page_path.display(), "exporting");
            rasterizer.rasterize(&temp_svg, &page_path)
        };
        report.pages += 1;

        match rendered {
            Ok(()) if page_path.exists() => pages.push(page_path),
            Ok(()) => {
                tracing::warn!(page = %page_path.display(), "rasterizer produced no page");
                report.failed_pages.push(req.page);
            }
            Err(e) => {
                tracing::warn!(page = %page_path.display(), error = %e, "page failed to render");
                report.failed_pages.push(req.page);
            }
        }
    }
    report.slides = composer.slides_started().0;

    if pages.is_empty() {
        if report.pages == 0 {
            tracing::info!("no slide layers found, nothing to render");
        } else {
            tracing::warn!("no page rendered successfully, skipping merge");
        }
        return Ok(report);
    }

    merger.merge(&pages, out_path)?;
    tracing::info!(path = %out_path.display(), "output written");
    report.output = Some(out_path.to_path_buf());
    Ok(report)
}

/// Default output path: the source path with its extension replaced by `ext`.
pub fn default_output_path(source: &Path, ext: &str) -> PathBuf {
    source.with_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g inkscape:groupmode="layer" inkscape:label="_bg"/>
  <g inkscape:groupmode="layer" inkscape:label="one"/>
  <g inkscape:groupmode="layer" inkscape:label="+two"/>
  <g inkscape:groupmode="layer" inkscape:label=".notes"/>
</svg>"#;

    #[test]
    fn guard_hides_layers_on_drop() {
        let mut doc = SvgDocument::parse(DECK).unwrap();
        doc.hide_all();
        {
            let mut shown = ShownLayers::show(&mut doc, &[LayerId(0), LayerId(2)]);
            assert!(shown.doc().layer(LayerId(0)).unwrap().visible);
            assert!(!shown.doc().layer(LayerId(1)).unwrap().visible);
            assert!(shown.doc().layer(LayerId(2)).unwrap().visible);
        }
        assert!(doc.layers().iter().all(|l| !l.visible));
    }

    #[test]
    fn plan_resolves_labels() {
        let doc = SvgDocument::parse(DECK).unwrap();
        let plan = plan_deck(&doc, ComposeOpts::default());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].layers, vec!["_bg", "one"]);
        assert_eq!(plan[1].layers, vec!["_bg", "one", "+two"]);
        assert_eq!(plan[1].trigger, "+two");

        let flat = plan_deck(&doc, ComposeOpts { flatten: true });
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].page, PageIndex(0));
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            default_output_path(Path::new("talks/intro.svg"), "pdf"),
            PathBuf::from("talks/intro.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("deck"), "slides"),
            PathBuf::from("deck.slides")
        );
    }
}
