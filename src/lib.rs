//! layerdeck turns a layered Inkscape SVG into a slide deck.
//!
//! Every top-level layer contributes to one or more pages, selected by the first character of
//! its label:
//!
//! - `.name`: hidden, never rendered
//! - `_name`: base layer, shown under every slide that follows it
//! - `+name`: additive layer, added on top of the current slide
//! - anything else: a new slide (base layers plus this layer)
//!
//! Text leaves containing `${slide}` get the current slide number.
//!
//! Pipeline: [`SvgDocument`] (load) -> [`SlideComposer`] (compose) -> [`build_deck`]
//! (render each page through a [`Rasterizer`], then merge with a [`PageMerger`]).
#![forbid(unsafe_code)]

mod foundation;

pub mod compose;
pub mod document;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod tool;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use crate::foundation::{core, error};

pub use crate::compose::{ComposeOpts, SlideComposer, Step, decide_step};
pub use crate::core::{LayerId, PageIndex, SlideNumber};
pub use crate::document::{SLIDE_MARKER, SubstitutionTarget, SvgDocument};
pub use crate::error::{DeckError, DeckResult};
pub use crate::merge::{DirectoryMerger, PageMerger, PdftkMerger};
pub use crate::model::{Layer, LayerClass, RenderRequest};
pub use crate::pipeline::{
    DeckOpts, DeckReport, PlannedPage, build_deck, default_output_path, plan_deck,
};
pub use crate::render::{
    BackendKind, InkscapeRasterizer, Rasterizer, ResvgRasterizer, ToolPaths, create_backend,
};
pub use crate::workspace::Workspace;
