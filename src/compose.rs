//! Slide composition: turns the ordered layer list into render requests.
//!
//! Layers are walked bottom to top. Base layers (`_`) accumulate and are shown under every
//! later slide, normal layers start a new slide, additive layers (`+`) extend the current
//! one, and hidden layers (`.`) are dropped before the walk starts.
//!
//! With flattening enabled, every state that is immediately followed by an additive layer
//! is deferred, so a build-up sequence renders only its final frame.

use crate::{
    core::{LayerId, PageIndex, SlideNumber},
    model::{Layer, LayerClass, RenderRequest},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComposeOpts {
    /// Coalesce additive build-ups into their final frame.
    pub flatten: bool,
}

/// Whether the state reached after a layer is rendered now or folded into a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Emit,
    Defer,
}

/// Decide the step for a slide-content layer.
///
/// `is_last_content` is true for the last normal/additive layer of the working list, which
/// always emits. `next` is the class of the following working-list layer, if any.
pub fn decide_step(flatten: bool, is_last_content: bool, next: Option<LayerClass>) -> Step {
    if !flatten || is_last_content {
        return Step::Emit;
    }
    match next {
        Some(LayerClass::Additive | LayerClass::Hidden) => Step::Defer,
        Some(LayerClass::Base | LayerClass::Normal) | None => Step::Emit,
    }
}

#[derive(Clone, Debug)]
struct WorkingLayer {
    id: LayerId,
    label: String,
    class: LayerClass,
}

/// Lazy, single-pass producer of [`RenderRequest`]s.
///
/// Requests are produced one at a time through [`Iterator`]; nothing is materialized ahead
/// of the consumer.
#[derive(Clone, Debug)]
pub struct SlideComposer {
    layers: Vec<WorkingLayer>,
    last_content: Option<usize>,
    cursor: usize,
    base: Vec<LayerId>,
    visible: Vec<LayerId>,
    slide: SlideNumber,
    next_page: PageIndex,
    opts: ComposeOpts,
}

impl SlideComposer {
    pub fn new<'a>(layers: impl IntoIterator<Item = &'a Layer>, opts: ComposeOpts) -> Self {
        let layers: Vec<WorkingLayer> = layers
            .into_iter()
            .map(|l| WorkingLayer {
                id: l.id,
                label: l.label.clone(),
                class: l.class(),
            })
            .filter(|l| l.class != LayerClass::Hidden)
            .collect();
        let last_content = layers.iter().rposition(|l| l.class.is_slide_content());

        Self {
            layers,
            last_content,
            cursor: 0,
            base: Vec::new(),
            visible: Vec::new(),
            slide: SlideNumber(0),
            next_page: PageIndex(0),
            opts,
        }
    }

    /// Number of logical slides started so far.
    pub fn slides_started(&self) -> SlideNumber {
        self.slide
    }

    /// Number of requests emitted so far.
    pub fn pages_emitted(&self) -> u32 {
        self.next_page.0
    }

    fn emit(&mut self, trigger: LayerId) -> RenderRequest {
        let page = self.next_page;
        self.next_page.0 += 1;
        RenderRequest {
            slide: self.slide,
            page,
            visible: self.visible.clone(),
            trigger,
        }
    }
}

impl Iterator for SlideComposer {
    type Item = RenderRequest;

    fn next(&mut self) -> Option<RenderRequest> {
        while self.cursor < self.layers.len() {
            let pos = self.cursor;
            self.cursor += 1;

            let id = self.layers[pos].id;
            match self.layers[pos].class {
                LayerClass::Hidden => continue,
                LayerClass::Base => {
                    self.base.push(id);
                    continue;
                }
                LayerClass::Additive => self.visible.push(id),
                LayerClass::Normal => {
                    self.visible.clear();
                    self.visible.extend_from_slice(&self.base);
                    self.visible.push(id);
                    self.slide.0 += 1;
                }
            }

            let next = self.layers.get(pos + 1).map(|l| l.class);
            let is_last_content = self.last_content == Some(pos);
            match decide_step(self.opts.flatten, is_last_content, next) {
                Step::Defer => {
                    tracing::info!(layer = %self.layers[pos].label, "flattening layer");
                }
                Step::Emit => return Some(self.emit(id)),
            }
        }
        None
    }
}
