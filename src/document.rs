//! Layered SVG documents as written by Inkscape.
//!
//! The document is parsed once with `roxmltree` to find the top-level layers and the text
//! leaves carrying a `${slide}` marker. Edits are recorded against byte ranges of the
//! original source and spliced back in on serialization, so everything the edits do not
//! touch is written out exactly as it was read.

use std::{borrow::Cow, ops::Range, path::Path};

use anyhow::Context as _;

use crate::{
    core::{LayerId, SlideNumber},
    error::{DeckError, DeckResult},
    model::Layer,
};

pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// Marker replaced with the decimal slide number in text leaves.
pub const SLIDE_MARKER: &str = "${slide}";

#[derive(Clone, Debug)]
enum StyleSlot {
    /// Existing `style` attribute: the byte range of its quoted value and the decoded text.
    Attr { value: Range<usize>, decoded: String },
    /// No `style` attribute; a new one goes in front of the first attribute.
    Missing { insert_at: usize },
}

#[derive(Clone, Debug)]
struct LayerSlot {
    style: StyleSlot,
    touched: bool,
}

/// A text leaf together with the template it had when the document was loaded.
#[derive(Clone, Debug)]
pub struct SubstitutionTarget {
    range: Range<usize>,
    template: String,
    current: Option<String>,
}

impl SubstitutionTarget {
    pub fn template(&self) -> &str {
        &self.template
    }
}

#[derive(Clone, Debug)]
pub struct SvgDocument {
    source: String,
    layers: Vec<Layer>,
    slots: Vec<LayerSlot>,
    targets: Vec<SubstitutionTarget>,
}

impl SvgDocument {
    pub fn open(path: &Path) -> DeckResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read svg '{}'", path.display()))?;
        Self::parse(text)
    }

    #[tracing::instrument(skip_all)]
    pub fn parse(text: impl Into<String>) -> DeckResult<Self> {
        let source = text.into();
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(&source, opts)
            .map_err(|e| DeckError::malformed(format!("invalid svg: {e}")))?;

        let mut layers = Vec::new();
        let mut slots = Vec::new();
        for node in doc.root_element().children().filter(is_layer_group) {
            let id = LayerId(layers.len());
            let label = match node.attribute((INKSCAPE_NS, "label")) {
                Some(label) if !label.is_empty() => label.to_string(),
                _ => {
                    return Err(DeckError::malformed(format!(
                        "layer #{} (id '{}') has no inkscape:label",
                        id.0,
                        node.attribute("id").unwrap_or("?")
                    )));
                }
            };

            let style = match node
                .attributes()
                .find(|a| a.name() == "style" && a.namespace().is_none())
            {
                Some(attr) => StyleSlot::Attr {
                    value: attr.range_value(),
                    decoded: attr.value().to_string(),
                },
                // A layer always carries `inkscape:groupmode`, so there is a first attribute.
                None => match node.attributes().next() {
                    Some(first) => StyleSlot::Missing {
                        insert_at: first.range_qname().start,
                    },
                    None => {
                        return Err(DeckError::malformed(format!(
                            "layer '{label}' has no attributes"
                        )));
                    }
                },
            };
            let visible = match &style {
                StyleSlot::Attr { decoded, .. } => display_of(decoded) != Some("none"),
                StyleSlot::Missing { .. } => true,
            };

            layers.push(Layer { id, label, visible });
            slots.push(LayerSlot {
                style,
                touched: false,
            });
        }

        let targets = doc
            .descendants()
            .filter(|n| n.is_text())
            .filter(|n| {
                n.parent_element()
                    .is_some_and(|p| matches!(p.tag_name().name(), "text" | "tspan"))
            })
            .filter_map(|n| {
                let text = n.text()?;
                text.contains(SLIDE_MARKER).then(|| SubstitutionTarget {
                    range: text_span(&source, n),
                    template: text.to_string(),
                    current: None,
                })
            })
            .collect::<Vec<_>>();
        drop(doc);

        tracing::debug!(
            layers = layers.len(),
            targets = targets.len(),
            "loaded svg document"
        );

        Ok(Self {
            source,
            layers,
            slots,
            targets,
        })
    }

    /// Top-level layers in document order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn substitution_targets(&self) -> &[SubstitutionTarget] {
        &self.targets
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let (Some(layer), Some(slot)) = (self.layers.get_mut(id.0), self.slots.get_mut(id.0)) {
            layer.visible = visible;
            slot.touched = true;
        }
    }

    pub fn hide_all(&mut self) {
        for i in 0..self.layers.len() {
            self.set_visible(LayerId(i), false);
        }
    }

    /// Fill every `${slide}` marker from the original templates.
    pub fn substitute_slide(&mut self, slide: SlideNumber) {
        let number = slide.to_string();
        for target in &mut self.targets {
            target.current = Some(target.template.replace(SLIDE_MARKER, &number));
        }
    }

    pub fn to_svg_string(&self) -> String {
        let mut edits: Vec<(Range<usize>, Cow<'_, str>)> = Vec::new();

        for (layer, slot) in self.layers.iter().zip(&self.slots) {
            if !slot.touched {
                continue;
            }
            let display = if layer.visible { "inline" } else { "none" };
            match &slot.style {
                StyleSlot::Attr { value, decoded } => {
                    let style = with_display(decoded, display);
                    edits.push((value.clone(), Cow::Owned(escape_attr(&style).into_owned())));
                }
                StyleSlot::Missing { insert_at } => edits.push((
                    *insert_at..*insert_at,
                    Cow::Owned(format!("style=\"display:{display}\" ")),
                )),
            }
        }

        for target in &self.targets {
            if let Some(text) = &target.current {
                edits.push((target.range.clone(), escape_text(text)));
            }
        }

        edits.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.source.len() + 64);
        let mut pos = 0;
        for (range, replacement) in edits {
            out.push_str(&self.source[pos..range.start]);
            out.push_str(&replacement);
            pos = range.end;
        }
        out.push_str(&self.source[pos..]);
        out
    }

    pub fn write_to(&self, path: &Path) -> DeckResult<()> {
        std::fs::write(path, self.to_svg_string())
            .with_context(|| format!("write svg '{}'", path.display()))?;
        Ok(())
    }
}

fn is_layer_group(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_element()
        && node.tag_name().name() == "g"
        && node.attribute((INKSCAPE_NS, "groupmode")) == Some("layer")
}

/// Source span of a text node up to the next sibling or the parent's end tag.
///
/// roxmltree merges adjacent character data and CDATA sections into one node but reports
/// the range of the first chunk only.
fn text_span(source: &str, node: roxmltree::Node<'_, '_>) -> Range<usize> {
    let start = node.range().start;
    let end = match (node.next_sibling(), node.parent()) {
        (Some(next), _) => next.range().start,
        (None, Some(parent)) => {
            let parent = parent.range();
            source[start..parent.end]
                .rfind("</")
                .map_or(parent.end, |i| start + i)
        }
        (None, None) => node.range().end,
    };
    start..end.max(node.range().end)
}

fn declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        Some((prop.trim(), value.trim()))
    })
}

fn display_of(style: &str) -> Option<&str> {
    declarations(style)
        .filter(|(prop, _)| *prop == "display")
        .map(|(_, value)| value)
        .last()
}

/// Replace every `display` declaration of an inline style with a single `display:<value>`.
fn with_display(style: &str, display: &str) -> String {
    let mut out: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| decl.split(':').next().map(str::trim) != Some("display"))
        .map(str::to_string)
        .collect();
    out.push(format!("display:{display}"));
    out.join(";")
}

fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}
