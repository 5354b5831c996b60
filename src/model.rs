use crate::core::{LayerId, PageIndex, SlideNumber};

/// A named, visibility-toggleable top-level group of the document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Layer {
    pub id: LayerId,
    pub label: String, // never empty once loaded
    pub visible: bool,
}

impl Layer {
    pub fn class(&self) -> LayerClass {
        LayerClass::of(&self.label)
    }
}

/// Role of a layer, selected by the first character of its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LayerClass {
    /// `.name`: never shown.
    Hidden,
    /// `_name`: shown on every slide that follows it.
    Base,
    /// `+name`: added on top of the current slide.
    Additive,
    /// Starts a new slide on top of the base layers.
    Normal,
}

impl LayerClass {
    pub fn of(label: &str) -> Self {
        match label.chars().next() {
            Some('.') => Self::Hidden,
            Some('_') => Self::Base,
            Some('+') => Self::Additive,
            _ => Self::Normal,
        }
    }

    /// Normal and additive layers are the ones that produce slides.
    pub fn is_slide_content(self) -> bool {
        matches!(self, Self::Additive | Self::Normal)
    }
}

/// One fully resolved page to render.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderRequest {
    pub slide: SlideNumber,
    pub page: PageIndex,
    pub visible: Vec<LayerId>, // composition order: base layers first
    pub trigger: LayerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigils_select_class() {
        assert_eq!(LayerClass::of(".guides"), LayerClass::Hidden);
        assert_eq!(LayerClass::of("_background"), LayerClass::Base);
        assert_eq!(LayerClass::of("+bullet"), LayerClass::Additive);
        assert_eq!(LayerClass::of("Intro"), LayerClass::Normal);
        assert_eq!(LayerClass::of("a.b_c+d"), LayerClass::Normal);
    }

    #[test]
    fn only_first_character_counts() {
        assert_eq!(LayerClass::of("+.x"), LayerClass::Additive);
        assert_eq!(LayerClass::of("._x"), LayerClass::Hidden);
    }
}
