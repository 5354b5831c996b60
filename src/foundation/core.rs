/// Position of a layer in document order (bottom to top).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub usize);

/// Logical slide number substituted into `${slide}` markers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct SlideNumber(pub u32);

impl std::fmt::Display for SlideNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 0-based index of a rendered page. Contiguous even when flattening skips slides.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct PageIndex(pub u32);

impl PageIndex {
    /// Page file stem, zero-padded to at least 3 digits (`slide-007`, `slide-1234`).
    pub fn file_stem(self, prefix: &str) -> String {
        format!("{prefix}{:03}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_stem_pads_to_three_digits() {
        assert_eq!(PageIndex(0).file_stem("slide-"), "slide-000");
        assert_eq!(PageIndex(42).file_stem("slide-"), "slide-042");
        assert_eq!(PageIndex(1234).file_stem("slide-"), "slide-1234");
    }

    #[test]
    fn slide_number_displays_as_decimal() {
        assert_eq!(SlideNumber(12).to_string(), "12");
    }
}
