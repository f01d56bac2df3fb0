use std::num::NonZeroUsize;

use crate::dom::Element;

/// How many nodes the ancestor walk tests before giving up, starting with
/// the node holding the selection boundary.
///
/// The walk is an approximation of nesting awareness: a marker further up
/// than this is treated as absent, so selections deep inside other inline
/// formatting within a marker are toggled as if they were outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchDepth(NonZeroUsize);

impl SearchDepth {
    pub const DEFAULT: Self = Self(NonZeroUsize::MIN.saturating_add(9));

    /// `None` for zero: a walk that tests nothing would never unwrap.
    pub fn new(levels: usize) -> Option<Self> {
        NonZeroUsize::new(levels).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for SearchDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Identifies marker elements: tag, class and the ancestor search bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    tag: String,
    class: String,
    depth: SearchDepth,
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self::new(Self::TAG, Self::CLASS)
    }
}

impl MarkerSpec {
    pub const TAG: &'static str = "code";
    pub const CLASS: &'static str = "inline-code";

    pub fn new(tag: impl AsRef<str>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.as_ref().to_ascii_lowercase(),
            class: class.into(),
            depth: SearchDepth::DEFAULT,
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn depth(&self) -> SearchDepth {
        self.depth
    }

    pub fn matches(&self, element: &Element) -> bool {
        element.is(&self.tag) && element.has_class(&self.class)
    }

    /// A fresh, childless marker element.
    pub fn create_marker(&self) -> Element {
        Element::new(&self.tag).with_class(self.class.clone())
    }
}
