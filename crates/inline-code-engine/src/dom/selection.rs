use super::{Boundary, Dom, DomError, NodeId, Range};

/// The host's current selection, passed explicitly instead of read from a
/// global. At most one range; its start is the anchor, its end the focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(range: Range) -> Self {
        Self { range: Some(range) }
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn anchor(&self) -> Option<Boundary> {
        self.range.map(|range| range.start)
    }

    pub fn focus(&self) -> Option<Boundary> {
        self.range.map(|range| range.end)
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn replace(&mut self, range: Range) {
        self.range = Some(range);
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    /// Select the whole content of `node` (expand-to-tag).
    pub fn expand_to_tag(&mut self, dom: &Dom, node: NodeId) -> Result<Range, DomError> {
        let range = Range::node_contents(dom, node)?;
        self.replace(range);
        Ok(range)
    }
}
