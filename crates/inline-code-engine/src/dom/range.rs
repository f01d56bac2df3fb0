use std::cmp::Ordering;

use super::{Dom, DomError, NodeId};

/// A position in the document: a node plus an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A contiguous span between two boundaries, `start` not after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    /// Offsets `start..end` inside a single node.
    pub fn within(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(Boundary::new(node, start), Boundary::new(node, end))
    }

    /// The whole content of `node`, from before its first child (or
    /// character) to after its last.
    pub fn node_contents(dom: &Dom, node: NodeId) -> Result<Self, DomError> {
        let len = dom.node_len(node)?;
        Ok(Self::within(node, 0, len))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl Dom {
    /// Child indices leading from the root down to `node`.
    fn path(&self, node: NodeId) -> Result<Vec<usize>, DomError> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(self.index_in_parent(current).ok_or(DomError::Detached(current))?);
            current = parent;
        }
        if current != self.root() {
            return Err(DomError::Detached(node));
        }
        path.reverse();
        Ok(path)
    }

    /// Check that `boundary` points into an attached node, within bounds.
    pub fn validate_boundary(&self, boundary: Boundary) -> Result<(), DomError> {
        let len = self.node_len(boundary.node)?;
        if !self.is_attached(boundary.node) {
            return Err(DomError::Detached(boundary.node));
        }
        if boundary.offset > len {
            return Err(DomError::OffsetOutOfBounds {
                node: boundary.node,
                offset: boundary.offset,
                len,
            });
        }
        Ok(())
    }

    /// Check both boundaries and that `start` does not come after `end`.
    pub fn validate_range(&self, range: &Range) -> Result<(), DomError> {
        self.validate_boundary(range.start)?;
        self.validate_boundary(range.end)?;
        if self.compare_boundaries(range.start, range.end)? == Ordering::Greater {
            return Err(DomError::ReversedRange);
        }
        Ok(())
    }

    /// Document order of two boundaries.
    ///
    /// A boundary sorts as its node's path followed by its offset, so
    /// `(parent, i)` lands between the subtrees of children `i - 1` and `i`.
    pub fn compare_boundaries(&self, a: Boundary, b: Boundary) -> Result<Ordering, DomError> {
        let mut a_key = self.path(a.node)?;
        a_key.push(a.offset);
        let mut b_key = self.path(b.node)?;
        b_key.push(b.offset);
        Ok(a_key.cmp(&b_key))
    }

    /// Deepest node that is an inclusive ancestor of both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        std::iter::once(a)
            .chain(self.ancestors(a))
            .find(|&candidate| self.is_inclusive_ancestor(candidate, b))
    }

    /// The child of `ancestor` on the way down to `node`.
    pub(crate) fn child_towards(&self, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&candidate| self.parent(candidate) == Some(ancestor))
    }
}
