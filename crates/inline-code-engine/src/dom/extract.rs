//! Range extraction and reinsertion.
//!
//! Extraction is split in two: [`Dom::plan_extraction`] validates a range
//! and works out which nodes move without touching the tree, and
//! [`Dom::extract_planned`] carries the plan out. Callers that need to veto
//! an edit (the toggle engine refuses to nest markers) inspect the plan
//! first, so a refused or invalid edit never leaves a half-applied tree.
//!
//! Text nodes cut by a boundary are split. Any other node cut by exactly one
//! boundary is a [`DomError::BoundaryViolation`].

use super::{Boundary, Dom, DomError, NodeId, Range, char_to_byte};

/// Detached nodes in document order, produced by an extraction.
///
/// Inserting a fragment moves its nodes into the tree and consumes it.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<NodeId>,
}

impl Fragment {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<NodeId> for Fragment {
    fn from(node: NodeId) -> Self {
        Self { nodes: vec![node] }
    }
}

/// A text node cut at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextCut {
    node: NodeId,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Characters `start..end` of one text node.
    WithinText {
        node: NodeId,
        start: usize,
        end: usize,
    },
    /// Children `first..last` of `parent`, plus the selected ends of the
    /// text nodes on either side when a boundary cuts through one.
    Children {
        parent: NodeId,
        head: Option<TextCut>,
        first: usize,
        last: usize,
        tail: Option<TextCut>,
    },
}

/// A validated extraction, computed without mutating the tree.
///
/// Only valid against the tree it was planned on; [`Dom::extract_planned`]
/// rejects it with [`DomError::StalePlan`] otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPlan {
    range: Range,
    shape: Shape,
}

impl ExtractionPlan {
    pub fn range(&self) -> Range {
        self.range
    }

    /// True when carrying the plan out would extract nothing.
    pub fn is_empty(&self) -> bool {
        match self.shape {
            Shape::WithinText { start, end, .. } => start == end,
            Shape::Children {
                head,
                first,
                last,
                tail,
                ..
            } => head.is_none() && tail.is_none() && first == last,
        }
    }

    /// Nodes that will move whole, subtrees included.
    pub fn whole_nodes<'d>(&self, dom: &'d Dom) -> &'d [NodeId] {
        match self.shape {
            Shape::WithinText { .. } => &[],
            Shape::Children {
                parent,
                first,
                last,
                ..
            } => dom.children(parent).get(first..last).unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Keep {
    Before,
    After,
}

impl Dom {
    /// Validate `range` and work out what extracting it would move.
    pub fn plan_extraction(&self, range: Range) -> Result<ExtractionPlan, DomError> {
        self.validate_range(&range)?;
        let Range { start, end } = range;

        if start.node == end.node {
            let node = start.node;
            let len = self.node_len(node)?;
            let shape = match (self.text(node), self.parent(node)) {
                // A fully selected text node moves as is rather than leaving
                // an empty husk behind.
                (Some(_), Some(parent)) if start.offset == 0 && end.offset == len && len > 0 => {
                    let index = self.index_in_parent(node).ok_or(DomError::Detached(node))?;
                    Shape::Children {
                        parent,
                        head: None,
                        first: index,
                        last: index + 1,
                        tail: None,
                    }
                }
                (Some(_), _) => Shape::WithinText {
                    node,
                    start: start.offset,
                    end: end.offset,
                },
                (None, _) => Shape::Children {
                    parent: node,
                    head: None,
                    first: start.offset,
                    last: end.offset,
                    tail: None,
                },
            };
            return Ok(ExtractionPlan { range, shape });
        }

        let parent = self
            .common_ancestor(start.node, end.node)
            .ok_or(DomError::Detached(start.node))?;

        let (head, first) = if start.node == parent {
            (None, start.offset)
        } else {
            let (node, index, len) = self.partial_text_child(parent, start.node)?;
            match start.offset {
                0 => (None, index),
                offset if offset == len => (None, index + 1),
                offset => (Some(TextCut { node, offset }), index + 1),
            }
        };

        let (tail, last) = if end.node == parent {
            (None, end.offset)
        } else {
            let (node, index, len) = self.partial_text_child(parent, end.node)?;
            match end.offset {
                0 => (None, index),
                offset if offset == len => (None, index + 1),
                offset => (Some(TextCut { node, offset }), index),
            }
        };

        Ok(ExtractionPlan {
            range,
            shape: Shape::Children {
                parent,
                head,
                first,
                last: last.max(first),
                tail,
            },
        })
    }

    /// The child of `parent` that holds a boundary, which must be a text
    /// node sitting directly under `parent`.
    fn partial_text_child(
        &self,
        parent: NodeId,
        boundary_node: NodeId,
    ) -> Result<(NodeId, usize, usize), DomError> {
        let child = self
            .child_towards(parent, boundary_node)
            .ok_or(DomError::Detached(boundary_node))?;
        if child != boundary_node || self.text(child).is_none() {
            return Err(DomError::BoundaryViolation { node: child });
        }
        let index = self.index_in_parent(child).ok_or(DomError::Detached(child))?;
        Ok((child, index, self.node_len(child)?))
    }

    /// Remove the content of `range` from the tree.
    ///
    /// Returns the detached content and the collapsed position it was taken
    /// from. Fails without touching the tree if the range is invalid or
    /// splits a non-text node asymmetrically.
    pub fn extract_contents(&mut self, range: Range) -> Result<(Fragment, Boundary), DomError> {
        let plan = self.plan_extraction(range)?;
        self.extract_planned(plan)
    }

    pub fn extract_planned(
        &mut self,
        plan: ExtractionPlan,
    ) -> Result<(Fragment, Boundary), DomError> {
        if self.plan_extraction(plan.range)? != plan {
            return Err(DomError::StalePlan);
        }

        match plan.shape {
            Shape::WithinText { node, start, end } => {
                let collapse = Boundary::new(node, start);
                if start == end {
                    return Ok((Fragment::default(), collapse));
                }
                let text = self.text(node).ok_or(DomError::NotText(node))?;
                let (from, to) = match (char_to_byte(text, start), char_to_byte(text, end)) {
                    (Some(from), Some(to)) => (from, to),
                    _ => return Err(DomError::StalePlan),
                };
                let piece = text[from..to].to_owned();
                let rest = format!("{}{}", &text[..from], &text[to..]);
                self.set_text(node, rest)?;
                let piece = self.create_text(piece);
                Ok((Fragment::from(piece), collapse))
            }
            Shape::Children {
                parent,
                head,
                first,
                last,
                tail,
            } => {
                let mut nodes = Vec::new();
                if let Some(cut) = head {
                    nodes.push(self.cut_text(cut, Keep::Before)?);
                }
                let whole = self
                    .children(parent)
                    .get(first..last)
                    .ok_or(DomError::StalePlan)?
                    .to_vec();
                for child in whole {
                    self.detach(child)?;
                    nodes.push(child);
                }
                if let Some(cut) = tail {
                    nodes.push(self.cut_text(cut, Keep::After)?);
                }
                Ok((Fragment { nodes }, Boundary::new(parent, first)))
            }
        }
    }

    /// Move one side of a text cut into a new detached text node.
    fn cut_text(&mut self, cut: TextCut, keep: Keep) -> Result<NodeId, DomError> {
        let text = self.text(cut.node).ok_or(DomError::NotText(cut.node))?;
        let at = char_to_byte(text, cut.offset).ok_or(DomError::StalePlan)?;
        let (before, after) = text.split_at(at);
        let (kept, moved) = match keep {
            Keep::Before => (before.to_owned(), after.to_owned()),
            Keep::After => (after.to_owned(), before.to_owned()),
        };
        self.set_text(cut.node, kept)?;
        Ok(self.create_text(moved))
    }

    /// Insert `fragment` at `at` and return the range covering the inserted
    /// nodes. A position inside a text node splits it; a position at either
    /// end of one inserts beside it.
    pub fn insert_fragment(&mut self, at: Boundary, fragment: Fragment) -> Result<Range, DomError> {
        self.validate_boundary(at)?;
        let (parent, index) = if self.text(at.node).is_some() {
            let parent = self.parent(at.node).ok_or(DomError::Detached(at.node))?;
            let index = self.index_in_parent(at.node).ok_or(DomError::Detached(at.node))?;
            if at.offset == 0 {
                (parent, index)
            } else {
                if at.offset < self.node_len(at.node)? {
                    self.split_text(at.node, at.offset)?;
                }
                (parent, index + 1)
            }
        } else {
            (at.node, at.offset)
        };
        self.insert_nodes(parent, index, fragment)
    }

    /// Append `fragment` to the children of `parent`, attached or not.
    pub fn append_fragment(&mut self, parent: NodeId, fragment: Fragment) -> Result<Range, DomError> {
        if !self.is_container(parent) {
            self.kind(parent)?;
            return Err(DomError::NotAContainer(parent));
        }
        let index = self.children(parent).len();
        self.insert_nodes(parent, index, fragment)
    }

    fn insert_nodes(
        &mut self,
        parent: NodeId,
        index: usize,
        fragment: Fragment,
    ) -> Result<Range, DomError> {
        let count = fragment.len();
        for (offset, node) in fragment.nodes.into_iter().enumerate() {
            self.insert_child(parent, index + offset, node)?;
        }
        Ok(Range::new(
            Boundary::new(parent, index),
            Boundary::new(parent, index + count),
        ))
    }

    /// Join freshly inserted content with neighbouring text.
    ///
    /// `inserted` must cover whole children of one parent, as returned by
    /// [`Dom::insert_fragment`]. A text node at either edge is merged with an
    /// adjacent text sibling, and the returned range still covers exactly the
    /// inserted content.
    pub fn join_text_around(&mut self, inserted: Range) -> Result<Range, DomError> {
        let parent = inserted.start.node;
        if inserted.end.node != parent {
            return Err(DomError::HierarchyRequest {
                parent,
                node: inserted.end.node,
            });
        }
        if !self.is_container(parent) {
            self.kind(parent)?;
            return Err(DomError::NotAContainer(parent));
        }
        let len = self.children(parent).len();
        if let Some(offset) = [inserted.start.offset, inserted.end.offset]
            .into_iter()
            .find(|&offset| offset > len)
        {
            return Err(DomError::OffsetOutOfBounds {
                node: parent,
                offset,
                len,
            });
        }
        let first = inserted.start.offset;
        let mut last = inserted.end.offset;
        if first >= last {
            return Ok(inserted);
        }

        let mut start = inserted.start;
        let mut end = inserted.end;

        if first > 0 {
            let before = self.children(parent)[first - 1];
            let head = self.children(parent)[first];
            if self.text(before).is_some() && self.text(head).is_some() {
                let offset = self.node_len(before)?;
                self.merge_text(before, head)?;
                start = Boundary::new(before, offset);
                last -= 1;
                end = if last == first {
                    Boundary::new(before, self.node_len(before)?)
                } else {
                    Boundary::new(parent, last)
                };
            }
        }

        if let (Some(&tail), Some(&after)) = (
            self.children(parent).get(last - 1),
            self.children(parent).get(last),
        ) && self.text(tail).is_some()
            && self.text(after).is_some()
        {
            let offset = self.node_len(tail)?;
            self.merge_text(tail, after)?;
            end = Boundary::new(tail, offset);
        }

        Ok(Range::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use pretty_assertions::assert_eq;

    fn texts(dom: &Dom, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&n| dom.text_content(n)).collect()
    }

    /// root > p > texts...
    fn paragraph(parts: &[&str]) -> (Dom, NodeId, Vec<NodeId>) {
        let mut dom = Dom::new();
        let p = dom.create_element(Element::new("p"));
        dom.append_child(dom.root(), p).unwrap();
        let nodes = parts
            .iter()
            .map(|part| {
                let t = dom.create_text(*part);
                dom.append_child(p, t).unwrap();
                t
            })
            .collect();
        (dom, p, nodes)
    }

    #[test]
    fn extract_inside_one_text_node() {
        let (mut dom, p, t) = paragraph(&["hello world"]);

        let (fragment, at) = dom.extract_contents(Range::within(t[0], 6, 11)).unwrap();

        assert_eq!(texts(&dom, fragment.nodes()), ["world"]);
        assert_eq!(dom.text(t[0]), Some("hello "));
        assert_eq!(at, Boundary::new(t[0], 6));
        assert_eq!(dom.children(p), [t[0]]);
    }

    #[test]
    fn extract_whole_text_node_moves_it() {
        let (mut dom, p, t) = paragraph(&["a", "bc", "d"]);

        let (fragment, at) = dom.extract_contents(Range::within(t[1], 0, 2)).unwrap();

        assert_eq!(fragment.nodes(), [t[1]]);
        assert_eq!(at, Boundary::new(p, 1));
        assert_eq!(dom.children(p), [t[0], t[2]]);
    }

    #[test]
    fn extract_collapsed_range_is_empty() {
        let (mut dom, _, t) = paragraph(&["abc"]);

        let plan = dom.plan_extraction(Range::within(t[0], 1, 1)).unwrap();
        assert!(plan.is_empty());

        let (fragment, at) = dom.extract_planned(plan).unwrap();
        assert!(fragment.is_empty());
        assert_eq!(at, Boundary::new(t[0], 1));
        assert_eq!(dom.text(t[0]), Some("abc"));
    }

    #[test]
    fn extract_across_sibling_text_nodes() {
        let (mut dom, p, t) = paragraph(&["foo", "bar"]);
        let range = Range::new(Boundary::new(t[0], 1), Boundary::new(t[1], 2));

        let (fragment, at) = dom.extract_contents(range).unwrap();

        assert_eq!(texts(&dom, fragment.nodes()), ["oo", "ba"]);
        assert_eq!(texts(&dom, dom.children(p)), ["f", "r"]);
        assert_eq!(at, Boundary::new(p, 1));
    }

    #[test]
    fn extract_takes_whole_elements_between_cuts() {
        let (mut dom, p, t) = paragraph(&["ab", "ef"]);
        let b = dom.create_element(Element::new("b"));
        let cd = dom.create_text("cd");
        dom.insert_child(p, 1, b).unwrap();
        dom.append_child(b, cd).unwrap();
        let range = Range::new(Boundary::new(t[0], 1), Boundary::new(t[1], 1));

        let (fragment, _) = dom.extract_contents(range).unwrap();

        assert_eq!(fragment.len(), 3);
        assert_eq!(fragment.nodes()[1], b);
        assert_eq!(texts(&dom, fragment.nodes()), ["b", "cd", "e"]);
        assert_eq!(dom.text_content(p), "af");
    }

    #[test]
    fn asymmetric_element_split_is_a_boundary_violation() {
        let (mut dom, p, t) = paragraph(&["ab", "ef"]);
        let b = dom.create_element(Element::new("b"));
        let cd = dom.create_text("cd");
        dom.insert_child(p, 1, b).unwrap();
        dom.append_child(b, cd).unwrap();
        let before = dom.clone();

        // starts inside <b>, ends outside it
        let range = Range::new(Boundary::new(cd, 1), Boundary::new(t[1], 1));
        let result = dom.extract_contents(range);

        assert_eq!(result, Err(DomError::BoundaryViolation { node: b }));
        assert_eq!(dom.text_content(p), before.text_content(p));
        assert_eq!(dom.children(p), before.children(p));
        assert_eq!(dom.children(b), [cd]);
    }

    #[test]
    fn stale_plans_are_rejected() {
        let (mut dom, _, t) = paragraph(&["hello world"]);
        let plan = dom.plan_extraction(Range::within(t[0], 0, 5)).unwrap();
        dom.split_text(t[0], 5).unwrap();

        assert_eq!(dom.extract_planned(plan), Err(DomError::StalePlan));
    }

    #[test]
    fn insert_inside_text_splits_it() {
        let (mut dom, p, t) = paragraph(&["helloworld"]);
        let code = dom.create_element(Element::new("code"));

        let range = dom
            .insert_fragment(Boundary::new(t[0], 5), Fragment::from(code))
            .unwrap();

        assert_eq!(range, Range::within(p, 1, 2));
        assert_eq!(dom.children(p).len(), 3);
        assert_eq!(dom.children(p)[1], code);
        assert_eq!(dom.text_content(p), "helloworld");
    }

    #[test]
    fn insert_at_text_end_leaves_no_empty_node() {
        let (mut dom, p, t) = paragraph(&["hello "]);
        let code = dom.create_element(Element::new("code"));

        dom.insert_fragment(Boundary::new(t[0], 6), Fragment::from(code))
            .unwrap();

        assert_eq!(dom.children(p), [t[0], code]);
    }

    #[test]
    fn append_fragment_to_detached_element() {
        let (mut dom, _, t) = paragraph(&["abc"]);
        let code = dom.create_element(Element::new("code"));
        let (fragment, _) = dom.extract_contents(Range::within(t[0], 1, 2)).unwrap();

        let range = dom.append_fragment(code, fragment).unwrap();

        assert_eq!(range, Range::within(code, 0, 1));
        assert_eq!(dom.text_content(code), "b");
    }

    #[test]
    fn join_text_around_merges_both_edges() {
        let (mut dom, p, t) = paragraph(&["hello ", "world", "!"]);

        let range = dom.join_text_around(Range::within(p, 1, 2)).unwrap();

        assert_eq!(dom.children(p), [t[0]]);
        assert_eq!(dom.text(t[0]), Some("hello world!"));
        assert_eq!(range, Range::within(t[0], 6, 11));
    }

    #[test]
    fn join_text_around_keeps_inner_structure() {
        let (mut dom, p, t) = paragraph(&["f", "oo", "ba", "r"]);

        let range = dom.join_text_around(Range::within(p, 1, 3)).unwrap();

        assert_eq!(texts(&dom, dom.children(p)), ["foo", "bar"]);
        assert_eq!(
            range,
            Range::new(Boundary::new(t[0], 1), Boundary::new(t[2], 2))
        );
    }

    #[test]
    fn join_text_around_leaves_elements_alone() {
        let (mut dom, p, _) = paragraph(&["a", "c"]);
        let b = dom.create_element(Element::new("b"));
        dom.insert_child(p, 1, b).unwrap();

        let range = dom.join_text_around(Range::within(p, 1, 2)).unwrap();

        assert_eq!(range, Range::within(p, 1, 2));
        assert_eq!(dom.children(p).len(), 3);
    }

    #[test]
    fn join_text_around_rejects_bad_ranges() {
        let (mut dom, p, t) = paragraph(&["ab"]);

        assert_eq!(
            dom.join_text_around(Range::within(p, 3, 5)),
            Err(DomError::OffsetOutOfBounds {
                node: p,
                offset: 3,
                len: 1
            })
        );
        assert_eq!(
            dom.join_text_around(Range::within(t[0], 0, 1)),
            Err(DomError::NotAContainer(t[0]))
        );
        assert_eq!(texts(&dom, dom.children(p)), ["ab"]);
    }
}
