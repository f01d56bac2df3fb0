/*!
 * # Document Model
 *
 * An in-memory stand-in for the host editor's editable content: an ordered
 * tree of element and text nodes plus the range/selection vocabulary the
 * toggle engine needs.
 *
 * ## Ownership
 *
 * Every node lives in one arena owned by [`Dom`] and is addressed by a
 * [`NodeId`]. Parent/child links are stored on the node slots, so a node has
 * at most one parent and moving a node is always detach-then-insert.
 *
 * Detached nodes are either held by a [`Fragment`] (the result of an
 * extraction, waiting to be reinserted) or discarded, which frees their slot.
 * Freed slots are reused by later allocations. Each slot carries a
 * generation that is bumped when it is freed, so a [`NodeId`] kept past a
 * discard stays unknown instead of aliasing the slot's next occupant.
 *
 * ## Offsets
 *
 * A [`Boundary`] offset counts characters inside a text node and children
 * inside a container (root or element), the same split the browser uses for
 * its ranges.
 *
 * ## Module Structure
 *
 * - **`range`**: `Boundary`, `Range`, boundary ordering and validation
 * - **`selection`**: the host's current selection as an explicit value
 * - **`extract`**: range extraction, `Fragment`s and reinsertion
 */

mod extract;
mod range;
mod selection;

pub use extract::{ExtractionPlan, Fragment};
pub use range::{Boundary, Range};
pub use selection::Selection;

use std::fmt;

/// Handle to a node in a [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "node#{}", self.index),
            generation => write!(f, "node#{}.{generation}", self.index),
        }
    }
}

/// Errors raised by tree and range primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// One boundary of a range falls inside this non-text node's children
    /// while the other falls outside it.
    #[error("range boundary splits {node} asymmetrically")]
    BoundaryViolation { node: NodeId },
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("{0} is not attached to the document")]
    Detached(NodeId),
    #[error("offset {offset} is out of bounds for {node} (length {len})")]
    OffsetOutOfBounds {
        node: NodeId,
        offset: usize,
        len: usize,
    },
    #[error("range end comes before its start")]
    ReversedRange,
    #[error("{0} cannot hold children")]
    NotAContainer(NodeId),
    #[error("{0} is not a text node")]
    NotText(NodeId),
    #[error("cannot insert {node} under {parent}")]
    HierarchyRequest { parent: NodeId, node: NodeId },
    #[error("extraction plan no longer matches the document")]
    StalePlan,
}

/// An element: a lowercase tag name and an ordered class list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
}

impl Element {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: tag.as_ref().to_ascii_lowercase(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag comparison is ASCII case-insensitive (`CODE` == `code`).
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn clear_classes(&mut self) {
        self.classes.clear();
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

/// Arena-backed document tree with a single root.
#[derive(Debug, Clone)]
pub struct Dom {
    entries: Vec<Entry>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            entries: vec![Entry {
                generation: 0,
                slot: Some(Slot {
                    kind: NodeKind::Root,
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, DomError> {
        self.entries
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, DomError> {
        self.entries
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    /// Whether `id` refers to a live (not discarded) node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_ok()
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, DomError> {
        self.slot(id).map(|slot| &slot.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Ok(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.slot_mut(id) {
            Ok(Slot {
                kind: NodeKind::Element(element),
                ..
            }) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Ok(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Length in characters; `None` unless `id` is a text node.
    pub fn text_len(&self, id: NodeId) -> Option<usize> {
        self.text(id).map(|text| text.chars().count())
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Ok(NodeKind::Root | NodeKind::Element(_)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).ok().and_then(|slot| slot.parent)
    }

    /// Children of `id`; empty for text nodes and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Boundary length of a node: characters for text, children otherwise.
    pub fn node_len(&self, id: NodeId) -> Result<usize, DomError> {
        let slot = self.slot(id)?;
        Ok(match &slot.kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Root | NodeKind::Element(_) => slot.children.len(),
        })
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|n| n == ancestor)
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root, id)
    }

    /// `id` and all of its descendants in document order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            nodes.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        nodes
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Walk from `start` towards the root looking for an element matching
    /// `predicate`.
    ///
    /// At most `depth` nodes are tested, starting with `start` itself. The
    /// walk stops at the first node without a parent, so the root (and the
    /// top of a detached subtree) is never tested. Matches further up than
    /// `depth` are not found.
    pub fn find_ancestor(
        &self,
        start: NodeId,
        depth: usize,
        predicate: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        let mut current = start;
        for _ in 0..depth {
            let parent = self.parent(current)?;
            if let Some(element) = self.element(current)
                && predicate(element)
            {
                return Some(current);
            }
            current = parent;
        }
        None
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let slot = Slot {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.slot = Some(slot);
                NodeId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: Some(slot),
                });
                NodeId {
                    index: self.entries.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, node)
    }

    /// Insert a parentless `node` as child number `index` of `parent`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        node: NodeId,
    ) -> Result<(), DomError> {
        if !self.is_container(parent) {
            self.slot(parent)?;
            return Err(DomError::NotAContainer(parent));
        }
        let len = self.children(parent).len();
        if index > len {
            return Err(DomError::OffsetOutOfBounds {
                node: parent,
                offset: index,
                len,
            });
        }
        let slot = self.slot(node)?;
        if node == self.root || slot.parent.is_some() || self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest { parent, node });
        }

        self.slot_mut(parent)?.children.insert(index, node);
        self.slot_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Remove `node` from its parent. Parentless nodes are left as they are.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.slot(node)?.parent else {
            return Ok(());
        };
        self.slot_mut(parent)?.children.retain(|&child| child != node);
        self.slot_mut(node)?.parent = None;
        Ok(())
    }

    /// Detach `node` and free it together with its whole subtree.
    pub fn discard(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.root {
            return Err(DomError::HierarchyRequest {
                parent: self.root,
                node,
            });
        }
        self.detach(node)?;
        for id in self.subtree(node) {
            let entry = &mut self.entries[id.index];
            entry.slot = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        Ok(())
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: String) -> Result<(), DomError> {
        match &mut self.slot_mut(id)?.kind {
            NodeKind::Text(current) => {
                *current = text;
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    /// Split a text node at a character offset. The original keeps the text
    /// before `offset`; a new node holding the rest is placed right after it
    /// when the original has a parent.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        let at = char_to_byte(text, offset).ok_or(DomError::OffsetOutOfBounds {
            node: id,
            offset,
            len: text.chars().count(),
        })?;
        let (head, tail) = text.split_at(at);
        let (head, tail) = (head.to_owned(), tail.to_owned());

        self.set_text(id, head)?;
        let rest = self.create_text(tail);
        if let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) {
            self.insert_child(parent, index + 1, rest)?;
        }
        Ok(rest)
    }

    /// Append the text of `from` to `into` and discard `from`.
    pub fn merge_text(&mut self, into: NodeId, from: NodeId) -> Result<(), DomError> {
        let tail = self.text(from).ok_or(DomError::NotText(from))?.to_owned();
        let head = self.text(into).ok_or(DomError::NotText(into))?;
        let joined = format!("{head}{tail}");
        self.set_text(into, joined)?;
        self.discard(from)
    }
}

/// Byte index of the `offset`-th character; `None` past the end.
pub(crate) fn char_to_byte(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}
