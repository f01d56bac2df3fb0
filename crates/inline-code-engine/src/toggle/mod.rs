/*!
 * # Marker Toggle Engine
 *
 * Wraps a selection in a marker element or, when the selection already sits
 * in one, removes that marker and keeps its content in place.
 *
 * ## Decision
 *
 * Per invocation: `Idle → Unselected (no-op) | OutsideMarker (wrap) |
 * InsideMarker (unwrap) → Idle`. "Inside" means the bounded ancestor walk
 * from the selection's anchor, or failing that its focus, reaches a marker
 * within [`SearchDepth`] nodes.
 *
 * ## Atomicity
 *
 * Both directions plan their extraction before the first mutation, so an
 * invalid range ([`DomError::BoundaryViolation`] and friends) or a refused
 * structure ([`ToggleError::NestedMarker`], [`ToggleError::OverlappingMarkers`])
 * leaves tree and selection as they were.
 *
 * ## Usage
 *
 * ```
 * use inline_code_engine::dom::{Range, Selection};
 * use inline_code_engine::markup;
 * use inline_code_engine::toggle::{InlineCode, Toggle};
 *
 * let mut dom = markup::parse("hello world").unwrap();
 * let text = dom.children(dom.root())[0];
 * let mut selection = Selection::new();
 * let engine = InlineCode::default();
 *
 * let toggle = engine
 *     .surround(&mut dom, &mut selection, Some(Range::within(text, 6, 11)))
 *     .unwrap();
 * assert!(matches!(toggle, Toggle::Wrapped(_)));
 * assert_eq!(markup::render(&dom), r#"hello <code class="inline-code">world</code>"#);
 * ```
 */

mod error;
mod marker;

pub use error::ToggleError;
pub use marker::{MarkerSpec, SearchDepth};

use crate::dom::{Boundary, Dom, DomError, Fragment, NodeId, Range, Selection};

/// What a [`InlineCode::surround`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// No range, or a range with nothing in it outside any marker.
    Unchanged,
    /// A new marker now holds the selected content.
    Wrapped(NodeId),
    /// A marker was removed; the range covers its restored content.
    Unwrapped(Range),
}

/// The toggle engine for one marker type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineCode {
    spec: MarkerSpec,
}

impl InlineCode {
    pub fn new(spec: MarkerSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &MarkerSpec {
        &self.spec
    }

    pub fn is_marker(&self, dom: &Dom, node: NodeId) -> bool {
        dom.element(node).is_some_and(|element| self.spec.matches(element))
    }

    /// Bounded ancestor walk from `node`.
    fn marker_above(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        let found = dom.find_ancestor(node, self.spec.depth().get(), |element| {
            self.spec.matches(element)
        });
        if let Some(marker) = found {
            log::trace!("found marker {marker} above {node}");
        }
        found
    }

    /// The marker holding the selection's anchor or focus, if any.
    pub fn find_marker(
        &self,
        dom: &Dom,
        selection: &Selection,
    ) -> Result<Option<NodeId>, ToggleError> {
        let Some(range) = selection.range() else {
            return Ok(None);
        };
        let anchor = self.marker_above(dom, range.start.node);
        let focus = self.marker_above(dom, range.end.node);
        match (anchor, focus) {
            (Some(anchor), Some(focus)) if anchor != focus => {
                Err(ToggleError::OverlappingMarkers { anchor, focus })
            }
            (Some(marker), _) | (None, Some(marker)) => Ok(Some(marker)),
            (None, None) => Ok(None),
        }
    }

    /// Whether the current selection sits in a marker: true exactly when
    /// [`InlineCode::surround`] on that selection would unwrap.
    pub fn check_state(&self, dom: &Dom, selection: &Selection) -> bool {
        matches!(self.find_marker(dom, selection), Ok(Some(_)))
    }

    /// Wrap or unwrap depending on where `range` sits.
    ///
    /// `None` is a no-op. On success the selection describes the edited
    /// content; on error tree and selection are unchanged.
    pub fn surround(
        &self,
        dom: &mut Dom,
        selection: &mut Selection,
        range: Option<Range>,
    ) -> Result<Toggle, ToggleError> {
        let Some(range) = range else {
            log::trace!("surround called without a range");
            return Ok(Toggle::Unchanged);
        };
        dom.validate_range(&range)?;

        let previous = selection.clone();
        selection.replace(range);

        let result = self.toggle(dom, selection, range);
        match &result {
            Ok(Toggle::Unchanged) => *selection = previous,
            Ok(_) => {}
            Err(err) => {
                log::warn!("inline code toggle rejected: {err}");
                *selection = previous;
            }
        }
        result
    }

    fn toggle(
        &self,
        dom: &mut Dom,
        selection: &mut Selection,
        range: Range,
    ) -> Result<Toggle, ToggleError> {
        if let Some(marker) = self.find_marker(dom, selection)? {
            return self
                .unwrap(dom, selection, marker)
                .map(Toggle::Unwrapped);
        }
        match self.wrap(dom, selection, range) {
            Ok(marker) => Ok(Toggle::Wrapped(marker)),
            Err(ToggleError::EmptyRange) => Ok(Toggle::Unchanged),
            Err(err) => Err(err),
        }
    }

    /// Move the content of `range` into a new marker at the same position
    /// and select the marker's content.
    pub fn wrap(
        &self,
        dom: &mut Dom,
        selection: &mut Selection,
        range: Range,
    ) -> Result<NodeId, ToggleError> {
        let plan = dom.plan_extraction(range)?;
        if plan.is_empty() {
            return Err(ToggleError::EmptyRange);
        }
        if let Some(marker) = plan
            .whole_nodes(dom)
            .iter()
            .flat_map(|&node| dom.subtree(node))
            .find(|&node| self.is_marker(dom, node))
        {
            return Err(ToggleError::NestedMarker { marker });
        }

        let (content, at) = dom.extract_planned(plan)?;
        let marker = dom.create_element(self.spec.create_marker());
        dom.append_fragment(marker, content)?;
        dom.insert_fragment(at, Fragment::from(marker))?;
        if dom.children(marker).is_empty() {
            return Err(ToggleError::MarkerInvariant {
                marker,
                reason: "wrapped content is empty",
            });
        }

        selection.expand_to_tag(dom, marker)?;
        log::debug!(
            "wrapped {} node(s) in <{}> {marker}",
            dom.children(marker).len(),
            self.spec.tag()
        );
        Ok(marker)
    }

    /// Remove `marker`, put its content where it was and select that
    /// content. Always acts on the whole marker, whatever part of it the
    /// selection covered.
    pub fn unwrap(
        &self,
        dom: &mut Dom,
        selection: &mut Selection,
        marker: NodeId,
    ) -> Result<Range, ToggleError> {
        if !self.is_marker(dom, marker) {
            return Err(ToggleError::MarkerInvariant {
                marker,
                reason: "node is not a marker",
            });
        }
        if !dom.is_attached(marker) {
            return Err(DomError::Detached(marker).into());
        }
        if let Some(outer) = dom.ancestors(marker).find(|&node| self.is_marker(dom, node)) {
            return Err(ToggleError::NestedMarker { marker: outer });
        }
        if let Some(inner) = dom
            .subtree(marker)
            .into_iter()
            .skip(1)
            .find(|&node| self.is_marker(dom, node))
        {
            return Err(ToggleError::NestedMarker { marker: inner });
        }

        let previous = selection.clone();
        let result = self.unwrap_contents(dom, selection, marker);
        if result.is_err() {
            *selection = previous;
        }
        result
    }

    fn unwrap_contents(
        &self,
        dom: &mut Dom,
        selection: &mut Selection,
        marker: NodeId,
    ) -> Result<Range, ToggleError> {
        selection.expand_to_tag(dom, marker)?;
        let range = selection.range().ok_or(ToggleError::MarkerInvariant {
            marker,
            reason: "selection lost after expanding to the marker",
        })?;
        let parent = dom.parent(marker).ok_or(DomError::Detached(marker))?;
        let index = dom
            .index_in_parent(marker)
            .ok_or(DomError::Detached(marker))?;

        let (content, _) = dom.extract_contents(range)?;
        if !dom.children(marker).is_empty() {
            return Err(ToggleError::MarkerInvariant {
                marker,
                reason: "marker still holds content after extraction",
            });
        }
        dom.discard(marker)?;

        let inserted = dom.insert_fragment(Boundary::new(parent, index), content)?;
        let restored = dom.join_text_around(inserted)?;

        selection.clear();
        selection.replace(restored);
        log::debug!("unwrapped {marker}");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::markup::{parse, render};
    use pretty_assertions::assert_eq;

    const WRAPPED: &str = r#"hello <code class="inline-code">world</code>"#;

    fn first_text(dom: &Dom) -> NodeId {
        dom.children(dom.root())[0]
    }

    #[test]
    fn wrap_selects_marker_contents() {
        let mut dom = parse("hello world").unwrap();
        let text = first_text(&dom);
        let mut selection = Selection::new();

        let marker = InlineCode::default()
            .wrap(&mut dom, &mut selection, Range::within(text, 6, 11))
            .unwrap();

        assert_eq!(render(&dom), WRAPPED);
        assert_eq!(selection.range(), Some(Range::within(marker, 0, 1)));
    }

    #[test]
    fn wrap_rejects_empty_ranges() {
        let mut dom = parse("hello").unwrap();
        let text = first_text(&dom);

        let result = InlineCode::default().wrap(
            &mut dom,
            &mut Selection::new(),
            Range::within(text, 2, 2),
        );

        assert_eq!(result, Err(ToggleError::EmptyRange));
        assert_eq!(render(&dom), "hello");
    }

    #[test]
    fn wrap_refuses_to_swallow_a_marker() {
        let mut dom = parse(r#"a <code class="inline-code">b</code> c"#).unwrap();
        let children = dom.children(dom.root()).to_vec();
        let range = Range::new(Boundary::new(children[0], 0), Boundary::new(children[2], 2));

        let result = InlineCode::default().wrap(&mut dom, &mut Selection::new(), range);

        assert_eq!(
            result,
            Err(ToggleError::NestedMarker {
                marker: children[1]
            })
        );
        assert_eq!(render(&dom), r#"a <code class="inline-code">b</code> c"#);
    }

    #[test]
    fn unwrap_acts_on_the_whole_marker() {
        let mut dom = parse(WRAPPED).unwrap();
        let marker = dom.children(dom.root())[1];
        let inner = dom.children(marker)[0];
        let mut selection = Selection::with_range(Range::within(inner, 1, 2));

        let restored = InlineCode::default()
            .unwrap(&mut dom, &mut selection, marker)
            .unwrap();

        assert_eq!(render(&dom), "hello world");
        let text = first_text(&dom);
        assert_eq!(restored, Range::within(text, 6, 11));
        assert_eq!(selection.range(), Some(restored));
        assert!(!dom.contains(marker));
    }

    #[test]
    fn unwrap_rejects_non_markers() {
        let mut dom = parse("<code>x</code>").unwrap();
        let code = first_text(&dom);

        let result = InlineCode::default().unwrap(&mut dom, &mut Selection::new(), code);

        assert_eq!(
            result,
            Err(ToggleError::MarkerInvariant {
                marker: code,
                reason: "node is not a marker"
            })
        );
    }

    #[test]
    fn unwrap_rejects_nested_markers() {
        let mut dom = parse(
            r#"<code class="inline-code">a <code class="inline-code">b</code></code>"#,
        )
        .unwrap();
        let outer = first_text(&dom);
        let inner = dom.children(outer)[1];
        let mut selection = Selection::new();
        let engine = InlineCode::default();

        assert_eq!(
            engine.unwrap(&mut dom, &mut selection, outer),
            Err(ToggleError::NestedMarker { marker: inner })
        );
        assert_eq!(
            engine.unwrap(&mut dom, &mut selection, inner),
            Err(ToggleError::NestedMarker { marker: outer })
        );
        assert!(selection.is_empty());
    }

    #[test]
    fn find_marker_checks_anchor_then_focus() {
        let dom = parse(r#"plain <code class="inline-code">code</code>"#).unwrap();
        let plain = first_text(&dom);
        let marker = dom.children(dom.root())[1];
        let code = dom.children(marker)[0];
        let engine = InlineCode::default();

        let from_focus = Selection::with_range(Range::new(
            Boundary::new(plain, 2),
            Boundary::new(code, 2),
        ));
        assert_eq!(engine.find_marker(&dom, &from_focus), Ok(Some(marker)));

        let outside = Selection::with_range(Range::within(plain, 0, 5));
        assert_eq!(engine.find_marker(&dom, &outside), Ok(None));
        assert_eq!(engine.find_marker(&dom, &Selection::new()), Ok(None));
    }

    #[test]
    fn custom_marker_spec_is_honoured() {
        let mut dom = parse("hello world").unwrap();
        let text = first_text(&dom);
        let engine = InlineCode::new(MarkerSpec::new("mark", "hl"));
        let mut selection = Selection::new();

        let toggle = engine
            .surround(&mut dom, &mut selection, Some(Range::within(text, 0, 5)))
            .unwrap();

        let Toggle::Wrapped(marker) = toggle else {
            panic!("expected a wrap, got {toggle:?}");
        };
        assert_eq!(dom.element(marker), Some(&Element::new("mark").with_class("hl")));
        assert_eq!(render(&dom), r#"<mark class="hl">hello</mark> world"#);
    }
}
