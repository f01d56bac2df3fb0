use crate::dom::{DomError, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    /// Includes [`DomError::BoundaryViolation`] for ranges that cut a
    /// non-text node on one side only.
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("nothing to wrap: the range holds no content")]
    EmptyRange,

    /// A marker would end up inside another marker, or already is.
    #[error("{marker} is nested inside or around another marker")]
    NestedMarker { marker: NodeId },

    /// The selection starts in one marker and ends in another.
    #[error("selection runs from {anchor} into a different marker {focus}")]
    OverlappingMarkers { anchor: NodeId, focus: NodeId },

    /// Internal assertion; a toggle left the tree in a state it must not.
    #[error("marker invariant violated at {marker}: {reason}")]
    MarkerInvariant { marker: NodeId, reason: &'static str },
}
