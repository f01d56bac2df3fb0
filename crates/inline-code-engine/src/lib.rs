pub mod dom;
pub mod markup;
pub mod sanitize;
pub mod tool;
pub mod toggle;

// Re-export key types for easier usage
pub use dom::{Boundary, Dom, DomError, Element, Fragment, NodeId, NodeKind, Range, Selection};
pub use markup::MarkupError;
pub use sanitize::SanitizeRule;
pub use tool::{ButtonStyles, ControlHandle, InlineCodeTool};
pub use toggle::{InlineCode, MarkerSpec, SearchDepth, Toggle, ToggleError};
