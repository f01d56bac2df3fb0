//! The inline tool as the host editor sees it.
//!
//! The host owns the toolbar; the tool hands it a [`ControlHandle`] to draw,
//! forwards activations to [`InlineCode::surround`] and selection changes to
//! [`InlineCode::check_state`], and publishes its [`SanitizeRule`].

use crate::dom::{Dom, Range, Selection};
use crate::sanitize::SanitizeRule;
use crate::toggle::{InlineCode, MarkerSpec, Toggle, ToggleError};

/// Class names the host styles its inline tool buttons with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonStyles {
    pub base: String,
    pub active: String,
}

impl Default for ButtonStyles {
    fn default() -> Self {
        Self {
            base: "ce-inline-tool".to_string(),
            active: "ce-inline-tool--active".to_string(),
        }
    }
}

/// Plain-data toolbar button; the host renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle {
    styles: ButtonStyles,
    active: bool,
}

impl ControlHandle {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Classes to put on the button: the base class, plus the active class
    /// while the selection sits in a marker.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes = vec![self.styles.base.as_str()];
        if self.active {
            classes.push(self.styles.active.as_str());
        }
        classes
    }
}

#[derive(Debug, Clone)]
pub struct InlineCodeTool {
    engine: InlineCode,
    styles: ButtonStyles,
    button: Option<ControlHandle>,
}

impl InlineCodeTool {
    /// Shown in the inline toolbar rather than the block toolbox.
    pub const IS_INLINE: bool = true;

    pub fn new(spec: MarkerSpec, styles: ButtonStyles) -> Self {
        Self {
            engine: InlineCode::new(spec),
            styles,
            button: None,
        }
    }

    pub fn engine(&self) -> &InlineCode {
        &self.engine
    }

    /// Create the toolbar button, inactive.
    pub fn render(&mut self) -> &ControlHandle {
        self.button.insert(ControlHandle {
            styles: self.styles.clone(),
            active: false,
        })
    }

    pub fn button(&self) -> Option<&ControlHandle> {
        self.button.as_ref()
    }

    pub fn on_activate(
        &mut self,
        dom: &mut Dom,
        selection: &mut Selection,
        range: Option<Range>,
    ) -> Result<Toggle, ToggleError> {
        self.engine.surround(dom, selection, range)
    }

    /// Refresh the button's active state; returns it.
    pub fn on_selection_changed(&mut self, dom: &Dom, selection: &Selection) -> bool {
        let active = self.engine.check_state(dom, selection);
        if let Some(button) = &mut self.button {
            button.active = active;
        }
        active
    }

    pub fn sanitize(&self) -> SanitizeRule {
        SanitizeRule::for_marker(self.engine.spec())
    }
}

impl Default for InlineCodeTool {
    fn default() -> Self {
        Self::new(MarkerSpec::default(), ButtonStyles::default())
    }
}
