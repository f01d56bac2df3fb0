//! Sanitizer rule for marker elements.
//!
//! Hosts pass the rule to their content sanitizer when exporting; it
//! serializes as `{ "<tag>": { "class": "<class>" } }`. The marker tag is
//! kept in output only with exactly the marker class; any other class on that
//! tag is stripped.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dom::{Dom, Element};
use crate::toggle::MarkerSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeRule {
    tag: String,
    class: String,
}

#[derive(serde::Serialize)]
struct AllowedAttributes<'a> {
    class: &'a str,
}

impl Serialize for SanitizeRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.tag, &AllowedAttributes { class: &self.class })?;
        map.end()
    }
}

impl SanitizeRule {
    pub fn for_marker(spec: &MarkerSpec) -> Self {
        Self {
            tag: spec.tag().to_owned(),
            class: spec.class().to_owned(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Whether `element` passes the rule with its classes untouched.
    pub fn permits(&self, element: &Element) -> bool {
        !element.is(&self.tag)
            || element.classes().is_empty()
            || element.classes() == [self.class.as_str()]
    }

    /// Strip classes from every element the rule does not permit. Returns
    /// how many elements were changed.
    pub fn apply(&self, dom: &mut Dom) -> usize {
        let offending: Vec<_> = dom
            .subtree(dom.root())
            .into_iter()
            .filter(|&node| dom.element(node).is_some_and(|element| !self.permits(element)))
            .collect();
        for &node in &offending {
            if let Some(element) = dom.element_mut(node) {
                element.clear_classes();
            }
        }
        if !offending.is_empty() {
            log::debug!("stripped classes from {} <{}> element(s)", offending.len(), self.tag);
        }
        offending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse, render};
    use pretty_assertions::assert_eq;

    #[test]
    fn rule_follows_the_marker_spec() {
        let rule = SanitizeRule::for_marker(&MarkerSpec::default());
        assert_eq!(rule.tag(), "code");
        assert_eq!(rule.class(), "inline-code");
    }

    #[test]
    fn permits_only_the_exact_marker_class() {
        let rule = SanitizeRule::for_marker(&MarkerSpec::default());

        assert!(rule.permits(&Element::new("code").with_class("inline-code")));
        assert!(rule.permits(&Element::new("code")));
        assert!(rule.permits(&Element::new("span").with_class("anything")));
        assert!(!rule.permits(&Element::new("code").with_class("other")));
        assert!(!rule.permits(
            &Element::new("code")
                .with_class("inline-code")
                .with_class("other")
        ));
    }

    #[test]
    fn apply_strips_foreign_classes() {
        let mut dom = parse(
            r#"<code class="inline-code">a</code> <code class="evil">b</code> <code class="inline-code x">c</code> <span class="y">d</span>"#,
        )
        .unwrap();
        let rule = SanitizeRule::for_marker(&MarkerSpec::default());

        assert_eq!(rule.apply(&mut dom), 2);
        assert_eq!(
            render(&dom),
            r#"<code class="inline-code">a</code> <code>b</code> <code>c</code> <span class="y">d</span>"#
        );
    }
}
