use crate::document::Element;
use crate::xpath::selector::{PathComponent, Predicate, Selector};

/// Where a selector landed in a concrete document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget<'a> {
    /// Element name, or attribute name without the `@`
    pub name: &'a str,
    /// Element matched by the last step (the owning element for attributes)
    pub leaf: &'a Element,
    /// Element an applier should mutate: the leaf itself, or its parent for
    /// sibling operations on elements
    pub target: &'a Element,
    pub is_attribute: bool,
}

impl<'a> ResolvedTarget<'a> {
    /// Current value of the targeted attribute, if this is an attribute target
    /// and the attribute is present.
    pub fn attribute_value(&self) -> Option<&'a str> {
        if self.is_attribute {
            self.leaf.attribute(self.name)
        } else {
            None
        }
    }
}

impl Selector {
    /// Resolve this selector against `root`, which stands for the first
    /// component (normally `MPD`) and is not matched by name.
    ///
    /// Returns `None` when any step finds no element. For element targets,
    /// `is_sibling_operation` picks the parent as the target; a sibling
    /// operation on the root itself has no parent and also yields `None`.
    pub fn resolve<'a>(
        &'a self,
        root: &'a Element,
        is_sibling_operation: bool,
    ) -> Option<ResolvedTarget<'a>> {
        let components = self.components();
        let last = components.len() - 1;

        let mut parent: Option<&'a Element> = None;
        let mut leaf = root;
        for (level, component) in components.iter().enumerate().skip(1) {
            parent = Some(leaf);
            // attributes are not tree nodes; the owning element stays the leaf
            if level == last && component.is_attribute() {
                break;
            }
            match select(component, leaf) {
                Some(next) => leaf = next,
                None => {
                    tracing::debug!(
                        selector = %self,
                        level,
                        component = %component,
                        "selector did not match"
                    );
                    return None;
                }
            }
        }

        let component = self.leaf_component();
        if let Some(attribute) = component.attribute_name() {
            return Some(ResolvedTarget {
                name: attribute,
                leaf,
                target: leaf,
                is_attribute: true,
            });
        }

        let target = if is_sibling_operation { parent? } else { leaf };
        Some(ResolvedTarget {
            name: component.name(),
            leaf,
            target,
            is_attribute: false,
        })
    }
}

/// Pick one child of `parent` by position, then attribute match, then first.
fn select<'a>(component: &'a PathComponent, parent: &'a Element) -> Option<&'a Element> {
    let mut candidates = parent.children_named(component.name());
    match component.predicate() {
        Some(Predicate::Position(position)) => {
            position.checked_sub(1).and_then(|idx| candidates.nth(idx))
        }
        Some(Predicate::AttributeMatch(matcher)) => candidates
            .find(|child| child.attribute(&matcher.name) == Some(matcher.value.as_str())),
        None => candidates.next(),
    }
}
