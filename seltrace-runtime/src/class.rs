//! Read-only snapshots of the live class table.

use crate::selector;

/// A method declared directly by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    selector: String,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        MethodDescriptor { selector: selector.into() }
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Positional argument count, recomputed from the selector text on
    /// every call.
    #[must_use]
    pub fn arity(&self) -> usize {
        selector::arity(&self.selector)
    }
}

/// Snapshot of one loaded class: its name and the ordered methods it
/// declares itself. Inherited methods are excluded; discovery and
/// installation only ever see code the class actually defines.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    own_methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, own_methods: Vec<MethodDescriptor>) -> Self {
        ClassDescriptor { name: name.into(), own_methods }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn own_methods(&self) -> &[MethodDescriptor] {
        &self.own_methods
    }
}
