//! Selector text handling.
//!
//! A selector's shape determines its arity: each separator token
//! introduces exactly one positional argument. The count is derived
//! from the text every time it is needed, never stored, so a selector
//! string and its arity can never drift apart.

/// Token that introduces one positional argument in a selector.
pub const ARG_SEPARATOR: char = ':';

/// Number of positional arguments a selector takes.
///
/// `"doLayout"` → 0, `"- setLanguage:"` → 1,
/// `"- performSwitchWithOn:animated:shouldSendEvent:"` → 3. Method-kind
/// prefixes carry no separators and do not affect the count.
#[must_use]
pub fn arity(selector: &str) -> usize {
    selector.chars().filter(|&c| c == ARG_SEPARATOR).count()
}
