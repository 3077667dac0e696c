//! Keyword-filtered survey of the live class table.
//!
//! Discovery is read-only and advisory: it never attaches a probe and
//! never resolves an implementation address. A class is reported iff
//! its name contains at least one keyword (case-sensitive substring)
//! AND at least one of its own selectors does too; the class-level
//! match alone is not sufficient. The walk ends with an explicit
//! completion marker so a consumer can tell an exhaustive report from
//! an interrupted one.

use std::io::Write;

use seltrace_runtime::{ClassDescriptor, DispatchRuntime, MethodDescriptor};

use crate::domain::DiscoveryError;

/// One reported class with the subset of its own selectors that
/// matched. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMatch {
    pub class: String,
    pub selectors: Vec<String>,
}

/// Item of the discovery sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryItem {
    Match(ClassMatch),
    /// Terminal marker: the walk finished and the report is exhaustive.
    Complete { classes_walked: usize },
}

/// Lazy, finite, non-restartable sequence over one table walk.
/// Re-running [`discover`] re-walks the live table, which may have
/// changed in the meantime.
pub struct Discovery {
    classes: std::vec::IntoIter<ClassDescriptor>,
    keywords: Vec<String>,
    walked: usize,
    finished: bool,
}

impl Iterator for Discovery {
    type Item = DiscoveryItem;

    fn next(&mut self) -> Option<DiscoveryItem> {
        for class in self.classes.by_ref() {
            self.walked += 1;
            if !contains_any(class.name(), &self.keywords) {
                continue;
            }
            let selectors: Vec<String> = class
                .own_methods()
                .iter()
                .map(MethodDescriptor::selector)
                .filter(|sel| contains_any(sel, &self.keywords))
                .map(str::to_owned)
                .collect();
            if !selectors.is_empty() {
                return Some(DiscoveryItem::Match(ClassMatch {
                    class: class.name().to_owned(),
                    selectors,
                }));
            }
        }
        if self.finished {
            None
        } else {
            self.finished = true;
            Some(DiscoveryItem::Complete { classes_walked: self.walked })
        }
    }
}

/// Survey the table for classes and selectors matching any keyword.
///
/// The table is enumerated exactly once, up front; filtering is lazy.
/// Keyword order never changes the reported set. Zero matches is a
/// valid outcome, not an error.
///
/// # Errors
/// Returns an error if the table walk itself fails. Fatal to this
/// discovery pass only.
pub fn discover(
    runtime: &dyn DispatchRuntime,
    keywords: &[String],
) -> Result<Discovery, DiscoveryError> {
    let classes = runtime.loaded_classes()?;
    Ok(Discovery {
        classes: classes.into_iter(),
        keywords: keywords.to_vec(),
        walked: 0,
        finished: false,
    })
}

/// Render a discovery report in the fixed layout: one line per class,
/// indented selector lines, completion line last.
///
/// # Errors
/// Returns an error if writing to `out` fails.
pub fn write_report<W: Write>(
    out: &mut W,
    keywords: &[String],
    discovery: Discovery,
) -> std::io::Result<()> {
    writeln!(out, "[*] Enumerating classes containing keywords: {}", keywords.join(", "))?;
    for item in discovery {
        match item {
            DiscoveryItem::Match(found) => {
                writeln!(out, "  [class] {}", found.class)?;
                for sel in &found.selectors {
                    writeln!(out, "    [sel] {sel}")?;
                }
            }
            DiscoveryItem::Complete { classes_walked } => {
                writeln!(out, "[*] Enumeration complete ({classes_walked} classes walked).")?;
            }
        }
    }
    Ok(())
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| text.contains(kw.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seltrace_runtime::TableRuntime;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    fn sample_runtime() -> TableRuntime {
        let rt = TableRuntime::new();
        rt.define_class("FooSwitchView", None);
        rt.define_method("FooSwitchView", "- setOn:").unwrap();
        rt.define_method("FooSwitchView", "doLayout").unwrap();
        rt.define_class("LanguageSwitchView", None);
        rt.define_method("LanguageSwitchView", "- setLanguage:").unwrap();
        rt.define_method("LanguageSwitchView", "- commitSwitchTo:").unwrap();
        rt.define_class("ScrollView", None);
        rt.define_method("ScrollView", "- setSwitchDelegate:").unwrap();
        rt
    }

    fn matches(rt: &TableRuntime, kws: &[&str]) -> Vec<ClassMatch> {
        discover(rt, &keywords(kws))
            .unwrap()
            .filter_map(|item| match item {
                DiscoveryItem::Match(found) => Some(found),
                DiscoveryItem::Complete { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_class_match_alone_is_not_sufficient() {
        // FooSwitchView matches on name, but neither of its own
        // selectors contains "Switch", so it is not reported.
        let rt = sample_runtime();
        let found = matches(&rt, &["Switch"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class, "LanguageSwitchView");
        assert_eq!(found[0].selectors, ["- commitSwitchTo:"]);
    }

    #[test]
    fn test_selector_match_requires_class_match_too() {
        // ScrollView declares "- setSwitchDelegate:" but its name does
        // not contain any keyword.
        let rt = sample_runtime();
        assert!(matches(&rt, &["Switch"]).iter().all(|m| m.class != "ScrollView"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let rt = sample_runtime();
        assert!(matches(&rt, &["switchview"]).is_empty());
    }

    #[test]
    fn test_keyword_order_is_irrelevant() {
        let rt = sample_runtime();
        let forward = matches(&rt, &["Language", "Switch"]);
        let backward = matches(&rt, &["Switch", "Language"]);
        let forward_set: std::collections::BTreeSet<String> =
            forward.iter().map(|m| m.class.clone()).collect();
        let backward_set: std::collections::BTreeSet<String> =
            backward.iter().map(|m| m.class.clone()).collect();
        assert_eq!(forward_set, backward_set);
    }

    #[test]
    fn test_inherited_selectors_are_excluded() {
        let rt = sample_runtime();
        rt.define_class("MiniSwitchView", Some("FooSwitchView"));
        rt.define_method("MiniSwitchView", "- shrink").unwrap();
        // "- switchToNext"-style matches never leak in from ancestors.
        assert!(matches(&rt, &["Switch"]).iter().all(|m| m.class != "MiniSwitchView"));
    }

    #[test]
    fn test_empty_result_ends_with_completion_marker() {
        let rt = sample_runtime();
        let items: Vec<DiscoveryItem> =
            discover(&rt, &keywords(&["NoSuchKeyword"])).unwrap().collect();
        assert_eq!(items, [DiscoveryItem::Complete { classes_walked: 3 }]);
    }

    #[test]
    fn test_walk_failure_is_fatal_to_the_pass_only() {
        let rt = sample_runtime();
        rt.fail_next_enumeration("table mutated under walk");
        assert!(discover(&rt, &keywords(&["Switch"])).is_err());
        assert_eq!(matches(&rt, &["Switch"]).len(), 1);
    }

    #[test]
    fn test_report_layout() {
        let rt = sample_runtime();
        let kws = keywords(&["Language"]);
        let discovery = discover(&rt, &kws).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &kws, discovery).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert_eq!(
            report,
            "[*] Enumerating classes containing keywords: Language\n\
             \x20 [class] LanguageSwitchView\n\
             \x20   [sel] - setLanguage:\n\
             [*] Enumeration complete (3 classes walked).\n"
        );
    }
}
