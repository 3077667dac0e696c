//! Append-only arena of installed hooks.

use std::sync::Arc;

use log::warn;
use seltrace_runtime::{DispatchRuntime, ImplAddr};

use crate::domain::errors::InstallError;
use crate::domain::HookId;
use crate::hooks::installer;
use crate::plan::HookSpec;
use crate::trace::TraceSink;

/// One successfully installed hook: the pair, its resolved
/// implementation identity, and the arity its probe captures. Lives for
/// the remainder of the process; there is no removal.
#[derive(Debug, Clone)]
pub struct HookRecord {
    id: HookId,
    class: String,
    selector: String,
    addr: ImplAddr,
    arity: usize,
}

impl HookRecord {
    #[must_use]
    pub fn new(id: HookId, class: &str, selector: &str, addr: ImplAddr, arity: usize) -> Self {
        HookRecord { id, class: class.to_owned(), selector: selector.to_owned(), addr, arity }
    }

    #[must_use]
    pub fn id(&self) -> HookId {
        self.id
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn addr(&self) -> ImplAddr {
        self.addr
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// Owns the runtime and sink handles and the append-only list of
/// everything installed through it. Nothing is deduplicated: asking
/// twice for the same pair stacks two independent probes.
pub struct HookRegistry {
    runtime: Arc<dyn DispatchRuntime>,
    sink: Arc<dyn TraceSink>,
    hooks: Vec<HookRecord>,
    next_id: u64,
}

impl HookRegistry {
    #[must_use]
    pub fn new(runtime: Arc<dyn DispatchRuntime>, sink: Arc<dyn TraceSink>) -> Self {
        HookRegistry { runtime, sink, hooks: Vec::new(), next_id: 0 }
    }

    /// Install one pair.
    ///
    /// # Errors
    /// See [`InstallError`]; nothing is recorded on failure.
    pub fn install(&mut self, class: &str, selector: &str) -> Result<HookId, InstallError> {
        let id = HookId(self.next_id);
        let record = installer::install(&self.runtime, &self.sink, id, class, selector)?;
        self.next_id += 1;
        self.hooks.push(record);
        Ok(id)
    }

    /// Install an ordered list of pairs, continuing past failures: a
    /// missing class or selector fails that one pair only, is logged,
    /// and the rest of the list proceeds.
    pub fn install_all(&mut self, specs: &[HookSpec]) -> Vec<Result<HookId, InstallError>> {
        specs
            .iter()
            .map(|spec| {
                let status = self.install(&spec.class, &spec.selector);
                if let Err(ref err) = status {
                    warn!("Skipping {} {}: {err}", spec.class, spec.selector);
                }
                status
            })
            .collect()
    }

    #[must_use]
    pub fn hooks(&self) -> &[HookRecord] {
        &self.hooks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MemorySink;
    use seltrace_runtime::TableRuntime;

    fn registry() -> (Arc<TableRuntime>, HookRegistry) {
        let table = Arc::new(TableRuntime::new());
        table.define_class("SwitchControl", None);
        table.define_method("SwitchControl", "- setOn:").unwrap();
        table.define_method("SwitchControl", "doLayout").unwrap();
        let reg = HookRegistry::new(
            Arc::clone(&table) as Arc<dyn DispatchRuntime>,
            Arc::new(MemorySink::new()),
        );
        (table, reg)
    }

    fn spec(class: &str, selector: &str) -> HookSpec {
        HookSpec { class: class.to_owned(), selector: selector.to_owned() }
    }

    #[test]
    fn test_one_failure_does_not_stop_the_list() {
        let (_table, mut reg) = registry();
        let statuses = reg.install_all(&[
            spec("NoSuchClass", "- foo:"),
            spec("SwitchControl", "- setOn:"),
            spec("SwitchControl", "- missing:"),
            spec("SwitchControl", "doLayout"),
        ]);
        assert!(matches!(statuses[0], Err(InstallError::ClassNotFound { .. })));
        assert!(statuses[1].is_ok());
        assert!(matches!(statuses[2], Err(InstallError::SelectorNotFound { .. })));
        assert!(statuses[3].is_ok());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_repeated_pairs_get_distinct_records() {
        let (_table, mut reg) = registry();
        let first = reg.install("SwitchControl", "- setOn:").unwrap();
        let second = reg.install("SwitchControl", "- setOn:").unwrap();
        assert_ne!(first, second);
        assert_eq!(reg.hooks().len(), 2);
        assert_eq!(reg.hooks()[0].addr(), reg.hooks()[1].addr());
    }

    #[test]
    fn test_record_carries_resolved_identity() {
        let (table, mut reg) = registry();
        reg.install("SwitchControl", "- setOn:").unwrap();
        let record = &reg.hooks()[0];
        assert_eq!(record.arity(), 1);
        assert_eq!(Some(record.addr()), table.resolve_method("SwitchControl", "- setOn:"));
    }
}
