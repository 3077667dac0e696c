//! In-memory, string-keyed dispatch table.
//!
//! Two-level lookup: class name → class entry → ordered method list,
//! populated at run time. This is the in-process stand-in for a live
//! runtime's class table: replay, demos, and tests register classes and
//! objects, then push calls through [`TableRuntime::dispatch`], which
//! fires whatever entry probes are attached before running the method
//! body.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use crate::class::{ClassDescriptor, MethodDescriptor};
use crate::runtime::{
    AttachError, CallFrame, DescribeError, DispatchRuntime, EntryProbe, EnumerateError, ImplAddr,
};
use crate::value::RawValue;

/// Implementation body of a registered method. Runs after every
/// attached probe has fired.
pub type MethodBody = Arc<dyn Fn(&CallFrame) + Send + Sync>;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Message {selector} sent to unknown class {class}")]
    UnknownClass { class: String, selector: String },

    #[error("{class} does not respond to {selector}")]
    Unrecognized { class: String, selector: String },
}

struct MethodEntry {
    selector: String,
    addr: ImplAddr,
    sel_handle: RawValue,
    probeable: bool,
    // Append-only: repeated attachment stacks independent probes.
    probes: Vec<EntryProbe>,
    body: Option<MethodBody>,
}

struct ClassEntry {
    superclass: Option<String>,
    methods: Vec<MethodEntry>,
}

#[derive(Default)]
struct Table {
    // Insertion order kept so enumeration is stable across walks of an
    // unchanged table.
    order: Vec<String>,
    classes: HashMap<String, ClassEntry>,
}

/// In-memory [`DispatchRuntime`]: a class table plus an object registry
/// mapping handle bits to native descriptions. All state is behind
/// locks; dispatch runs probes on the calling thread with no lock held.
pub struct TableRuntime {
    table: RwLock<Table>,
    objects: RwLock<HashMap<u64, String>>,
    fail_next_walk: Mutex<Option<String>>,
    next_addr: AtomicU64,
    next_handle: AtomicU64,
}

impl Default for TableRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRuntime {
    #[must_use]
    pub fn new() -> Self {
        TableRuntime {
            table: RwLock::new(Table::default()),
            objects: RwLock::new(HashMap::new()),
            fail_next_walk: Mutex::new(None),
            // Address-shaped constants so fallback renderings look like
            // what a probe would capture from a real process.
            next_addr: AtomicU64::new(0x10_4000),
            next_handle: AtomicU64::new(0x60_0000),
        }
    }

    /// Register a class. Re-defining an existing class is a no-op; the
    /// superclass link is stored by name and resolved lazily at
    /// dispatch time.
    pub fn define_class(&self, name: &str, superclass: Option<&str>) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.classes.contains_key(name) {
            return;
        }
        table.order.push(name.to_owned());
        table.classes.insert(
            name.to_owned(),
            ClassEntry { superclass: superclass.map(str::to_owned), methods: Vec::new() },
        );
    }

    /// Declare a method directly on `class` and return its entry point.
    ///
    /// # Errors
    /// Returns an error if the class has not been defined.
    pub fn define_method(&self, class: &str, selector: &str) -> Result<ImplAddr, DispatchError> {
        self.insert_method(class, selector, true, None)
    }

    /// Declare a method with an implementation body that runs on every
    /// dispatch, after the probes.
    ///
    /// # Errors
    /// Returns an error if the class has not been defined.
    pub fn define_method_with_body(
        &self,
        class: &str,
        selector: &str,
        body: MethodBody,
    ) -> Result<ImplAddr, DispatchError> {
        self.insert_method(class, selector, true, Some(body))
    }

    /// Declare a method whose entry point the probe primitive rejects,
    /// the analog of an unpatchable code location.
    ///
    /// # Errors
    /// Returns an error if the class has not been defined.
    pub fn define_unprobeable_method(
        &self,
        class: &str,
        selector: &str,
    ) -> Result<ImplAddr, DispatchError> {
        self.insert_method(class, selector, false, None)
    }

    fn insert_method(
        &self,
        class: &str,
        selector: &str,
        probeable: bool,
        body: Option<MethodBody>,
    ) -> Result<ImplAddr, DispatchError> {
        let addr = ImplAddr(self.next_addr.fetch_add(0x40, Ordering::Relaxed));
        let sel_handle = RawValue(self.next_handle.fetch_add(0x10, Ordering::Relaxed));
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let entry = table.classes.get_mut(class).ok_or_else(|| DispatchError::UnknownClass {
            class: class.to_owned(),
            selector: selector.to_owned(),
        })?;
        entry.methods.push(MethodEntry {
            selector: selector.to_owned(),
            addr,
            sel_handle,
            probeable,
            probes: Vec::new(),
            body,
        });
        Ok(addr)
    }

    /// Register an object whose native description is `description` and
    /// return its handle. Slots carrying any other bit pattern fail
    /// native conversion.
    pub fn register_object(&self, description: &str) -> RawValue {
        let handle = RawValue(self.next_handle.fetch_add(0x10, Ordering::Relaxed));
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.0, description.to_owned());
        handle
    }

    /// Make the next class table walk fail with `reason`. The walk
    /// after that succeeds again; a failed pass never sticks.
    pub fn fail_next_enumeration(&self, reason: &str) {
        *self.fail_next_walk.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(reason.to_owned());
    }

    /// Send a message: resolve `(class, selector)` the way call-time
    /// dispatch does (walking the superclass chain), fire every
    /// attached probe in attach order on the calling thread, then run
    /// the implementation body.
    ///
    /// # Errors
    /// Returns an error if nothing along the chain responds.
    pub fn dispatch(
        &self,
        class: &str,
        selector: &str,
        receiver: RawValue,
        args: &[RawValue],
    ) -> Result<(), DispatchError> {
        // Snapshot what the frame needs, then drop the lock so probes
        // and bodies can call back into the table.
        let (sel_handle, probes, body) = {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if !table.classes.contains_key(class) {
                return Err(DispatchError::UnknownClass {
                    class: class.to_owned(),
                    selector: selector.to_owned(),
                });
            }
            let mut cursor = Some(class);
            let mut found = None;
            while let Some(name) = cursor {
                let Some(entry) = table.classes.get(name) else { break };
                if let Some(method) = entry.methods.iter().find(|m| m.selector == selector) {
                    found = Some((method.sel_handle, method.probes.clone(), method.body.clone()));
                    break;
                }
                cursor = entry.superclass.as_deref();
            }
            found.ok_or_else(|| DispatchError::Unrecognized {
                class: class.to_owned(),
                selector: selector.to_owned(),
            })?
        };

        let frame = CallFrame::new(receiver, sel_handle, args);
        for probe in &probes {
            probe(&frame);
        }
        if let Some(body) = body {
            body(&frame);
        }
        Ok(())
    }
}

impl DispatchRuntime for TableRuntime {
    fn loaded_classes(&self) -> Result<Vec<ClassDescriptor>, EnumerateError> {
        if let Some(reason) =
            self.fail_next_walk.lock().unwrap_or_else(PoisonError::into_inner).take()
        {
            return Err(EnumerateError::TableWalk(reason));
        }
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table
            .order
            .iter()
            .filter_map(|name| {
                let entry = table.classes.get(name)?;
                Some(snapshot(name, entry))
            })
            .collect())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassDescriptor> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.classes.get(name).map(|entry| snapshot(name, entry))
    }

    fn resolve_method(&self, class: &str, selector: &str) -> Option<ImplAddr> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let entry = table.classes.get(class)?;
        entry.methods.iter().find(|m| m.selector == selector).map(|m| m.addr)
    }

    fn attach_entry_probe(&self, addr: ImplAddr, probe: EntryProbe) -> Result<(), AttachError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        for entry in table.classes.values_mut() {
            if let Some(method) = entry.methods.iter_mut().find(|m| m.addr == addr) {
                if !method.probeable {
                    return Err(AttachError::Rejected {
                        addr,
                        reason: format!("entry of {} is not a patchable location", method.selector),
                    });
                }
                method.probes.push(probe);
                return Ok(());
            }
        }
        Err(AttachError::UnknownAddress { addr })
    }

    fn describe(&self, value: RawValue) -> Result<String, DescribeError> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&value.0)
            .cloned()
            .ok_or(DescribeError::NotAnObject { value })
    }
}

fn snapshot(name: &str, entry: &ClassEntry) -> ClassDescriptor {
    ClassDescriptor::new(
        name,
        entry.methods.iter().map(|m| MethodDescriptor::new(m.selector.clone())).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_table() -> TableRuntime {
        let rt = TableRuntime::new();
        rt.define_class("SwitchControl", None);
        rt.define_method("SwitchControl", "- setOn:").unwrap();
        rt.define_method("SwitchControl", "doLayout").unwrap();
        rt
    }

    #[test]
    fn test_own_methods_exclude_inherited() {
        let rt = sample_table();
        rt.define_class("FancySwitchControl", Some("SwitchControl"));
        rt.define_method("FancySwitchControl", "- setTheme:").unwrap();

        let class = rt.lookup_class("FancySwitchControl").unwrap();
        let selectors: Vec<&str> =
            class.own_methods().iter().map(MethodDescriptor::selector).collect();
        assert_eq!(selectors, ["- setTheme:"]);
    }

    #[test]
    fn test_resolution_does_not_walk_the_chain() {
        let rt = sample_table();
        rt.define_class("FancySwitchControl", Some("SwitchControl"));

        assert!(rt.resolve_method("SwitchControl", "- setOn:").is_some());
        assert!(rt.resolve_method("FancySwitchControl", "- setOn:").is_none());
    }

    #[test]
    fn test_dispatch_walks_the_chain_and_fires_probes() {
        let rt = sample_table();
        rt.define_class("FancySwitchControl", Some("SwitchControl"));

        let fired = Arc::new(AtomicUsize::new(0));
        let addr = rt.resolve_method("SwitchControl", "- setOn:").unwrap();
        let counter = Arc::clone(&fired);
        rt.attach_entry_probe(addr, Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        // Inherited dispatch still reaches the superclass implementation.
        rt.dispatch("FancySwitchControl", "- setOn:", RawValue(1), &[RawValue(1)]).unwrap();
        rt.dispatch("SwitchControl", "- setOn:", RawValue(1), &[RawValue(0)]).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_probes_stack_in_attach_order() {
        let rt = sample_table();
        let addr = rt.resolve_method("SwitchControl", "doLayout").unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            rt.attach_entry_probe(addr, Arc::new(move |_| {
                order.lock().unwrap().push(tag);
            }))
            .unwrap();
        }

        rt.dispatch("SwitchControl", "doLayout", RawValue(1), &[]).unwrap();
        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn test_attach_rejects_unprobeable_and_unknown_addresses() {
        let rt = sample_table();
        let sealed = rt.define_unprobeable_method("SwitchControl", "- sealed:").unwrap();

        let err = rt.attach_entry_probe(sealed, Arc::new(|_| {})).unwrap_err();
        assert!(matches!(err, AttachError::Rejected { .. }));

        let err = rt.attach_entry_probe(ImplAddr(0x1), Arc::new(|_| {})).unwrap_err();
        assert!(matches!(err, AttachError::UnknownAddress { .. }));
    }

    #[test]
    fn test_describe_distinguishes_objects_from_foreign_bits() {
        let rt = sample_table();
        let obj = rt.register_object("zh-CN");
        assert_eq!(rt.describe(obj).unwrap(), "zh-CN");
        assert!(matches!(
            rt.describe(RawValue(0x7)),
            Err(DescribeError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_enumeration_failure_does_not_stick() {
        let rt = sample_table();
        rt.fail_next_enumeration("table mutated under walk");
        assert!(rt.loaded_classes().is_err());
        assert_eq!(rt.loaded_classes().unwrap().len(), 1);
    }

    #[test]
    fn test_dispatch_errors() {
        let rt = sample_table();
        assert!(matches!(
            rt.dispatch("NoSuchClass", "- foo:", RawValue(1), &[]),
            Err(DispatchError::UnknownClass { .. })
        ));
        assert!(matches!(
            rt.dispatch("SwitchControl", "- foo:", RawValue(1), &[]),
            Err(DispatchError::Unrecognized { .. })
        ));
    }
}
