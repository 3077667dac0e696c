//! Resolution and probe attachment for one (class, selector) pair.

use std::sync::Arc;

use log::info;
use seltrace_runtime::{
    selector, CallFrame, Description, DispatchRuntime, EntryProbe, RawValue,
};

use crate::domain::errors::InstallError;
use crate::domain::HookId;
use crate::hooks::registry::HookRecord;
use crate::trace::{TraceEvent, TraceSink};

/// Resolve `(class, selector)` against the live table and attach an
/// entry probe at the implementation's entry point.
///
/// Checks run in order - class lookup, selector resolution, probe
/// attachment - and the first failing check is the reported error;
/// no partial side effect remains on failure. Repeated installation of
/// the same pair is not deduplicated and stacks independent probes.
///
/// # Errors
/// See [`InstallError`] for the taxonomy.
pub fn install(
    runtime: &Arc<dyn DispatchRuntime>,
    sink: &Arc<dyn TraceSink>,
    id: HookId,
    class: &str,
    sel: &str,
) -> Result<HookRecord, InstallError> {
    if runtime.lookup_class(class).is_none() {
        return Err(InstallError::ClassNotFound { class: class.to_owned() });
    }
    let addr = runtime.resolve_method(class, sel).ok_or_else(|| {
        InstallError::SelectorNotFound { class: class.to_owned(), selector: sel.to_owned() }
    })?;

    let arity = selector::arity(sel);
    let probe = entry_probe(
        Arc::clone(runtime),
        Arc::clone(sink),
        class.to_owned(),
        sel.to_owned(),
        arity,
    );
    runtime.attach_entry_probe(addr, probe).map_err(|source| InstallError::Attach {
        class: class.to_owned(),
        selector: sel.to_owned(),
        source,
    })?;

    info!("Hooked {class} {sel} at {addr} ({arity} args)");
    Ok(HookRecord::new(id, class, sel, addr, arity))
}

/// Build the probe for one hook. The closure fires on the dispatching
/// thread: it captures the receiver slot and exactly `arity` positional
/// slots in call order, describes each one independently, and emits one
/// event to the sink before the implementation body runs. It holds no
/// state shared with any other probe.
fn entry_probe(
    runtime: Arc<dyn DispatchRuntime>,
    sink: Arc<dyn TraceSink>,
    class: String,
    sel: String,
    arity: usize,
) -> EntryProbe {
    Arc::new(move |frame: &CallFrame| {
        let receiver = describe_or_fallback(runtime.as_ref(), frame.receiver());
        let args: Vec<Description> =
            (0..arity).map(|i| describe_or_fallback(runtime.as_ref(), frame.arg(i))).collect();
        sink.emit(&TraceEvent {
            class: class.clone(),
            selector: sel.clone(),
            receiver,
            args,
        });
    })
}

/// Attempt the runtime's native conversion for one slot, degrading
/// immediately to the raw slot's fallback rendering. Conversion failure
/// is routine for non-object slots, so it is neither logged nor
/// propagated, and one value's failure never touches another.
fn describe_or_fallback(runtime: &dyn DispatchRuntime, value: RawValue) -> Description {
    match runtime.describe(value) {
        Ok(text) => Description::native(text, value),
        Err(_) => Description::fallback(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MemorySink;
    use seltrace_runtime::TableRuntime;

    fn harness() -> (Arc<dyn DispatchRuntime>, Arc<TableRuntime>, Arc<MemorySink>) {
        let table = Arc::new(TableRuntime::new());
        table.define_class("LanguageSwitchView", None);
        table.define_method("LanguageSwitchView", "- setLanguage:").unwrap();
        let runtime: Arc<dyn DispatchRuntime> = Arc::clone(&table) as Arc<dyn DispatchRuntime>;
        (runtime, table, Arc::new(MemorySink::new()))
    }

    #[test]
    fn test_check_order_class_before_selector() {
        let (runtime, _table, sink) = harness();
        let sink: Arc<dyn TraceSink> = sink;
        // Both the class and the selector are unknown; the class check
        // runs first.
        let err = install(&runtime, &sink, HookId(0), "NoSuchClass", "- nope:").unwrap_err();
        assert!(matches!(err, InstallError::ClassNotFound { .. }));
    }

    #[test]
    fn test_mixed_describable_and_foreign_arguments() {
        let (runtime, table, sink) = harness();
        table.define_method("LanguageSwitchView", "- setLanguage:animated:").unwrap();
        let dyn_sink: Arc<dyn TraceSink> = Arc::clone(&sink) as Arc<dyn TraceSink>;
        install(&runtime, &dyn_sink, HookId(0), "LanguageSwitchView", "- setLanguage:animated:")
            .unwrap();

        let receiver = table.register_object("<LanguageSwitchView>");
        let lang = table.register_object("zh-CN");
        // Second argument is a primitive boolean travelling through an
        // object-sized slot; conversion fails, fallback applies, the
        // event still carries both arguments.
        table
            .dispatch("LanguageSwitchView", "- setLanguage:animated:", receiver, &[lang, RawValue(1)])
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].args.len(), 2);
        assert_eq!(events[0].args[0].as_str(), "zh-CN");
        assert_eq!(events[0].args[1].as_str(), "0x1");
    }
}
