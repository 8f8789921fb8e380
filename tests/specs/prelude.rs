//! Shared fixtures for the behavioral specs

#![allow(dead_code)]

pub use phasebus_core::{BusConfig, DeadEvent, Event, EventKey, EventRegistry, RegistryError};
pub use phasebus_engine::{
    priority, BusError, CompositeListener, Dispatch, EventBus, ListenerInfo, ListenerScope,
    ManagedBus, SingularListener,
};

use std::sync::{Arc, Mutex, Once};

static TRACING: Once = Once::new();

/// Routes engine logs through the test writer; filter with `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An isolated registry plus a bus built on it
pub struct Harness {
    pub registry: EventRegistry,
    pub bus: EventBus,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(BusConfig::new("harness-bus"))
    }

    pub fn with_config(config: BusConfig) -> Self {
        init_tracing();
        let registry = EventRegistry::new();
        let bus = EventBus::with_config(registry.clone(), &config);
        Self { registry, bus }
    }

    /// A second bus sharing this harness's registry
    pub fn sibling(&self, name: &str) -> EventBus {
        EventBus::with_config(self.registry.clone(), &BusConfig::new(name))
    }

    pub fn managed(&self, name: &str) -> ManagedBus {
        ManagedBus::with_config(self.registry.clone(), &BusConfig::new(name))
    }
}

/// Ordered record of which listeners ran
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener that appends `label` when it runs
    pub fn listener<E: Event>(
        &self,
        label: &str,
        phase: &str,
        priority: i32,
    ) -> SingularListener<E> {
        let entries = Arc::clone(&self.entries);
        let label = label.to_string();
        SingularListener::builder()
            .phase(phase)
            .priority(priority)
            .build_infallible(move |_: &mut E| entries.lock().unwrap().push(label.clone()))
    }

    /// Default-phase listener with the given priority
    pub fn at<E: Event>(&self, label: &str, priority: i32) -> SingularListener<E> {
        self.listener(label, "default", priority)
    }

    /// Listener that appends `label` and then fails
    pub fn failing<E: Event>(&self, label: &str, priority: i32) -> SingularListener<E> {
        let entries = Arc::clone(&self.entries);
        let label = label.to_string();
        SingularListener::builder()
            .priority(priority)
            .build(move |_: &mut E| {
                entries.lock().unwrap().push(label.clone());
                Err(format!("{label} failed").into())
            })
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Entries recorded so far, clearing the journal
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }
}

/// Owned labels, for comparing against [`Journal::take`]
pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
