//! Value source trait and a settable in-memory implementation

use rcs_panel_types::ConditionKind;
use std::cell::Cell;
use std::collections::HashMap;

/// Metadata about a value source
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Unique identifier for this source type
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of what this source provides
    pub description: String,
    /// Kinds this source models; everything else reads as NaN
    pub available_kinds: Vec<ConditionKind>,
}

/// Read-only provider of instrument values.
///
/// The panel core treats this as an opaque external collaborator: it never
/// assumes reads are cheap and reads each needed value once per tick.
pub trait ValueSource {
    /// Get metadata about this source
    fn metadata(&self) -> &SourceMetadata;

    /// Current value of an instrument, or NaN if the plant model has none
    fn value(&self, kind: ConditionKind) -> f64;

    /// Whether the reactor trip signal is set
    fn is_tripped(&self) -> bool;

    /// Number of running reactor coolant pumps, if modeled
    fn running_rcp_count(&self) -> Option<u32> {
        None
    }
}

/// Value source backed by a map, for tests and static displays.
///
/// Counts reads so callers can check how often the panel polls it.
#[derive(Debug)]
pub struct StaticValueSource {
    metadata: SourceMetadata,
    values: HashMap<ConditionKind, f64>,
    tripped: bool,
    running_pumps: Option<u32>,
    reads: Cell<usize>,
}

impl StaticValueSource {
    pub fn new() -> Self {
        Self {
            metadata: SourceMetadata {
                id: "static".to_string(),
                name: "Static".to_string(),
                description: "Fixed values set by the caller".to_string(),
                available_kinds: Vec::new(),
            },
            values: HashMap::new(),
            tripped: false,
            running_pumps: None,
            reads: Cell::new(0),
        }
    }

    pub fn with_value(mut self, kind: ConditionKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    pub fn set(&mut self, kind: ConditionKind, value: f64) {
        self.values.insert(kind, value);
        if !self.metadata.available_kinds.contains(&kind) {
            self.metadata.available_kinds.push(kind);
        }
    }

    /// Stop modeling a kind; it reads as NaN afterwards
    pub fn remove(&mut self, kind: ConditionKind) {
        self.values.remove(&kind);
        self.metadata.available_kinds.retain(|k| *k != kind);
    }

    pub fn set_tripped(&mut self, tripped: bool) {
        self.tripped = tripped;
    }

    pub fn set_running_pumps(&mut self, count: Option<u32>) {
        self.running_pumps = count;
    }

    /// Number of `value` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }
}

impl Default for StaticValueSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource for StaticValueSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn value(&self, kind: ConditionKind) -> f64 {
        self.reads.set(self.reads.get() + 1);
        self.values.get(&kind).copied().unwrap_or(f64::NAN)
    }

    fn is_tripped(&self) -> bool {
        self.tripped
    }

    fn running_rcp_count(&self) -> Option<u32> {
        self.running_pumps
    }
}
