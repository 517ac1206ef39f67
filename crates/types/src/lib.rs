//! rcs-panel-types: Shared data types for the rcs-panel instrument panel.
//!
//! This crate contains pure data types (severities, condition kinds,
//! threshold rows, alarm records, view descriptors, colors) that are shared
//! across all rcs-panel crates. Nothing here knows about ticks, registries
//! or rendering, making it suitable as a foundation layer.

pub mod alarm;
pub mod color;
pub mod condition;
pub mod severity;
pub mod view;

// Re-export commonly used types at the crate root for convenience
pub use alarm::{AlarmRecord, AudibleCueConfig};
pub use color::{Color, ColorStop};
pub use condition::{ConditionKind, Direction, ThresholdEntry, Thresholds, UnknownConditionKind};
pub use severity::Severity;
pub use view::{ActivationTrigger, ViewDescriptor, ViewId};
