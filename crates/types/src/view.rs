//! View (screen) identity and activation triggers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer identity of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque "activate view N" event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActivationTrigger {
    /// Keyboard key name, e.g. "1" or "F2"
    Key(String),
    /// On-screen button name
    Button(String),
    /// Named message from another subsystem
    Message(String),
    /// Only reachable through direct registry calls
    None,
}

/// Composition-time description of a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub id: ViewId,
    pub name: String,
    #[serde(default = "default_trigger")]
    pub trigger: ActivationTrigger,
    /// Whether the view is active at composition time (self-registers)
    #[serde(default)]
    pub start_visible: bool,
}

fn default_trigger() -> ActivationTrigger {
    ActivationTrigger::None
}

impl ViewDescriptor {
    pub fn new(id: u32, name: &str, trigger: ActivationTrigger) -> Self {
        Self {
            id: ViewId(id),
            name: name.to_string(),
            trigger,
            start_visible: false,
        }
    }

    pub fn visible_at_start(mut self) -> Self {
        self.start_visible = true;
        self
    }
}
