//! Screen registry: the set of named views and the single active one.
//!
//! The registry is the only owner of visibility. Screens expose a descriptor
//! and show/hide hooks, but never hold their own visible flag, so registry and
//! screen state cannot diverge.
//!
//! Registration is two-phase. Screens that start visible register themselves
//! when the composition is activated; screens composed hidden are picked up by
//! an explicit `discover_late_registrations` pass.

use log::{debug, info, warn};
use rcs_panel_types::{ActivationTrigger, ViewDescriptor, ViewId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use uuid::Uuid;

/// A named display surface
pub trait Screen {
    fn descriptor(&self) -> &ViewDescriptor;

    /// Called after the registry made this screen visible
    fn on_show(&mut self) {}

    /// Called after the registry hid this screen
    fn on_hide(&mut self) {}
}

/// Screen shared between the composition and the registry
pub type SharedScreen = Rc<RefCell<dyn Screen>>;

/// Active-screen change callback: `(old, new)`
pub type ChangeCallback = Box<dyn FnMut(Option<ViewId>, Option<ViewId>)>;

/// Registry behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// At most one visible screen
    pub exclusive: bool,
    /// Whether toggling the active screen may leave nothing visible
    pub allow_none: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            exclusive: true,
            allow_none: false,
        }
    }
}

/// Plain screen that only counts its hook calls
#[derive(Debug, Clone)]
pub struct PanelScreen {
    descriptor: ViewDescriptor,
    shown: usize,
    hidden: usize,
}

impl PanelScreen {
    pub fn new(descriptor: ViewDescriptor) -> Self {
        Self {
            descriptor,
            shown: 0,
            hidden: 0,
        }
    }

    pub fn shared(descriptor: ViewDescriptor) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(descriptor)))
    }

    pub fn shown_count(&self) -> usize {
        self.shown
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden
    }
}

impl Screen for PanelScreen {
    fn descriptor(&self) -> &ViewDescriptor {
        &self.descriptor
    }

    fn on_show(&mut self) {
        self.shown += 1;
        debug!("Screen '{}' shown", self.descriptor.name);
    }

    fn on_hide(&mut self) {
        self.hidden += 1;
        debug!("Screen '{}' hidden", self.descriptor.name);
    }
}

/// Every screen the host composed, registered or not
#[derive(Default)]
pub struct Composition {
    screens: Vec<SharedScreen>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, screen: SharedScreen) {
        self.screens.push(screen);
    }

    pub fn screens(&self) -> &[SharedScreen] {
        &self.screens
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Composed screen by id
    pub fn find(&self, id: ViewId) -> Option<SharedScreen> {
        self.screens
            .iter()
            .find(|s| s.borrow().descriptor().id == id)
            .cloned()
    }
}

struct Entry {
    screen: SharedScreen,
    visible: bool,
}

/// Owns the registered screens, their visibility and the active id
pub struct ScreenRegistry {
    config: RegistryConfig,
    entries: BTreeMap<ViewId, Entry>,
    active_id: Option<ViewId>,
    callbacks: Vec<(String, ChangeCallback)>,
}

impl ScreenRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            active_id: None,
            callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Register a screen, hidden.
    ///
    /// Re-registering the same instance is a no-op. A different instance with
    /// a known id replaces the old one and takes over its visibility.
    pub fn register(&mut self, screen: SharedScreen) {
        let (id, name) = {
            let s = screen.borrow();
            (s.descriptor().id, s.descriptor().name.clone())
        };

        if let Some(entry) = self.entries.get_mut(&id) {
            if Rc::ptr_eq(&entry.screen, &screen) {
                return;
            }
            warn!("Screen {} already registered, replacing it with '{}'", id, name);
            let old = std::mem::replace(&mut entry.screen, screen);
            if entry.visible {
                old.borrow_mut().on_hide();
                entry.screen.borrow_mut().on_show();
            }
            return;
        }

        debug!("Registered screen {} '{}'", id, name);
        self.entries.insert(
            id,
            Entry {
                screen,
                visible: false,
            },
        );
    }

    /// Remove a screen. Clears the active id if it was active; nothing is promoted.
    pub fn unregister(&mut self, id: ViewId) -> bool {
        if self.entries.remove(&id).is_none() {
            debug!("unregister: unknown screen {}", id);
            return false;
        }
        debug!("Unregistered screen {}", id);
        if self.active_id == Some(id) {
            self.active_id = None;
            self.notify(Some(id), None);
        }
        true
    }

    /// Make a screen visible; returns false for an unknown id.
    ///
    /// In exclusive mode the previous screen is hidden (hook included) before
    /// the new one is shown, within this call.
    pub fn show(&mut self, id: ViewId) -> bool {
        if !self.entries.contains_key(&id) {
            debug!("show: unknown screen {}", id);
            return false;
        }

        let old = self.active_id;
        if self.config.exclusive {
            let others: Vec<ViewId> = self
                .entries
                .iter()
                .filter(|(other, entry)| **other != id && entry.visible)
                .map(|(other, _)| *other)
                .collect();
            for other in others {
                self.set_visible(other, false);
            }
        }
        self.set_visible(id, true);
        self.active_id = Some(id);

        if old != Some(id) {
            info!("Active screen {:?} -> {}", old.map(|v| v.0), id);
            self.notify(old, Some(id));
        }
        true
    }

    /// Hide a visible screen; false if unknown or already hidden.
    ///
    /// With `exclusive` on, only the active screen is ever visible. Without
    /// it, any visible screen can be hidden, and the change notification
    /// fires only when the active one goes.
    pub fn hide(&mut self, id: ViewId) -> bool {
        match self.entries.get(&id) {
            None => {
                debug!("hide: unknown screen {}", id);
                return false;
            }
            Some(entry) if !entry.visible => {
                debug!("hide: screen {} is not visible", id);
                return false;
            }
            Some(_) => {}
        }

        self.set_visible(id, false);
        if self.active_id == Some(id) {
            self.active_id = None;
            info!("Active screen {} -> none", id);
            self.notify(Some(id), None);
        }
        true
    }

    /// Show a hidden screen, or hide a visible one when `allow_none` permits.
    ///
    /// Returns whether anything changed.
    pub fn toggle(&mut self, id: ViewId) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            debug!("toggle: unknown screen {}", id);
            return false;
        };
        if entry.visible {
            if self.config.allow_none {
                self.hide(id)
            } else {
                debug!("toggle: screen {} stays visible (allow_none is off)", id);
                false
            }
        } else {
            self.show(id)
        }
    }

    /// Toggle the screen bound to an activation trigger
    pub fn route(&mut self, trigger: &ActivationTrigger) -> bool {
        if *trigger == ActivationTrigger::None {
            return false;
        }
        let target = self
            .entries
            .iter()
            .find(|(_, entry)| entry.screen.borrow().descriptor().trigger == *trigger)
            .map(|(id, _)| *id);
        match target {
            Some(id) => self.toggle(id),
            None => {
                debug!("route: no screen bound to {:?}", trigger);
                false
            }
        }
    }

    /// Self-registration for screens composed visible.
    ///
    /// Registers every start-visible screen and shows the first of them if
    /// no screen is active yet. Returns how many were registered.
    pub fn activate(&mut self, composition: &Composition) -> usize {
        let mut first = None;
        let mut count = 0;
        for screen in composition.screens() {
            let (id, start_visible) = {
                let s = screen.borrow();
                (s.descriptor().id, s.descriptor().start_visible)
            };
            if !start_visible {
                continue;
            }
            self.register(screen.clone());
            first.get_or_insert(id);
            count += 1;
        }
        if self.active_id.is_none() {
            if let Some(id) = first {
                self.show(id);
            }
        }
        count
    }

    /// Register every composed screen not yet known, hidden. Idempotent.
    pub fn discover_late_registrations(&mut self, composition: &Composition) -> usize {
        let mut found = 0;
        for screen in composition.screens() {
            let id = screen.borrow().descriptor().id;
            if self.entries.contains_key(&id) {
                continue;
            }
            self.register(screen.clone());
            found += 1;
        }
        if found > 0 {
            info!("Discovered {} late screen registration(s)", found);
        }
        found
    }

    /// Register a callback for active-screen changes. Returns a subscription id.
    pub fn on_change<F>(&mut self, callback: F) -> String
    where
        F: FnMut(Option<ViewId>, Option<ViewId>) + 'static,
    {
        let id = Uuid::new_v4().to_string();
        self.callbacks.push((id.clone(), Box::new(callback)));
        id
    }

    /// Returns true if a callback was removed
    pub fn remove_callback(&mut self, subscription_id: &str) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(id, _)| id != subscription_id);
        self.callbacks.len() != before
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn active_id(&self) -> Option<ViewId> {
        self.active_id
    }

    /// Whether a screen is visible; false for unknown ids
    pub fn is_visible(&self, id: ViewId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.visible)
    }

    pub fn visible_ids(&self) -> Vec<ViewId> {
        self.entries
            .iter()
            .filter(|(_, e)| e.visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn screen(&self, id: ViewId) -> Option<SharedScreen> {
        self.entries.get(&id).map(|e| e.screen.clone())
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> Vec<ViewId> {
        self.entries.keys().copied().collect()
    }

    /// Name of the active screen
    pub fn active_name(&self) -> Option<String> {
        let id = self.active_id?;
        self.entries
            .get(&id)
            .map(|e| e.screen.borrow().descriptor().name.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_visible(&mut self, id: ViewId, visible: bool) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        if entry.visible == visible {
            return;
        }
        entry.visible = visible;
        let mut screen = entry.screen.borrow_mut();
        if visible {
            screen.on_show();
        } else {
            screen.on_hide();
        }
    }

    fn notify(&mut self, old: Option<ViewId>, new: Option<ViewId>) {
        for (_, callback) in &mut self.callbacks {
            callback(old, new);
        }
    }
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
