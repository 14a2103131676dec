//! Navigation State Machine - viewport-synchronized section highlighting
//!
//! Owns the per-section visibility map and the active section. Both change
//! only in response to observer events; user navigation merely asks the
//! Scroll Commander to move the viewport and waits for the resulting events.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --activate()--> Active --deactivate()/drop--> Released
//! ```
//!
//! `Released` is terminal. Observer callbacks hold only a weak reference to
//! the state and re-check the lifecycle on every event, so a trailing event
//! delivered after teardown changes nothing.
//!
//! # Active section policy
//!
//! The active section is the section that most recently reported
//! intersecting. During a fast scroll several sections can be visible at
//! once; the last one to enter wins, not the one covering the most area.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::NavigationConfig;
use crate::error::Result;
use crate::observer::{SubscriptionHandle, VisibilityCallback, VisibilityObserver};
use crate::registry::{SectionId, SectionRegistry};
use crate::scroll::ScrollCommander;

/// Reveal classes for a section's content wrapper
pub const ENTRANCE_REVEALED: &str = "opacity-100 translate-y-0";
pub const ENTRANCE_HIDDEN: &str = "opacity-0 translate-y-10";

/// Entrance-animation class for a section in the given visibility state
pub fn entrance_class(visible: bool) -> &'static str {
    if visible {
        ENTRANCE_REVEALED
    } else {
        ENTRANCE_HIDDEN
    }
}

// =============================================================================
// Visibility Map
// =============================================================================

/// Section -> "currently intersecting above threshold".
///
/// Always holds exactly the registry's sections, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMap {
    entries: Vec<(SectionId, bool)>,
}

impl VisibilityMap {
    fn for_registry(registry: &SectionRegistry) -> Self {
        Self {
            entries: registry.iter().map(|id| (id.clone(), false)).collect(),
        }
    }

    /// Visibility of `section`, or `None` for ids outside the registry
    pub fn get(&self, section: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(id, _)| id == section)
            .map(|(_, visible)| *visible)
    }

    /// Like [`get`](Self::get) but unknown ids read as not visible
    pub fn is_visible(&self, section: &str) -> bool {
        self.get(section).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionId, bool)> {
        self.entries.iter().map(|(id, visible)| (id, *visible))
    }

    pub fn visible_sections(&self) -> impl Iterator<Item = &SectionId> {
        self.entries
            .iter()
            .filter(|(_, visible)| *visible)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the previous value, or `None` if `section` is not a key
    fn set(&mut self, section: &str, visible: bool) -> Option<bool> {
        self.entries
            .iter_mut()
            .find(|(id, _)| id == section)
            .map(|(_, slot)| std::mem::replace(slot, visible))
    }
}

impl Serialize for VisibilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, visible) in &self.entries {
            map.serialize_entry(id.as_str(), visible)?;
        }
        map.end()
    }
}

// =============================================================================
// Snapshot (read model for the presentation layer)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Built, not yet observing
    Idle,
    /// Subscribed and accepting events
    Active,
    /// Torn down; no further state mutation
    Released,
}

/// Per-section render data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: SectionId,
    pub label: String,
    pub visible: bool,
    pub active: bool,
    pub entrance_class: &'static str,
}

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationSnapshot {
    pub active: SectionId,
    pub menu_open: bool,
    pub revision: u64,
    pub lifecycle: Lifecycle,
    pub sections: Vec<SectionView>,
}

// =============================================================================
// Shared state
// =============================================================================

struct NavCore {
    visibility: VisibilityMap,
    active: SectionId,
    menu_open: bool,
    lifecycle: Lifecycle,
    // Bumped on every observable change
    revision: u64,
}

impl NavCore {
    /// Returns true if anything observable changed
    fn apply_intersection(&mut self, section: &SectionId, is_intersecting: bool) -> bool {
        if self.lifecycle != Lifecycle::Active {
            tracing::debug!(section = %section, "Ignoring visibility event after release");
            return false;
        }

        let previous = match self.visibility.set(section.as_str(), is_intersecting) {
            Some(previous) => previous,
            None => {
                tracing::debug!(section = %section, "Ignoring visibility event for unknown section");
                return false;
            }
        };

        let mut changed = previous != is_intersecting;
        if is_intersecting && self.active != *section {
            tracing::debug!(from = %self.active, to = %section, "Active section changed");
            self.active = section.clone();
            changed = true;
        }

        if changed {
            self.revision += 1;
        }
        changed
    }

    fn set_menu(&mut self, open: bool) -> bool {
        if self.menu_open == open {
            return false;
        }
        self.menu_open = open;
        self.revision += 1;
        true
    }
}

type ChangeListener = Rc<dyn Fn()>;

fn notify(listeners: &RefCell<Vec<ChangeListener>>) {
    // Clone out so listeners may read the machine or register more listeners
    let pending: Vec<ChangeListener> = listeners.borrow().iter().cloned().collect();
    for listener in pending {
        listener();
    }
}

// =============================================================================
// Navigation Machine
// =============================================================================

/// Viewport-synchronized navigation state.
///
/// Generic over the observer and scroll effector so the browser wiring and
/// the deterministic test doubles drive the exact same logic.
pub struct NavigationMachine<O: VisibilityObserver, S: ScrollCommander> {
    registry: SectionRegistry,
    threshold: f64,
    core: Rc<RefCell<NavCore>>,
    listeners: Rc<RefCell<Vec<ChangeListener>>>,
    observer: O,
    scroller: S,
    subscriptions: Vec<(SectionId, SubscriptionHandle)>,
}

impl<O: VisibilityObserver, S: ScrollCommander> NavigationMachine<O, S> {
    /// Build an idle machine. Nothing is observed until [`activate`](Self::activate).
    pub fn new(config: NavigationConfig, observer: O, scroller: S) -> Result<Self> {
        config.validate()?;
        let registry = config.registry()?;

        let core = NavCore {
            visibility: VisibilityMap::for_registry(&registry),
            active: registry.default_section().clone(),
            menu_open: false,
            lifecycle: Lifecycle::Idle,
            revision: 0,
        };

        Ok(Self {
            registry,
            threshold: config.threshold,
            core: Rc::new(RefCell::new(core)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            observer,
            scroller,
            subscriptions: Vec::new(),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Subscribe every registered section.
    ///
    /// Returns the number of sections now observed. Calling this on an
    /// active or released machine does nothing and returns 0.
    pub fn activate(&mut self) -> usize {
        let lifecycle = self.core.borrow().lifecycle;
        if lifecycle != Lifecycle::Idle {
            tracing::debug!(?lifecycle, "Activate ignored");
            return 0;
        }
        self.core.borrow_mut().lifecycle = Lifecycle::Active;

        let callback = self.visibility_callback();
        for section in self.registry.iter() {
            match self
                .observer
                .subscribe(section, self.threshold, Rc::clone(&callback))
            {
                Ok(handle) => self.subscriptions.push((section.clone(), handle)),
                Err(err) => {
                    tracing::warn!(section = %section, error = %err, "Failed to observe section");
                }
            }
        }

        tracing::info!(
            observed = self.subscriptions.len(),
            threshold = self.threshold,
            "Navigation activated"
        );
        self.subscriptions.len()
    }

    /// Release every subscription and stop accepting events.
    ///
    /// Synchronous: once this returns no callback can reach the state.
    /// Safe to call repeatedly.
    pub fn deactivate(&mut self) {
        {
            let mut core = self.core.borrow_mut();
            if core.lifecycle == Lifecycle::Released {
                return;
            }
            core.lifecycle = Lifecycle::Released;
        }

        let released = self.subscriptions.len();
        for (_, handle) in self.subscriptions.drain(..) {
            self.observer.unsubscribe(handle);
        }
        self.listeners.borrow_mut().clear();

        tracing::info!(released, "Navigation deactivated");
    }

    fn visibility_callback(&self) -> VisibilityCallback {
        let core: Weak<RefCell<NavCore>> = Rc::downgrade(&self.core);
        let listeners: Weak<RefCell<Vec<ChangeListener>>> = Rc::downgrade(&self.listeners);

        Rc::new(move |section: &SectionId, is_intersecting: bool| {
            let Some(core) = core.upgrade() else {
                tracing::debug!(section = %section, "Visibility event after machine dropped");
                return;
            };
            let changed = core.borrow_mut().apply_intersection(section, is_intersecting);
            if changed {
                if let Some(listeners) = listeners.upgrade() {
                    notify(&listeners);
                }
            }
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Scroll to a section and close the mobile menu.
    ///
    /// Does not touch the visibility map or the active section; those follow
    /// from the visibility events the scroll produces. Unknown sections and
    /// released machines are silent no-ops.
    pub fn request_navigate(&self, section: &str) {
        if self.lifecycle() == Lifecycle::Released {
            tracing::debug!(section, "Navigate ignored after release");
            return;
        }

        self.close_menu();

        match self.registry.resolve(section) {
            Some(target) => {
                tracing::debug!(section = %target, "Navigate requested");
                self.scroller.scroll_to(target);
            }
            None => tracing::debug!(section, "Navigate to unknown section ignored"),
        }
    }

    /// Flip the mobile navigation menu
    pub fn toggle_menu(&self) {
        let open = !self.is_menu_open();
        self.set_menu(open);
    }

    pub fn close_menu(&self) {
        self.set_menu(false);
    }

    fn set_menu(&self, open: bool) {
        let changed = {
            let mut core = self.core.borrow_mut();
            core.lifecycle != Lifecycle::Released && core.set_menu(open)
        };
        if changed {
            notify(&self.listeners);
        }
    }

    /// Register a listener called after every observable state change.
    ///
    /// Listeners are dropped on deactivation.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        if self.lifecycle() == Lifecycle::Released {
            return;
        }
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn active_section(&self) -> SectionId {
        self.core.borrow().active.clone()
    }

    pub fn is_active(&self, section: &str) -> bool {
        self.core.borrow().active == section
    }

    pub fn is_visible(&self, section: &str) -> bool {
        self.core.borrow().visibility.is_visible(section)
    }

    pub fn visibility(&self) -> VisibilityMap {
        self.core.borrow().visibility.clone()
    }

    pub fn is_menu_open(&self) -> bool {
        self.core.borrow().menu_open
    }

    pub fn revision(&self) -> u64 {
        self.core.borrow().revision
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.core.borrow().lifecycle
    }

    /// Live observer subscriptions held by this machine
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let core = self.core.borrow();
        NavigationSnapshot {
            active: core.active.clone(),
            menu_open: core.menu_open,
            revision: core.revision,
            lifecycle: core.lifecycle,
            sections: core
                .visibility
                .iter()
                .map(|(id, visible)| SectionView {
                    id: id.clone(),
                    label: id.label(),
                    visible,
                    active: core.active == *id,
                    entrance_class: entrance_class(visible),
                })
                .collect(),
        }
    }
}

impl<O: VisibilityObserver, S: ScrollCommander> Drop for NavigationMachine<O, S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// =============================================================================
// Tests
// =============================================================================
