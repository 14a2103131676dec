//! Visibility Observer Adapter
//!
//! Isolates the navigation core from the platform's viewport-intersection
//! primitive. The browser implementation lives in the `web` module; this module
//! defines the contract and a deterministic in-memory implementation that
//! delivers events synchronously, on demand.
//!
//! # Contract
//!
//! - `subscribe(target, threshold, callback)` returns a handle. The callback
//!   receives `(target, is_intersecting)` each time the target's visible
//!   ratio crosses `threshold` in either direction.
//! - `unsubscribe(handle)` stops all future callbacks for that handle.
//!   Unsubscribing twice, or with a handle the observer never issued, is a
//!   no-op.
//! - Events are passed through in delivery order. The adapter never reorders
//!   or coalesces them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Result;
use crate::registry::SectionId;

/// Callback invoked with `(target, is_intersecting)`.
pub type VisibilityCallback = Rc<dyn Fn(&SectionId, bool)>;

/// Opaque token identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Viewport visibility source.
///
/// Methods take `&self`: observers are shared between the state machine that
/// owns the subscriptions and whoever drives the platform (the browser, or a
/// test), so implementations use interior mutability.
pub trait VisibilityObserver {
    /// Start observing `target`.
    ///
    /// Fails only when the platform cannot attach an observer at all.
    fn subscribe(
        &self,
        target: &SectionId,
        threshold: f64,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle>;

    /// Stop observing. Never fails.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

impl<T: VisibilityObserver + ?Sized> VisibilityObserver for Rc<T> {
    fn subscribe(
        &self,
        target: &SectionId,
        threshold: f64,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle> {
        (**self).subscribe(target, threshold, callback)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        (**self).unsubscribe(handle)
    }
}

// =============================================================================
// ManualObserver - deterministic, synchronous delivery
// =============================================================================

struct ManualSubscription {
    target: SectionId,
    threshold: f64,
    callback: VisibilityCallback,
    // Last state reported through `report_ratio`, for crossing detection
    last_reported: Option<bool>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    subscriptions: BTreeMap<u64, ManualSubscription>,
}

/// In-memory observer driven explicitly by the caller.
///
/// Used for native builds and tests: share it as `Rc<ManualObserver>` with a
/// [`NavigationMachine`](crate::navigation::NavigationMachine), then push
/// events with [`emit`](Self::emit) or [`report_ratio`](Self::report_ratio).
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use portfolio_nav_core::{ManualObserver, NavigationConfig, NavigationMachine, RecordingScroller};
///
/// let observer = Rc::new(ManualObserver::new());
/// let mut nav = NavigationMachine::new(
///     NavigationConfig::default(),
///     Rc::clone(&observer),
///     RecordingScroller::new(),
/// ).unwrap();
/// nav.activate();
///
/// observer.emit("about", true);
/// assert_eq!(nav.active_section(), "about");
/// ```
#[derive(Default)]
pub struct ManualObserver {
    state: RefCell<ManualState>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a raw `(target, is_intersecting)` event to every live
    /// subscription on `target`.
    ///
    /// Returns how many callbacks were invoked. Targets with no subscription
    /// are silently dropped, as a real platform would.
    pub fn emit(&self, target: &str, is_intersecting: bool) -> usize {
        let deliveries: Vec<(SectionId, VisibilityCallback)> = {
            let state = self.state.borrow();
            state
                .subscriptions
                .values()
                .filter(|sub| sub.target == target)
                .map(|sub| (sub.target.clone(), Rc::clone(&sub.callback)))
                .collect()
        };

        // Borrow released: callbacks may subscribe or unsubscribe re-entrantly
        for (target, callback) in &deliveries {
            callback(target, is_intersecting);
        }
        deliveries.len()
    }

    /// Report the target's current visible ratio.
    ///
    /// Behaves like a browser intersection observer: the first report after
    /// subscribing always fires, later reports fire only when the ratio
    /// crosses the subscription's threshold.
    pub fn report_ratio(&self, target: &str, ratio: f64) -> usize {
        let deliveries: Vec<(SectionId, VisibilityCallback, bool)> = {
            let mut state = self.state.borrow_mut();
            state
                .subscriptions
                .values_mut()
                .filter(|sub| sub.target == target)
                .filter_map(|sub| {
                    let intersecting = ratio > 0.0 && ratio >= sub.threshold;
                    if sub.last_reported == Some(intersecting) {
                        return None;
                    }
                    sub.last_reported = Some(intersecting);
                    Some((sub.target.clone(), Rc::clone(&sub.callback), intersecting))
                })
                .collect()
        };

        for (target, callback, intersecting) in &deliveries {
            callback(target, *intersecting);
        }
        deliveries.len()
    }

    /// Number of live subscriptions across all targets
    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    /// Whether any live subscription watches `target`
    pub fn is_observing(&self, target: &str) -> bool {
        self.state
            .borrow()
            .subscriptions
            .values()
            .any(|sub| sub.target == target)
    }

    /// Threshold registered for `target`, if observed
    pub fn threshold_for(&self, target: &str) -> Option<f64> {
        self.state
            .borrow()
            .subscriptions
            .values()
            .find(|sub| sub.target == target)
            .map(|sub| sub.threshold)
    }
}

impl VisibilityObserver for ManualObserver {
    fn subscribe(
        &self,
        target: &SectionId,
        threshold: f64,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.subscriptions.insert(
            id,
            ManualSubscription {
                target: target.clone(),
                threshold,
                callback,
                last_reported: None,
            },
        );
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.state.borrow_mut().subscriptions.remove(&handle.raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<(String, bool)>>>, VisibilityCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let callback: VisibilityCallback = Rc::new(move |target: &SectionId, visible: bool| {
            sink.borrow_mut().push((target.to_string(), visible));
        });
        (log, callback)
    }

    fn section(id: &str) -> SectionId {
        crate::registry::SectionRegistry::new([id])
            .unwrap()
            .default_section()
            .clone()
    }

    #[test]
    fn test_emit_reaches_only_matching_target() {
        let observer = ManualObserver::new();
        let (log, callback) = recorder();
        observer.subscribe(&section("home"), 0.3, callback).unwrap();

        assert_eq!(observer.emit("home", true), 1);
        assert_eq!(observer.emit("about", true), 0);
        assert_eq!(*log.borrow(), vec![("home".to_string(), true)]);
    }

    #[test]
    fn test_emit_does_not_coalesce() {
        let observer = ManualObserver::new();
        let (log, callback) = recorder();
        observer.subscribe(&section("home"), 0.3, callback).unwrap();

        observer.emit("home", true);
        observer.emit("home", true);
        observer.emit("home", false);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let observer = ManualObserver::new();
        let (log, callback) = recorder();
        let handle = observer.subscribe(&section("home"), 0.3, callback).unwrap();
        assert_eq!(observer.active_subscriptions(), 1);

        observer.unsubscribe(handle);
        observer.unsubscribe(handle);
        observer.unsubscribe(SubscriptionHandle::new(999));

        assert_eq!(observer.active_subscriptions(), 0);
        assert_eq!(observer.emit("home", true), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_report_ratio_fires_on_threshold_crossing() {
        let observer = ManualObserver::new();
        let (log, callback) = recorder();
        observer.subscribe(&section("about"), 0.3, callback).unwrap();

        observer.report_ratio("about", 0.1); // initial report, below threshold
        observer.report_ratio("about", 0.2); // no crossing
        observer.report_ratio("about", 0.3); // crosses up
        observer.report_ratio("about", 0.9); // still above
        observer.report_ratio("about", 0.0); // crosses down

        assert_eq!(
            *log.borrow(),
            vec![
                ("about".to_string(), false),
                ("about".to_string(), true),
                ("about".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_zero_ratio_never_counts_as_visible() {
        let observer = ManualObserver::new();
        let (log, callback) = recorder();
        observer.subscribe(&section("home"), 0.0, callback).unwrap();

        observer.report_ratio("home", 0.0);
        observer.report_ratio("home", 0.01);
        assert_eq!(
            *log.borrow(),
            vec![("home".to_string(), false), ("home".to_string(), true)]
        );
    }

    #[test]
    fn test_rc_observer_forwards() {
        let observer = Rc::new(ManualObserver::new());
        let (_log, callback) = recorder();
        let handle = VisibilityObserver::subscribe(&observer, &section("home"), 0.5, callback)
            .unwrap();
        assert_eq!(observer.threshold_for("home"), Some(0.5));
        VisibilityObserver::unsubscribe(&observer, handle);
        assert!(!observer.is_observing("home"));
    }
}
