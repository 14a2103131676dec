//! Browser bindings - DOM-backed observer, scroller and notifier, plus the
//! `PortfolioPage` object exported to JavaScript.
//!
//! # Usage in JavaScript
//!
//! ```javascript
//! import init, { PortfolioPage, DismissReason } from 'portfolio-nav-core';
//!
//! await init();
//!
//! const page = new PortfolioPage();          // or new PortfolioPage('{"threshold":0.5}')
//! page.on_change(() => render(JSON.parse(page.snapshot())));
//! page.mount();                              // observe every <section id=...>
//!
//! navButton.onclick = () => page.navigate('projects');
//! ndaButton.onclick = () => page.open_protected_dialog();
//! closeButton.onclick = () => page.dismiss_dialog(DismissReason.CloseButton);
//!
//! // On teardown
//! page.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IntersectionObserver, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions};

use crate::catalog::Catalog;
use crate::config::NavigationConfig;
use crate::error::{PortfolioError, Result};
use crate::modal::{DismissReason, ModalController, ModalState, Notifier};
use crate::navigation::{NavigationMachine, NavigationSnapshot};
use crate::observer::{SubscriptionHandle, VisibilityCallback, VisibilityObserver};
use crate::registry::SectionId;
use crate::scroll::ScrollCommander;

impl From<PortfolioError> for JsValue {
    fn from(err: PortfolioError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn platform_error(value: JsValue) -> PortfolioError {
    PortfolioError::Platform(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|window| window.document())
}

// =============================================================================
// DomVisibilityObserver
// =============================================================================

type EntriesClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct DomSubscription {
    observer: IntersectionObserver,
    _closure: EntriesClosure,
}

/// Forward each entry's `isIntersecting` flag, in delivery order.
///
/// The threshold only decides when the browser fires; the ratio is not
/// re-checked here, so sections taller than the viewport can still report
/// visible. Entries without a boolean `isIntersecting` are skipped.
fn deliver_entries(entries: &js_sys::Array, section: &SectionId, callback: &VisibilityCallback) {
    for entry in entries.iter() {
        let intersecting = js_sys::Reflect::get(&entry, &JsValue::from_str("isIntersecting"))
            .ok()
            .and_then(|value| value.as_bool());
        match intersecting {
            Some(intersecting) => callback(section, intersecting),
            None => tracing::debug!(section = %section, "Skipping malformed intersection entry"),
        }
    }
}

/// [`VisibilityObserver`] backed by one `IntersectionObserver` per section.
#[derive(Default)]
pub struct DomVisibilityObserver {
    next_id: Cell<u64>,
    live: RefCell<HashMap<u64, DomSubscription>>,
    // Closures may be mid-call when unsubscribed; dropped with the observer
    retired: RefCell<Vec<DomSubscription>>,
}

impl DomVisibilityObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

impl VisibilityObserver for DomVisibilityObserver {
    fn subscribe(
        &self,
        target: &SectionId,
        threshold: f64,
        callback: VisibilityCallback,
    ) -> Result<SubscriptionHandle> {
        let element = document()
            .and_then(|doc| doc.get_element_by_id(target.as_str()))
            .ok_or_else(|| PortfolioError::Platform(format!("No element with id '{}'", target)))?;

        let section = target.clone();
        let closure: EntriesClosure = Closure::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                deliver_entries(&entries, &section, &callback);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(platform_error)?;
        observer.observe(&element);

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert(
            id,
            DomSubscription {
                observer,
                _closure: closure,
            },
        );

        tracing::debug!(section = %target, threshold, "Observing section");
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let removed = self.live.borrow_mut().remove(&handle.raw());
        if let Some(subscription) = removed {
            subscription.observer.disconnect();
            self.retired.borrow_mut().push(subscription);
        }
    }
}

// =============================================================================
// DomScroller / AlertNotifier
// =============================================================================

/// Smooth `scrollIntoView` on the element whose id is the section id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomScroller;

impl ScrollCommander for DomScroller {
    fn scroll_to(&self, section: &SectionId) {
        let Some(element) = document().and_then(|doc| doc.get_element_by_id(section.as_str()))
        else {
            tracing::debug!(section = %section, "Scroll target missing");
            return;
        };

        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

/// `window.alert` notifier
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&self, message: &str) {
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|window| window.alert_with_message(message));
        if let Err(err) = result {
            tracing::warn!(error = ?err, "Alert failed");
        }
    }
}

// =============================================================================
// PortfolioPage (exported to JS)
// =============================================================================

#[derive(Serialize)]
struct PageSnapshot {
    #[serde(flatten)]
    navigation: NavigationSnapshot,
    modal: ModalState,
}

type RenderHooks = Rc<RefCell<Vec<js_sys::Function>>>;

fn run_hooks(hooks: &RenderHooks) {
    let pending: Vec<js_sys::Function> = hooks.borrow().clone();
    for hook in pending {
        if let Err(err) = hook.call0(&JsValue::NULL) {
            tracing::warn!(error = ?err, "Change hook threw");
        }
    }
}

/// The page's interactive chrome: navigation state plus the modal.
#[wasm_bindgen]
pub struct PortfolioPage {
    nav: NavigationMachine<Rc<DomVisibilityObserver>, DomScroller>,
    modal: ModalController,
    notifier: AlertNotifier,
    hooks: RenderHooks,
    modal_revision: u64,
}

#[wasm_bindgen]
impl PortfolioPage {
    /// Create an unmounted page.
    ///
    /// # Arguments
    /// * `config_json` - Optional navigation config, e.g. `{"threshold":0.3}`
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<PortfolioPage, JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        crate::set_panic_hook();

        let config = match config_json {
            Some(json) => NavigationConfig::from_json(&json)?,
            None => NavigationConfig::default(),
        };
        let nav = NavigationMachine::new(config, Rc::new(DomVisibilityObserver::new()), DomScroller)?;

        let hooks: RenderHooks = Rc::new(RefCell::new(Vec::new()));
        let hooks_for_nav = Rc::clone(&hooks);
        nav.on_change(move || run_hooks(&hooks_for_nav));

        Ok(PortfolioPage {
            nav,
            modal: ModalController::new(),
            notifier: AlertNotifier,
            hooks,
            modal_revision: 0,
        })
    }

    /// Start observing every section. Returns how many were found.
    pub fn mount(&mut self) -> u32 {
        self.nav.activate() as u32
    }

    /// Stop observing. No state changes after this.
    pub fn unmount(&mut self) {
        self.nav.deactivate();
        self.hooks.borrow_mut().clear();
    }

    /// Smooth-scroll to a section and close the mobile menu
    pub fn navigate(&self, section: &str) {
        self.nav.request_navigate(section);
    }

    pub fn toggle_menu(&self) {
        self.nav.toggle_menu();
    }

    pub fn close_menu(&self) {
        self.nav.close_menu();
    }

    pub fn open_protected_dialog(&mut self) {
        if self.modal.open_protected() {
            self.modal_revision += 1;
            run_hooks(&self.hooks);
        }
    }

    pub fn dismiss_dialog(&mut self, reason: DismissReason) {
        if self.modal.dismiss(reason) {
            self.modal_revision += 1;
            run_hooks(&self.hooks);
        }
    }

    /// Show the "no live demo yet" alert
    pub fn acknowledge_unavailable(&self) {
        self.modal.acknowledge_unavailable(&self.notifier);
    }

    /// Call `callback` after every state change
    pub fn on_change(&self, callback: js_sys::Function) {
        self.hooks.borrow_mut().push(callback);
    }

    #[wasm_bindgen(getter)]
    pub fn active_section(&self) -> String {
        self.nav.active_section().to_string()
    }

    pub fn is_visible(&self, section: &str) -> bool {
        self.nav.is_visible(section)
    }

    #[wasm_bindgen(getter)]
    pub fn is_menu_open(&self) -> bool {
        self.nav.is_menu_open()
    }

    #[wasm_bindgen(getter)]
    pub fn is_dialog_open(&self) -> bool {
        self.modal.is_open()
    }

    /// Changes so far, navigation and modal combined
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> u64 {
        self.nav.revision() + self.modal_revision
    }

    #[wasm_bindgen(getter)]
    pub fn subscription_count(&self) -> u32 {
        self.nav.subscription_count() as u32
    }

    /// Full render state as JSON
    pub fn snapshot(&self) -> std::result::Result<String, JsValue> {
        let snapshot = PageSnapshot {
            navigation: self.nav.snapshot(),
            modal: self.modal.state(),
        };
        serde_json::to_string(&snapshot).map_err(|e| PortfolioError::from(e).into())
    }
}

/// Resolve project cards (with Code/Live affordances) from catalog JSON
#[wasm_bindgen]
pub fn project_cards(catalog_json: &str) -> std::result::Result<String, JsValue> {
    let catalog = Catalog::from_json(catalog_json)?;
    Ok(catalog.cards_json()?)
}

// =============================================================================
// WASM-specific Tests
// =============================================================================

#[cfg(test)]
mod wasm_tests {
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    use super::*;
    use crate::registry::DEFAULT_SECTIONS;

    fn install_sections() {
        let doc = document().unwrap();
        let root = doc.document_element().unwrap();
        for id in DEFAULT_SECTIONS {
            if doc.get_element_by_id(id).is_none() {
                let section = doc.create_element("section").unwrap();
                section.set_id(id);
                root.append_child(&section).unwrap();
            }
        }
    }

    #[wasm_bindgen_test]
    fn test_mount_and_unmount() {
        install_sections();
        let mut page = PortfolioPage::new(None).unwrap();

        assert_eq!(page.mount(), 4);
        assert_eq!(page.subscription_count(), 4);
        assert_eq!(page.active_section(), "home");

        page.unmount();
        assert_eq!(page.subscription_count(), 0);
    }

    #[wasm_bindgen_test]
    fn test_missing_sections_are_skipped() {
        install_sections();
        let mut page =
            PortfolioPage::new(Some(r#"{"sections":["home","gallery"]}"#.into())).unwrap();
        assert_eq!(page.mount(), 1);
    }

    #[wasm_bindgen_test]
    fn test_navigate_does_not_change_active() {
        install_sections();
        let mut page = PortfolioPage::new(None).unwrap();
        page.mount();
        page.toggle_menu();

        page.navigate("contact");
        page.navigate("missing");

        assert_eq!(page.active_section(), "home");
        assert!(!page.is_menu_open());
    }

    #[wasm_bindgen_test]
    fn test_dialog_through_page() {
        let mut page = PortfolioPage::new(None).unwrap();
        page.open_protected_dialog();
        page.open_protected_dialog();
        assert!(page.is_dialog_open());

        page.dismiss_dialog(DismissReason::Backdrop);
        assert!(!page.is_dialog_open());

        let snapshot: serde_json::Value =
            serde_json::from_str(&page.snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["modal"], "closed");
        assert_eq!(snapshot["active"], "home");
    }

    fn entry(is_intersecting: bool, ratio: f64) -> JsValue {
        let entry = js_sys::Object::new();
        js_sys::Reflect::set(&entry, &"isIntersecting".into(), &is_intersecting.into()).unwrap();
        js_sys::Reflect::set(&entry, &"intersectionRatio".into(), &ratio.into()).unwrap();
        entry.into()
    }

    #[wasm_bindgen_test]
    fn test_tall_section_below_ratio_still_reports_visible() {
        let registry = crate::registry::SectionRegistry::default();
        let projects = registry.resolve("projects").unwrap().clone();
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback: VisibilityCallback =
            Rc::new(move |_section: &SectionId, visible: bool| sink.borrow_mut().push(visible));

        // A 2400px section in a 700px viewport peaks at a ratio of about 0.29
        let entries = js_sys::Array::new();
        entries.push(&entry(true, 0.29));
        entries.push(&JsValue::from_str("not an entry"));
        entries.push(&entry(false, 0.0));
        deliver_entries(&entries, &projects, &callback);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_is_js_error() {
        assert!(PortfolioPage::new(Some(r#"{"threshold":2}"#.into())).is_err());
    }
}
