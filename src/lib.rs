//! Portfolio Nav Core - Viewport-Synchronized Navigation
//!
//! Interactive chrome for a single-page portfolio: which section is on
//! screen, which nav item is highlighted, which sections have played their
//! entrance animation, and whether the protected-project dialog is showing.
//! Compiled to WebAssembly for the page, and natively for tests.
//!
//! # Components
//! - [`registry`] - fixed, ordered section ids
//! - [`observer`] - viewport visibility adapter contract + in-memory driver
//! - [`navigation`] - the state machine (visibility map, active section, menu)
//! - [`scroll`] - smooth-scroll effector
//! - [`modal`] - protected-project dialog and the "no live demo" notice
//! - [`catalog`] - project/skill records and their link affordances
//! - `web` (wasm32 only) - DOM implementations and the `PortfolioPage` export
//!
//! # Build
//!
//! ```bash
//! wasm-pack build --target web --out-dir pkg
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod modal;
pub mod navigation;
pub mod observer;
pub mod registry;
pub mod scroll;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use catalog::{AccessPolicy, Affordance, Catalog, ProjectCard, ProjectEntry, SkillCategory};
pub use config::{NavigationConfig, DEFAULT_THRESHOLD};
pub use error::{PortfolioError, Result};
pub use modal::{DismissReason, ModalController, ModalState, Notifier, RecordingNotifier};
pub use navigation::{
    entrance_class, Lifecycle, NavigationMachine, NavigationSnapshot, SectionView, VisibilityMap,
};
pub use observer::{ManualObserver, SubscriptionHandle, VisibilityCallback, VisibilityObserver};
pub use registry::{SectionId, SectionRegistry, DEFAULT_SECTIONS};
pub use scroll::{RecordingScroller, ScrollCommander};

#[cfg(target_arch = "wasm32")]
pub use web::{AlertNotifier, DomScroller, DomVisibilityObserver, PortfolioPage};

// Initialize panic hook for better error messages in browser console
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Get the WASM module version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
