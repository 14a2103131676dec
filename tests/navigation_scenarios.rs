//! End-to-end scenarios: navigation machine + modal driven through the
//! public API with the in-memory observer.

use std::rc::Rc;

use portfolio_nav_core::{
    DismissReason, Lifecycle, ManualObserver, ModalController, ModalState, NavigationConfig,
    NavigationMachine, RecordingNotifier, RecordingScroller, DEFAULT_SECTIONS,
};

fn mounted() -> (
    NavigationMachine<Rc<ManualObserver>, RecordingScroller>,
    Rc<ManualObserver>,
    RecordingScroller,
) {
    let observer = Rc::new(ManualObserver::new());
    let scroller = RecordingScroller::new();
    let mut nav = NavigationMachine::new(
        NavigationConfig::default(),
        Rc::clone(&observer),
        scroller.clone(),
    )
    .expect("default config is valid");
    assert_eq!(nav.activate(), DEFAULT_SECTIONS.len());
    (nav, observer, scroller)
}

#[test]
fn scroll_from_home_into_about() {
    let (nav, observer, _) = mounted();

    observer.emit("home", true);
    observer.emit("about", true);
    observer.emit("home", false);

    assert_eq!(nav.active_section(), "about");
    let map: Vec<(String, bool)> = nav
        .visibility()
        .iter()
        .map(|(id, visible)| (id.to_string(), visible))
        .collect();
    assert_eq!(
        map,
        vec![
            ("home".to_string(), false),
            ("about".to_string(), true),
            ("projects".to_string(), false),
            ("contact".to_string(), false),
        ]
    );
}

#[test]
fn nav_click_waits_for_visibility_event() {
    let (nav, observer, scroller) = mounted();

    nav.request_navigate("contact");
    assert_eq!(nav.active_section(), "home");
    assert_eq!(scroller.requests().len(), 1);

    observer.emit("contact", true);
    assert_eq!(nav.active_section(), "contact");
}

#[test]
fn late_event_after_unmount_changes_nothing() {
    let (mut nav, observer, _) = mounted();
    let before = nav.snapshot();

    nav.deactivate();
    assert_eq!(observer.active_subscriptions(), 0);

    assert_eq!(observer.emit("about", true), 0);
    assert_eq!(nav.lifecycle(), Lifecycle::Released);
    assert_eq!(nav.active_section(), before.active);
    assert_eq!(nav.visibility().visible_sections().count(), 0);
}

#[test]
fn one_close_after_two_opens() {
    let mut modal = ModalController::new();
    modal.open_protected();
    modal.open_protected();
    modal.dismiss(DismissReason::CloseButton);
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn modal_and_navigation_are_independent() {
    let (nav, observer, _) = mounted();
    let notifier = RecordingNotifier::new();
    let mut modal = ModalController::new();

    modal.open_protected();
    observer.emit("projects", true);
    nav.request_navigate("about");
    modal.acknowledge_unavailable(&notifier);

    assert!(modal.is_open());
    assert_eq!(nav.active_section(), "projects");
    assert_eq!(notifier.messages().len(), 1);

    modal.dismiss(DismissReason::Acknowledged);
    assert_eq!(nav.active_section(), "projects");
}

#[test]
fn hero_buttons_navigate_like_nav_items() {
    let (nav, _, scroller) = mounted();

    nav.request_navigate("projects"); // "View My Work"
    nav.request_navigate("contact"); // "Get In Touch"

    let targets: Vec<String> = scroller.requests().iter().map(|s| s.to_string()).collect();
    assert_eq!(targets, ["projects", "contact"]);
}

/// Replays a long pseudo-random event stream and checks the map and the
/// active section against a straightforward model.
#[test]
fn random_event_stream_matches_model() {
    let (nav, observer, _) = mounted();

    let mut expected_visible = [false; 4];
    let mut expected_active = "home";
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;

    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;

        let index = (seed % 4) as usize;
        let visible = (seed >> 8) & 1 == 1;
        let id = DEFAULT_SECTIONS[index];

        observer.emit(id, visible);
        expected_visible[index] = visible;
        if visible {
            expected_active = id;
        }

        assert_eq!(nav.active_section(), expected_active);
        assert!(nav.registry().contains(nav.active_section().as_str()));
    }

    for (index, id) in DEFAULT_SECTIONS.iter().enumerate() {
        assert_eq!(nav.is_visible(id), expected_visible[index], "section {}", id);
    }
}
