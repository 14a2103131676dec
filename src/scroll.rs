//! Scroll Commander - programmatic smooth scrolling to a section anchor
//!
//! Fire-and-forget: there is no completion signal. Arrival is observed
//! indirectly, through the next visibility event for the target.

use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::SectionId;

pub trait ScrollCommander {
    /// Request an animated scroll to the anchor for `section`.
    ///
    /// A missing anchor is a silent no-op.
    fn scroll_to(&self, section: &SectionId);
}

impl<T: ScrollCommander + ?Sized> ScrollCommander for Rc<T> {
    fn scroll_to(&self, section: &SectionId) {
        (**self).scroll_to(section)
    }
}

impl<T: ScrollCommander + ?Sized> ScrollCommander for Box<T> {
    fn scroll_to(&self, section: &SectionId) {
        (**self).scroll_to(section)
    }
}

/// Commander that only records the requested targets.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the state machine.
#[derive(Debug, Clone, Default)]
pub struct RecordingScroller {
    requests: Rc<RefCell<Vec<SectionId>>>,
}

impl RecordingScroller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets requested so far, oldest first
    pub fn requests(&self) -> Vec<SectionId> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<SectionId> {
        self.requests.borrow().last().cloned()
    }
}

impl ScrollCommander for RecordingScroller {
    fn scroll_to(&self, section: &SectionId) {
        tracing::debug!(section = %section, "Recorded scroll request");
        self.requests.borrow_mut().push(section.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionRegistry;

    #[test]
    fn test_recording_scroller_shares_log() {
        let registry = SectionRegistry::default();
        let scroller = RecordingScroller::new();
        let handed_out: Box<dyn ScrollCommander> = Box::new(scroller.clone());

        let contact = registry.resolve("contact").unwrap();
        handed_out.scroll_to(contact);
        handed_out.scroll_to(contact);

        assert_eq!(scroller.requests().len(), 2);
        assert_eq!(scroller.last_request().as_ref(), Some(contact));
    }
}
