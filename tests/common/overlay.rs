use std::cell::RefCell;
use std::rc::Rc;

use page_autofill::collect::overlay::OverlayNotifier;
use page_autofill::collect::snapshot_model::{FieldDescriptor, PageSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Stale,
    ClearUserFilled,
    Viewable { opid: String, url: String },
}

/// Overlay that records every notification. Clones share one log, so a
/// test keeps a handle while the collector owns the boxed copy.
#[derive(Debug, Clone, Default)]
pub struct RecordingOverlay {
    events: Rc<RefCell<Vec<OverlayEvent>>>,
}

impl RecordingOverlay {
    pub fn events(&self) -> Vec<OverlayEvent> {
        self.events.borrow().clone()
    }

    pub fn viewable_opids(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                OverlayEvent::Viewable { opid, .. } => Some(opid.clone()),
                _ => None,
            })
            .collect()
    }
}

impl OverlayNotifier for RecordingOverlay {
    fn page_details_stale(&mut self) {
        self.events.borrow_mut().push(OverlayEvent::Stale);
    }

    fn clear_user_filled_fields(&mut self) {
        self.events.borrow_mut().push(OverlayEvent::ClearUserFilled);
    }

    fn field_became_viewable(&mut self, field: &FieldDescriptor, page: &PageSnapshot) {
        self.events.borrow_mut().push(OverlayEvent::Viewable {
            opid: field.opid.clone(),
            url: page.url.clone(),
        });
    }
}
