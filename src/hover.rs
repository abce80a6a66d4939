use gloo::events::EventListener;
use web_sys::{Document, Event, HtmlElement};

use kaoyan_review_core::HoverLift;

use crate::dom::{self, Styled};

/// Lifts each subject button while the pointer is over it.
pub(crate) struct HoverEffect {
    listeners: Vec<EventListener>,
}

impl HoverEffect {
    pub(crate) fn attach(document: &Document, selector: &str, lift_px: f64) -> Self {
        let lift = HoverLift::new(lift_px);
        let mut listeners = Vec::new();
        for button in dom::query_all_document::<HtmlElement>(document, selector) {
            let raised = Styled(button.clone());
            listeners.push(EventListener::new(&button, "mouseenter", move |_event: &Event| {
                lift.enter(&raised);
            }));
            let lowered = Styled(button.clone());
            listeners.push(EventListener::new(&button, "mouseleave", move |_event: &Event| {
                lift.leave(&lowered);
            }));
        }
        Self { listeners }
    }

    pub(crate) fn button_count(&self) -> usize {
        self.listeners.len() / 2
    }
}
