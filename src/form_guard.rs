use gloo::events::EventListener;
use web_sys::{Document, Event, HtmlFormElement};

use kaoyan_review_core::guard_submission;

use crate::dom::{self, SubmitElement};

/// Disables and relabels a form's submit controls as soon as it submits.
/// The controls stay disabled; the page is expected to navigate away.
pub(crate) struct FormGuard {
    listeners: Vec<EventListener>,
}

impl FormGuard {
    pub(crate) fn attach(document: &Document, processing_label: &str) -> Self {
        let listeners = dom::query_all_document::<HtmlFormElement>(document, "form")
            .into_iter()
            .map(|form| {
                let label = processing_label.to_string();
                let submitted = form.clone();
                EventListener::new(&form, "submit", move |_event: &Event| {
                    let controls = submit_controls(&submitted);
                    guard_submission(&controls, &label);
                })
            })
            .collect();
        Self { listeners }
    }

    pub(crate) fn form_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Submit controls owned by `form`, including ones outside it that point at
/// it with a `form` attribute.
pub(crate) fn submit_controls(form: &HtmlFormElement) -> Vec<SubmitElement> {
    let elements = form.elements();
    (0..elements.length())
        .filter_map(|idx| elements.item(idx))
        .filter_map(SubmitElement::from_element)
        .collect()
}
