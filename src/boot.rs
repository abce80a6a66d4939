use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use web_sys::Document;

use kaoyan_review_core::UiConfig;

use crate::dom;
use crate::form_guard::FormGuard;
use crate::hover::HoverEffect;
use crate::image_viewer::ImageViewer;
use crate::logging;
use crate::page_config;

struct PageWiring {
    config: UiConfig,
    _hover: HoverEffect,
    _forms: FormGuard,
    _viewer: Option<Rc<ImageViewer>>,
}

thread_local! {
    static PAGE: RefCell<Option<PageWiring>> = const { RefCell::new(None) };
    static ATTACHED: Cell<bool> = const { Cell::new(false) };
}

/// Wires the page once its structure is parsed.
pub(crate) fn run() {
    let Ok(document) = dom::document() else {
        return;
    };
    if document.ready_state() == "loading" {
        let target = document.clone();
        EventListener::once(&target, "DOMContentLoaded", move |_event| {
            attach(&document);
        })
        .forget();
    } else {
        attach(&document);
    }
}

fn attach(document: &Document) {
    if ATTACHED.with(|flag| flag.replace(true)) {
        return;
    }
    let config = page_config::load_ui_config(document);
    logging::set_debug(config.debug);

    let hover = HoverEffect::attach(document, &config.hover_selector, config.hover_lift_px);
    let forms = FormGuard::attach(document, &config.processing_label);
    let viewer = ImageViewer::attach(document, &config);
    logging::debug(
        "boot",
        &format!(
            "hover buttons: {}, forms: {}, viewer: {}",
            hover.button_count(),
            forms.form_count(),
            if viewer.is_some() { "active" } else { "inactive" }
        ),
    );

    PAGE.with(|slot| {
        *slot.borrow_mut() = Some(PageWiring {
            config,
            _hover: hover,
            _forms: forms,
            _viewer: viewer,
        });
    });
}

pub(crate) fn api_base() -> String {
    PAGE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|page| page.config.api_base.clone())
            .unwrap_or_default()
    })
}
