use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use kaoyan_review_core::{LiftTarget, SubmitControl};

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("missing window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))
}

pub(crate) fn js_err(error: JsValue) -> String {
    if let Some(value) = error.as_string() {
        return value;
    }
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    if let Ok(json) = js_sys::JSON::stringify(&error) {
        if let Some(value) = json.as_string() {
            return value;
        }
    }
    "js error".to_string()
}

/// Matches of `selector` in document order. An invalid selector yields an
/// empty list.
pub(crate) fn query_all_document<T: JsCast>(document: &Document, selector: &str) -> Vec<T> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

pub(crate) struct Styled(pub HtmlElement);

impl LiftTarget for Styled {
    fn set_transform(&self, transform: &str) {
        let _ = self.0.style().set_property("transform", transform);
    }
}

pub(crate) enum SubmitElement {
    Button(HtmlButtonElement),
    Input(HtmlInputElement),
}

impl SubmitElement {
    /// Only controls whose effective type is `submit`; a `<button>` without
    /// a `type` attribute counts.
    pub(crate) fn from_element(element: Element) -> Option<Self> {
        let element = match element.dyn_into::<HtmlButtonElement>() {
            Ok(button) if button.type_() == "submit" => {
                return Some(SubmitElement::Button(button))
            }
            Ok(_) => return None,
            Err(element) => element,
        };
        element
            .dyn_into::<HtmlInputElement>()
            .ok()
            .filter(|input| input.type_() == "submit")
            .map(SubmitElement::Input)
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn is_disabled(&self) -> bool {
        match self {
            SubmitElement::Button(button) => button.disabled(),
            SubmitElement::Input(input) => input.disabled(),
        }
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn label(&self) -> String {
        match self {
            SubmitElement::Button(button) => button.text_content().unwrap_or_default(),
            SubmitElement::Input(input) => input.value(),
        }
    }
}

impl SubmitControl for SubmitElement {
    fn set_disabled(&self, disabled: bool) {
        match self {
            SubmitElement::Button(button) => button.set_disabled(disabled),
            SubmitElement::Input(input) => input.set_disabled(disabled),
        }
    }

    fn set_label(&self, label: &str) {
        match self {
            SubmitElement::Button(button) => button.set_text_content(Some(label)),
            SubmitElement::Input(input) => input.set_value(label),
        }
    }
}
