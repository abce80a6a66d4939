use web_sys::Document;

use kaoyan_review_core::{UiConfig, CONFIG_ELEMENT_ID};

use crate::logging;

/// Reads the optional inline `<script type="application/json">` config
/// block. Anything unreadable falls back to defaults.
pub(crate) fn load_ui_config(document: &Document) -> UiConfig {
    let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return UiConfig::default();
    };
    let raw = element.text_content().unwrap_or_default();
    match UiConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            logging::warn("config", &err.to_string());
            UiConfig::default()
        }
    }
}
