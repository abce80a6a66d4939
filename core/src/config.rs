use serde::Deserialize;

use crate::viewer::{
    ViewerLimits, DEFAULT_DOUBLE_TAP_MS, DEFAULT_DOUBLE_TAP_SLOP_PX, DEFAULT_MAX_SCALE,
    DEFAULT_MIN_SCALE, DEFAULT_ZOOM_STEP,
};

pub const CONFIG_ELEMENT_ID: &str = "kaoyan-config";
pub const DEFAULT_HOVER_SELECTOR: &str = ".subject-btn, .familiarity-btn";
pub const DEFAULT_HOVER_LIFT_PX: f64 = 2.0;
pub const DEFAULT_PROCESSING_LABEL: &str = "处理中...";
pub const DEFAULT_CONTAINER_ID: &str = "image-container";
pub const DEFAULT_IMAGE_ID: &str = "review-image";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub hover_selector: String,
    pub hover_lift_px: f64,
    pub processing_label: String,
    pub container_id: String,
    pub image_id: String,
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub double_tap_ms: f64,
    pub double_tap_slop_px: f64,
    pub api_base: String,
    pub debug: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            hover_selector: DEFAULT_HOVER_SELECTOR.to_string(),
            hover_lift_px: DEFAULT_HOVER_LIFT_PX,
            processing_label: DEFAULT_PROCESSING_LABEL.to_string(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            image_id: DEFAULT_IMAGE_ID.to_string(),
            zoom_step: DEFAULT_ZOOM_STEP,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            double_tap_ms: DEFAULT_DOUBLE_TAP_MS,
            double_tap_slop_px: DEFAULT_DOUBLE_TAP_SLOP_PX,
            api_base: String::new(),
            debug: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid ui config: {0}")]
pub struct ConfigError(#[from] serde_json::Error);

impl UiConfig {
    /// Parses the page's inline config block. Blank text yields defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn viewer_limits(&self) -> ViewerLimits {
        ViewerLimits::normalized(self.min_scale, self.max_scale, self.zoom_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_is_default() {
        assert_eq!(UiConfig::from_json("  \n").unwrap(), UiConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config =
            UiConfig::from_json(r#"{"processing_label": "Saving", "max_scale": 8}"#).unwrap();
        assert_eq!(config.processing_label, "Saving");
        assert_eq!(config.max_scale, 8.0);
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
        assert_eq!(config.container_id, DEFAULT_CONTAINER_ID);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = UiConfig::from_json(r#"{"zoom": 2}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid ui config"));
    }

    #[test]
    fn limits_come_from_config() {
        let config = UiConfig {
            min_scale: 3.0,
            max_scale: 1.0,
            ..UiConfig::default()
        };
        let limits = config.viewer_limits();
        assert_eq!((limits.min_scale, limits.max_scale), (1.0, 3.0));
    }
}
