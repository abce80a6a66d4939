pub mod api;
pub mod config;
pub mod controls;
pub mod review;
pub mod viewer;

pub use api::{
    api_request, execute, interpret_response, merge_headers, prepare, ApiError, ApiResult,
    PreparedRequest, RawResponse, RequestOptions, Transport,
};
pub use config::{ConfigError, UiConfig, CONFIG_ELEMENT_ID};
pub use controls::{guard_submission, HoverLift, LiftTarget, SubmitControl};
pub use review::{Familiarity, ReviewClient, ReviewEndpoints, Statistics};
pub use viewer::{
    DoubleTapDetector, DragAnchor, PinchBaseline, Point, ViewTransform, ViewerLimits, ViewerState,
};
