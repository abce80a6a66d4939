use web_sys::{DomRect, Element, HtmlElement, Touch, TouchEvent, TouchList};

use kaoyan_review_core::Point;

pub(crate) trait HasClientRect {
    fn client_rect(&self) -> DomRect;
}

impl HasClientRect for Element {
    fn client_rect(&self) -> DomRect {
        self.get_bounding_client_rect()
    }
}

impl HasClientRect for HtmlElement {
    fn client_rect(&self) -> DomRect {
        self.get_bounding_client_rect()
    }
}

/// Client coordinates relative to the element's current (transformed)
/// bounding box. `None` while the element has no layout size.
pub(crate) fn point_in_rect(
    client_x: f64,
    client_y: f64,
    element: &impl HasClientRect,
) -> Option<(f64, f64)> {
    let rect = element.client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    Some((client_x - rect.left(), client_y - rect.top()))
}

pub(crate) fn touch_point(touch: &Touch) -> Point {
    Point::new(touch.client_x() as f64, touch.client_y() as f64)
}

pub(crate) fn touch_points(list: &TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .map(|touch| touch_point(&touch))
        .collect()
}

/// Point of the first finger that was lifted in this event.
pub(crate) fn lifted_point(event: &TouchEvent) -> Option<Point> {
    event.changed_touches().item(0).map(|touch| touch_point(&touch))
}

pub(crate) fn now_ms() -> f64 {
    js_sys::Date::now()
}
