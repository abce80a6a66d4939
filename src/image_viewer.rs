use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, MouseEvent, Node, TouchEvent, WheelEvent};

use kaoyan_review_core::{DoubleTapDetector, Point, UiConfig, ViewerState};

use crate::input::{lifted_point, now_ms, point_in_rect, touch_points};
use crate::logging;

const CURSOR_GRAB: &str = "grab";
const CURSOR_GRABBING: &str = "grabbing";

/// Pan/zoom controller for one image inside its container. Owns the view
/// state; every listener goes through it.
pub(crate) struct ImageViewer {
    container: Element,
    image: HtmlElement,
    state: RefCell<ViewerState>,
    taps: RefCell<DoubleTapDetector>,
    tap_slop_px: f64,
    listeners: RefCell<Vec<EventListener>>,
}

impl ImageViewer {
    pub(crate) fn new(container: Element, image: HtmlElement, config: &UiConfig) -> Rc<Self> {
        Rc::new(Self {
            container,
            image,
            state: RefCell::new(ViewerState::new(config.viewer_limits())),
            taps: RefCell::new(DoubleTapDetector::new(
                config.double_tap_ms,
                config.double_tap_slop_px,
            )),
            tap_slop_px: config.double_tap_slop_px,
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Looks up the container and the image nested in it; if either is
    /// missing the page simply has no viewer.
    pub(crate) fn attach(document: &Document, config: &UiConfig) -> Option<Rc<Self>> {
        let Some(container) = document.get_element_by_id(&config.container_id) else {
            logging::debug("viewer", "no image container, viewer inactive");
            return None;
        };
        let image = document
            .get_element_by_id(&config.image_id)
            .filter(|image| {
                let node: &Node = image;
                container.contains(Some(node))
            })
            .and_then(|image| image.dyn_into::<HtmlElement>().ok());
        let Some(image) = image else {
            logging::debug("viewer", "no image inside container, viewer inactive");
            return None;
        };
        let viewer = Self::new(container, image, config);
        viewer.activate(document);
        Some(viewer)
    }

    pub(crate) fn activate(self: &Rc<Self>, document: &Document) {
        let style = self.image.style();
        let _ = style.set_property("transform-origin", "0 0");
        self.set_cursor(CURSOR_GRAB);
        self.apply_transform();
        self.install_listeners(document);
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn detach(&self) {
        self.listeners.borrow_mut().clear();
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn state(&self) -> ViewerState {
        self.state.borrow().clone()
    }

    fn apply_transform(&self) {
        let css = self.state.borrow().transform().to_css();
        let _ = self.image.style().set_property("transform", &css);
    }

    fn set_cursor(&self, cursor: &str) {
        let _ = self.image.style().set_property("cursor", cursor);
    }

    fn on_wheel(&self, event: &WheelEvent) {
        event.prevent_default();
        let Some((cursor_x, cursor_y)) =
            point_in_rect(event.client_x() as f64, event.client_y() as f64, &self.image)
        else {
            return;
        };
        let changed = self
            .state
            .borrow_mut()
            .zoom_at(event.delta_y(), cursor_x, cursor_y);
        if changed {
            self.apply_transform();
        }
    }

    fn on_mouse_down(&self, event: &MouseEvent) {
        if event.button() != 0 {
            return;
        }
        event.prevent_default();
        self.state
            .borrow_mut()
            .begin_drag(event.client_x() as f64, event.client_y() as f64);
        self.set_cursor(CURSOR_GRABBING);
    }

    fn on_mouse_move(&self, event: &MouseEvent) {
        let changed = self
            .state
            .borrow_mut()
            .drag_to(event.client_x() as f64, event.client_y() as f64);
        if changed {
            self.apply_transform();
        }
    }

    fn on_mouse_up(&self) {
        if self.state.borrow_mut().end_drag() {
            self.set_cursor(CURSOR_GRAB);
        }
    }

    fn on_touch_start(&self, event: &TouchEvent) {
        let points = touch_points(&event.touches());
        let pinching = points.len() >= 2;
        let started = self.state.borrow_mut().touch_start(&points);
        if pinching {
            self.taps.borrow_mut().cancel();
        }
        if started {
            event.prevent_default();
        }
    }

    fn on_touch_move(&self, event: &TouchEvent) {
        let points = touch_points(&event.touches());
        let changed = self.state.borrow_mut().touch_move(&points);
        if changed {
            self.apply_transform();
        }
        if changed || points.len() >= 2 {
            event.prevent_default();
        }
    }

    fn on_touch_end(&self, event: &TouchEvent) {
        let remaining = touch_points(&event.touches());
        let anchor = self.state.borrow().drag_anchor();
        self.state.borrow_mut().touch_end(&remaining);
        if !remaining.is_empty() {
            return;
        }
        let (Some(anchor), Some(lifted)) = (anchor, lifted_point(event)) else {
            return;
        };
        let start = Point::new(anchor.start_x, anchor.start_y);
        if start.distance_to(lifted) > self.tap_slop_px {
            self.taps.borrow_mut().cancel();
            return;
        }
        if self.taps.borrow_mut().tap(lifted, now_ms()) {
            self.reset();
            event.prevent_default();
        }
    }

    fn on_touch_cancel(&self) {
        self.state.borrow_mut().touch_end(&[]);
        self.taps.borrow_mut().cancel();
    }

    pub(crate) fn reset(&self) {
        self.state.borrow_mut().reset();
        self.set_cursor(CURSOR_GRAB);
        self.apply_transform();
    }

    fn install_listeners(self: &Rc<Self>, document: &Document) {
        let active = EventListenerOptions::enable_prevent_default();
        let mut listeners = Vec::new();

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "wheel",
            active,
            move |event: &Event| {
                if let Some(event) = event.dyn_ref::<WheelEvent>() {
                    view.on_wheel(event);
                }
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.image,
            "mousedown",
            active,
            move |event: &Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    view.on_mouse_down(event);
                }
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(document, "mousemove", move |event: &Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                view.on_mouse_move(event);
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(document, "mouseup", move |_event: &Event| {
            view.on_mouse_up();
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchstart",
            active,
            move |event: &Event| {
                if let Some(event) = event.dyn_ref::<TouchEvent>() {
                    view.on_touch_start(event);
                }
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchmove",
            active,
            move |event: &Event| {
                if let Some(event) = event.dyn_ref::<TouchEvent>() {
                    view.on_touch_move(event);
                }
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchend",
            active,
            move |event: &Event| {
                if let Some(event) = event.dyn_ref::<TouchEvent>() {
                    view.on_touch_end(event);
                }
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(
            &self.container,
            "touchcancel",
            move |_event: &Event| {
                view.on_touch_cancel();
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(
            &self.container,
            "dblclick",
            move |_event: &Event| {
                view.reset();
            },
        ));

        *self.listeners.borrow_mut() = listeners;
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::*;
    use web_sys::{MouseEvent, MouseEventInit, WheelEvent, WheelEventInit};

    use kaoyan_review_core::ViewTransform;

    use super::*;
    use crate::dom;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(html: &str) -> Document {
        let document = dom::document().expect("document available");
        let body = document.body().expect("body exists");
        body.set_inner_html(html);
        document
    }

    #[wasm_bindgen_test]
    fn missing_image_leaves_viewer_inactive() {
        let document = mount(r#"<div id="image-container"></div>"#);
        assert!(ImageViewer::attach(&document, &UiConfig::default()).is_none());
        let document = mount(r#"<img id="review-image">"#);
        assert!(ImageViewer::attach(&document, &UiConfig::default()).is_none());
    }

    #[wasm_bindgen_test]
    fn drag_wheel_and_double_click_drive_the_transform() {
        let document = mount(
            r#"<div id="image-container"><img id="review-image" style="display:block;width:200px;height:100px"></div>"#,
        );
        let viewer = ImageViewer::attach(&document, &UiConfig::default()).expect("viewer attaches");
        assert_eq!(
            viewer.image.style().get_property_value("transform").unwrap(),
            "translate(0px, 0px) scale(1)"
        );

        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_client_x(10);
        init.set_client_y(10);
        init.set_button(0);
        let down = MouseEvent::new_with_mouse_event_init_dict("mousedown", &init).unwrap();
        viewer.image.dispatch_event(&down).unwrap();
        assert!(viewer.state().is_dragging());

        init.set_client_x(40);
        init.set_client_y(-5);
        let moved = MouseEvent::new_with_mouse_event_init_dict("mousemove", &init).unwrap();
        document.dispatch_event(&moved).unwrap();
        let up = MouseEvent::new_with_mouse_event_init_dict("mouseup", &init).unwrap();
        document.dispatch_event(&up).unwrap();
        assert!(!viewer.state().is_dragging());
        assert_eq!(viewer.state().offset(), (30.0, -15.0));

        let wheel_init = WheelEventInit::new();
        wheel_init.set_bubbles(true);
        wheel_init.set_cancelable(true);
        wheel_init.set_delta_y(-100.0);
        let wheel = WheelEvent::new_with_event_init_dict("wheel", &wheel_init).unwrap();
        viewer.container.dispatch_event(&wheel).unwrap();
        assert!(wheel.default_prevented());
        assert!((viewer.state().scale() - 1.1).abs() < 1e-9);

        let dbl = MouseEvent::new_with_mouse_event_init_dict("dblclick", &init).unwrap();
        viewer.container.dispatch_event(&dbl).unwrap();
        assert_eq!(viewer.state().transform(), ViewTransform::IDENTITY);
        viewer.detach();
    }
}
