use std::cell::Cell;

thread_local! {
    static DEBUG_ENABLED: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn set_debug(enabled: bool) {
    DEBUG_ENABLED.with(|flag| flag.set(enabled));
}

pub(crate) fn debug_enabled() -> bool {
    DEBUG_ENABLED.with(Cell::get)
}

pub(crate) fn debug(component: &str, message: &str) {
    if !debug_enabled() {
        return;
    }
    gloo::console::log!(format!("[{component}]"), message);
}

pub(crate) fn warn(component: &str, message: &str) {
    gloo::console::warn!(format!("[{component}]"), message);
}
