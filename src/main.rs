mod boot;
mod dom;
mod fetch;
mod form_guard;
mod hover;
mod image_viewer;
mod input;
mod logging;
mod page_config;
mod review_api;

fn main() {
    boot::run();
}
