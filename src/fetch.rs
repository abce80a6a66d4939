use futures_util::future::LocalBoxFuture;
use js_sys::{Array, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{Headers, Request, RequestInit, Response};

use kaoyan_review_core::{
    api_request as run_request, ApiError, ApiResult, PreparedRequest, RawResponse, RequestOptions,
    Transport,
};

use crate::dom::js_err;
use crate::logging;

/// `window.fetch` as a [`Transport`]. `init` carries caller-supplied
/// `RequestInit` fields (`credentials`, `mode`, `cache`, ...) onto every
/// request; method, headers and body always come from the prepared request.
#[derive(Clone, Default)]
pub(crate) struct FetchTransport {
    init: Option<Object>,
}

impl FetchTransport {
    pub(crate) fn with_init(init: Object) -> Self {
        Self { init: Some(init) }
    }
}

impl Transport for FetchTransport {
    fn send(&self, request: PreparedRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>> {
        Box::pin(async move {
            fetch(self.init.as_ref(), &request)
                .await
                .map_err(|err| ApiError::Transport(js_err(err)))
        })
    }
}

const OWNED_FIELDS: [&str; 3] = ["method", "headers", "body"];

pub(crate) fn request_init(
    base: Option<&Object>,
    request: &PreparedRequest,
) -> Result<RequestInit, JsValue> {
    let init: RequestInit = match base {
        Some(base) => {
            let copy = Object::assign(&Object::new(), base);
            for field in OWNED_FIELDS {
                Reflect::delete_property(&copy, &JsValue::from_str(field))?;
            }
            copy.unchecked_into()
        }
        None => RequestInit::new(),
    };
    let headers = Headers::new()?;
    for (name, value) in &request.headers {
        headers.set(name, value)?;
    }
    init.set_method(&request.method);
    init.set_headers(&headers);
    if let Some(body) = request.body.as_deref() {
        init.set_body(&JsValue::from_str(body));
    }
    Ok(init)
}

async fn fetch(base: Option<&Object>, request: &PreparedRequest) -> Result<RawResponse, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let init = request_init(base, request)?;
    let js_request = Request::new_with_str_and_init(&request.url, &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&js_request))
        .await?
        .dyn_into()?;
    let status = response.status();
    let body = JsFuture::from(response.text()?).await?;
    Ok(RawResponse {
        status,
        body: body.as_string().unwrap_or_default(),
    })
}

pub(crate) async fn api_request(
    transport: &FetchTransport,
    url: &str,
    options: &RequestOptions,
) -> ApiResult {
    let method = options.method.as_deref().unwrap_or("GET");
    run_request(transport, url, options, |err| {
        logging::warn("api", &format!("{method} {url}: {err}"));
    })
    .await
}

/// Options passed to `apiRequest` from page scripts, split into what the
/// request helper owns and the untouched caller object.
pub(crate) struct CallerOptions {
    pub(crate) options: RequestOptions,
    pub(crate) init: Option<Object>,
}

/// Reads `{ method, headers, body, ... }` from a plain JS object. A body that
/// is not already a string is sent as its JSON text; header values are
/// stringified the way `fetch` does.
pub(crate) fn options_from_js(value: &JsValue) -> Result<CallerOptions, String> {
    let mut options = RequestOptions::default();
    if value.is_undefined() || value.is_null() {
        return Ok(CallerOptions {
            options,
            init: None,
        });
    }
    if !value.is_object() {
        return Err("request options must be an object".to_string());
    }
    let field = |name: &str| Reflect::get(value, &JsValue::from_str(name)).map_err(js_err);

    let method = field("method")?;
    if let Some(method) = method.as_string() {
        options.method = Some(method);
    }

    let headers = field("headers")?;
    if headers.is_object() {
        let entries = Object::entries(headers.unchecked_ref::<Object>());
        for entry in entries.iter() {
            let pair: Array = entry.unchecked_into();
            let (Some(name), Some(value)) = (pair.get(0).as_string(), header_text(&pair.get(1)))
            else {
                continue;
            };
            options.headers.push((name, value));
        }
    }

    let body = field("body")?;
    if let Some(text) = body.as_string() {
        options.body = Some(text);
    } else if !body.is_undefined() && !body.is_null() {
        let text = js_sys::JSON::stringify(&body).map_err(js_err)?;
        options.body = text.as_string();
    }
    Ok(CallerOptions {
        options,
        init: Some(value.unchecked_ref::<Object>().clone()),
    })
}

fn header_text(value: &JsValue) -> Option<String> {
    if let Some(text) = value.as_string() {
        return Some(text);
    }
    if value.is_undefined() {
        return None;
    }
    if value.is_null() {
        return Some("null".to_string());
    }
    Some(String::from(value.unchecked_ref::<Object>().to_string()))
}

pub(crate) fn result_to_js(result: &ApiResult) -> JsValue {
    if let Ok(text) = serde_json::to_string(result) {
        if let Ok(value) = js_sys::JSON::parse(&text) {
            return value;
        }
    }
    let object = Object::new();
    let _ = Reflect::set(&object, &JsValue::from_str("success"), &JsValue::FALSE);
    let _ = Reflect::set(
        &object,
        &JsValue::from_str("error"),
        &JsValue::from_str("could not convert response"),
    );
    object.into()
}

/// `apiRequest(url, options?)` for page scripts. The promise always
/// resolves, to `{ success, data?, error? }`.
#[wasm_bindgen(js_name = apiRequest)]
pub fn api_request_js(url: String, options: JsValue) -> Promise {
    let options = options_from_js(&options);
    future_to_promise(async move {
        let result = match options {
            Ok(CallerOptions { options, init }) => {
                let transport = init.map(FetchTransport::with_init).unwrap_or_default();
                api_request(&transport, &url, &options).await
            }
            Err(err) => {
                logging::warn("api", &err);
                ApiResult::failure(err)
            }
        };
        Ok(result_to_js(&result))
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::*;

    use kaoyan_review_core::prepare;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn js_object(json: &str) -> JsValue {
        js_sys::JSON::parse(json).unwrap()
    }

    #[wasm_bindgen_test]
    fn options_read_method_headers_and_body() {
        let options = options_from_js(&js_object(
            r#"{"method":"POST","headers":{"X-Token":"abc"},"body":{"subject_name":"数学"}}"#,
        ))
        .unwrap()
        .options;
        assert_eq!(options.method.as_deref(), Some("POST"));
        assert_eq!(options.headers, vec![("X-Token".to_string(), "abc".to_string())]);
        assert_eq!(options.body.as_deref(), Some(r#"{"subject_name":"数学"}"#));
    }

    #[wasm_bindgen_test]
    fn missing_options_are_defaults() {
        let caller = options_from_js(&JsValue::UNDEFINED).unwrap();
        assert_eq!(caller.options, RequestOptions::default());
        assert!(caller.init.is_none());
        assert!(options_from_js(&JsValue::from_f64(3.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn extra_fields_and_numeric_headers_reach_the_request() {
        let caller = options_from_js(&js_object(
            r#"{"method":"post","credentials":"include","cache":"no-store","headers":{"X-Retry":3,"Content-Type":"text/plain"},"body":"hi"}"#,
        ))
        .unwrap();
        assert!(caller
            .options
            .headers
            .contains(&("X-Retry".to_string(), "3".to_string())));

        let prepared = prepare("/api/subjects", &caller.options);
        let init = request_init(caller.init.as_ref(), &prepared).unwrap();
        let get = |name: &str| Reflect::get(&init, &JsValue::from_str(name)).unwrap();
        assert_eq!(get("credentials").as_string().as_deref(), Some("include"));
        assert_eq!(get("cache").as_string().as_deref(), Some("no-store"));
        assert_eq!(get("method").as_string().as_deref(), Some("POST"));
        assert_eq!(get("body").as_string().as_deref(), Some("hi"));

        let headers: Headers = get("headers").dyn_into().unwrap();
        assert_eq!(headers.get("x-retry").unwrap().as_deref(), Some("3"));
        assert_eq!(headers.get("content-type").unwrap().as_deref(), Some("text/plain"));

        let request = Request::new_with_str_and_init("/api/subjects", &init).unwrap();
        assert_eq!(request.method(), "POST");
    }

    #[wasm_bindgen_test]
    fn result_keeps_the_uniform_shape() {
        let value = result_to_js(&ApiResult::failure("offline"));
        let success = Reflect::get(&value, &JsValue::from_str("success")).unwrap();
        assert_eq!(success.as_bool(), Some(false));
        let data = Reflect::get(&value, &JsValue::from_str("data")).unwrap();
        assert!(data.is_undefined());
    }

    #[wasm_bindgen_test(async)]
    async fn unreachable_host_resolves_to_failure() {
        let transport = FetchTransport::default();
        let url = "http://127.0.0.1:9/unreachable";
        let result = api_request(&transport, url, &RequestOptions::get()).await;
        assert!(!result.success);
        assert!(!result.error.unwrap_or_default().is_empty());
    }
}
