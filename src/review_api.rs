use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use kaoyan_review_core::{ApiError, ApiResult, Familiarity, ReviewClient};

use crate::boot;
use crate::fetch::{result_to_js, FetchTransport};
use crate::logging;

fn client() -> ReviewClient<FetchTransport> {
    ReviewClient::new(FetchTransport::default(), &boot::api_base())
}

fn settle<T: Serialize>(action: &str, outcome: Result<T, ApiError>) -> JsValue {
    let result = match outcome.and_then(|value| {
        serde_json::to_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }) {
        Ok(data) => ApiResult::completed(true, data),
        Err(err) => {
            logging::warn("review", &format!("{action}: {err}"));
            ApiResult::failure(err.to_string())
        }
    };
    result_to_js(&result)
}

/// `updateFamiliarity(imageKey, "familiar" | "blur" | "strange")`.
#[wasm_bindgen(js_name = updateFamiliarity)]
pub fn update_familiarity(image_key: String, familiarity: String) -> Promise {
    future_to_promise(async move {
        let outcome = match Familiarity::parse(&familiarity) {
            Some(familiarity) => client().update_familiarity(&image_key, familiarity).await,
            None => Err(ApiError::InvalidInput(format!(
                "unknown familiarity {familiarity:?}"
            ))),
        };
        Ok(settle("update familiarity", outcome))
    })
}

#[wasm_bindgen(js_name = setWeight)]
pub fn set_weight(image_key: String, weight: f64) -> Promise {
    future_to_promise(async move {
        let outcome = client().set_weight(&image_key, weight).await;
        Ok(settle("set weight", outcome))
    })
}

#[wasm_bindgen(js_name = listSubjects)]
pub fn list_subjects() -> Promise {
    future_to_promise(async move { Ok(settle("list subjects", client().subjects().await)) })
}

#[wasm_bindgen(js_name = createSubject)]
pub fn create_subject(subject_name: String) -> Promise {
    future_to_promise(async move {
        let outcome = client().create_subject(&subject_name).await;
        Ok(settle("create subject", outcome))
    })
}

#[wasm_bindgen(js_name = subjectWeights)]
pub fn subject_weights(subject: String) -> Promise {
    future_to_promise(async move {
        let outcome = client().subject_weights(&subject).await;
        Ok(settle("subject weights", outcome))
    })
}

#[wasm_bindgen(js_name = reviewStatistics)]
pub fn review_statistics() -> Promise {
    future_to_promise(async move {
        Ok(settle("statistics", client().statistics().await))
    })
}
