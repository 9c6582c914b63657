//! Highscore service over the browser's `fetch`

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use super::{HighScoreService, LeaderboardCallback, SubmitCallback};
use crate::error::HighScoreError;
use crate::highscores::HighScoreEntry;

/// Talks to the `/api/highscores` endpoint
pub struct HttpHighScoreService {
    endpoint: String,
}

impl HttpHighScoreService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl HighScoreService for HttpHighScoreService {
    fn submit_score(&self, entry: HighScoreEntry, on_done: SubmitCallback) {
        let endpoint = self.endpoint.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_done(post_score(&endpoint, &entry).await);
        });
    }

    fn fetch_leaderboard(&self, on_done: LeaderboardCallback) {
        let endpoint = self.endpoint.clone();
        wasm_bindgen_futures::spawn_local(async move {
            on_done(get_scores(&endpoint).await);
        });
    }
}

fn js_err(value: JsValue) -> HighScoreError {
    HighScoreError::Network(format!("{:?}", value))
}

async fn send(request: &Request) -> Result<Response, HighScoreError> {
    let window =
        web_sys::window().ok_or_else(|| HighScoreError::Network("no window".to_string()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        return Err(HighScoreError::Status(response.status()));
    }
    Ok(response)
}

async fn post_score(endpoint: &str, entry: &HighScoreEntry) -> Result<(), HighScoreError> {
    let body = serde_json::to_string(entry)?;

    let headers = Headers::new().map_err(js_err)?;
    headers
        .set("content-type", "application/json")
        .map_err(js_err)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(endpoint, &init).map_err(js_err)?;
    send(&request).await?;
    Ok(())
}

async fn get_scores(endpoint: &str) -> Result<Vec<HighScoreEntry>, HighScoreError> {
    let request = Request::new_with_str(endpoint).map_err(js_err)?;
    let response = send(&request).await?;
    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .unwrap_or_default();
    // Ordering is the server's job
    Ok(serde_json::from_str(&text)?)
}
