//! Highscore API server
//!
//! Serves the game's static files and the `/api/highscores` submit/list
//! endpoint. Requests are handled one at a time on the calling thread.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::highscores::{HighScores, SubmitRequest};

pub const API_PATH: &str = "/api/highscores";

/// Server configuration, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub highscore_file: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            highscore_file: PathBuf::from("highscores.json"),
            static_dir: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    /// `PORT`, `HIGHSCORE_FILE` and `STATIC_DIR`, each optional
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value {:?}", port))?;
        }
        if let Some(file) = lookup("HIGHSCORE_FILE") {
            config.highscore_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

/// A response before it is turned into HTTP
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiResponse {
    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    fn text(status: u16, text: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: text.as_bytes().to_vec(),
        }
    }

    fn not_found() -> Self {
        Self::text(404, "Not Found")
    }
}

fn bad_request(message: &str) -> ApiResponse {
    ApiResponse::json(400, &serde_json::json!({ "error": message }))
}

/// Request router with the highscore board it serves
pub struct Api {
    scores: HighScores,
    /// Where the board is persisted; `None` keeps it in memory
    path: Option<PathBuf>,
    static_dir: PathBuf,
}

impl Api {
    pub fn new(scores: HighScores, path: Option<PathBuf>, static_dir: PathBuf) -> Self {
        Self {
            scores,
            path,
            static_dir,
        }
    }

    /// Router backed by the configured score file
    pub fn open(config: &ServerConfig) -> Self {
        Self::new(
            HighScores::load(&config.highscore_file),
            Some(config.highscore_file.clone()),
            config.static_dir.clone(),
        )
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    /// Read the request body, then route. An unreadable or non UTF-8 body
    /// is rejected before anything is routed.
    pub fn serve(&mut self, method: &Method, url: &str, body: &mut dyn Read) -> ApiResponse {
        let mut bytes = Vec::new();
        if let Err(e) = body.read_to_end(&mut bytes) {
            log::warn!("Unreadable request body: {}", e);
            return bad_request("unreadable request body");
        }
        match String::from_utf8(bytes) {
            Ok(text) => self.route(method, url, &text),
            Err(e) => {
                log::warn!("Request body is not UTF-8: {}", e);
                bad_request("request body is not UTF-8")
            }
        }
    }

    pub fn route(&mut self, method: &Method, url: &str, body: &str) -> ApiResponse {
        let path = url.split(['?', '#']).next().unwrap_or("/");
        match (method, path) {
            (Method::Get, API_PATH) => self.list_scores(),
            (Method::Post, API_PATH) => self.submit_score(body),
            (_, API_PATH) => ApiResponse::text(405, "Method Not Allowed"),
            (Method::Get, "/") => self.static_file("index.html"),
            (Method::Get, _) => self.static_file(path.trim_start_matches('/')),
            _ => ApiResponse::not_found(),
        }
    }

    fn list_scores(&self) -> ApiResponse {
        match serde_json::to_value(&self.scores) {
            Ok(value) => ApiResponse::json(200, &value),
            Err(e) => {
                log::error!("Failed to encode high scores: {}", e);
                ApiResponse::text(500, "Internal Server Error")
            }
        }
    }

    fn submit_score(&mut self, body: &str) -> ApiResponse {
        if body.trim().is_empty() {
            log::warn!("Rejected score submission: empty body");
            return bad_request("missing request body");
        }
        let request = match serde_json::from_str::<SubmitRequest>(body) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Rejected score submission: {}", e);
                return bad_request(&e.to_string());
            }
        };

        let entry = request.into_entry();
        log::info!("Storing score {} for {}", entry.score, entry.name);
        if let Err(e) = self.scores.add_and_save(entry, self.path.as_deref()) {
            log::error!("Failed to persist high scores: {}", e);
            return ApiResponse::text(500, "Internal Server Error");
        }
        ApiResponse::json(200, &serde_json::json!({ "ok": true }))
    }

    fn static_file(&self, relative: &str) -> ApiResponse {
        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            log::warn!("Refusing path {}", relative.display());
            return ApiResponse::not_found();
        }

        let full = self.static_dir.join(relative);
        match std::fs::read(&full) {
            Ok(body) => ApiResponse {
                status: 200,
                content_type: content_type(&full),
                body,
            },
            Err(_) => ApiResponse::not_found(),
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Serve until the process is stopped
pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let server =
        Server::http(&addr).map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    let mut api = Api::open(&config);
    log::info!(
        "Serving {} on http://{} (scores in {})",
        config.static_dir.display(),
        addr,
        config.highscore_file.display()
    );

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let response = api.serve(&method, &url, request.as_reader());
        log::debug!("{} {} -> {}", method, url, response.status);

        let mut reply = Response::from_data(response.body).with_status_code(StatusCode(response.status));
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
            reply = reply.with_header(header);
        }
        if let Err(e) = request.respond(reply) {
            log::warn!("Failed to send response: {}", e);
        }
    }
    Ok(())
}
