//! REST API implementation using rouille.
//!
//! # Purpose
//!
//! Handles incoming requests: GET endpoints read the shared curation
//! snapshot, curation mutations are forwarded to the runner thread as
//! [`ApiCommand`]s and answered once the runner has applied them, and
//! generation requests are proxied to the backend on the handler thread.
//!
//! # Key types
//!
//! - [`ApiServer`] - HTTP server runner, spawns background thread
//! - [`ApiCommand`] / [`CurationOp`] - work for the runner thread
//! - [`SharedApiState`] - snapshot refreshed by the runner after every change
//! - [`CurationSnapshot`] - JSON view of the curation state
//!
//! # Thread safety
//!
//! - Curation state lives only on the runner thread; handlers never touch it
//! - `SharedApiState` is an `RwLock` - runner writes, handlers read
//! - History / settings stores sit behind `Mutex`, shared with the runner
//! - CORS headers on every response for browser access

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{error, info, warn};
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use crate::backend::{
    AnimationRequest, BackendError, ChiptuneRequest, FrameExtractionRequest, GenerationBackend,
    ImageRequest, PromptRequest,
};
use crate::core::{Curation, PreviewSettings, SelectionMode};
use crate::storage::{HistoryItem, HistoryStore, MediaKind, SettingsKind, SettingsStore};

/// How long a handler waits for the runner to apply a command
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Curation mutation applied on the runner thread
#[derive(Debug, Clone, PartialEq)]
pub enum CurationOp {
    /// Replace the sequence (split result)
    LoadFrames(Vec<String>),
    ToggleSelection(usize),
    ToggleSelectAll,
    Reorder { from: usize, to: usize },
    /// Preview interval in ms
    SetSpeed(u64),
    SetLoop(bool),
    SetSelectionMode(SelectionMode),
    /// Interval, loop and mode from a `frame_preview` settings document
    ApplySettings(PreviewSettings),
    StartPreview,
    StopPreview,
}

/// Runner's answer: fresh snapshot, or the error message
pub type OpReply = Result<CurationSnapshot, String>;

/// Commands sent from API handlers to the runner thread
#[derive(Debug)]
pub enum ApiCommand {
    Curation {
        op: CurationOp,
        reply: Option<Sender<OpReply>>,
    },
    /// Stop the runner (disposes preview, persists settings)
    Shutdown,
}

/// Curation state snapshot for API responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationSnapshot {
    pub sequence_length: usize,
    pub selected_count: usize,
    pub current_preview_index: Option<usize>,
    pub current_frame: Option<String>,
    pub playing: bool,
    pub interval_ms: u64,
    pub looping: bool,
    pub selection_mode: SelectionMode,
    pub frames: Vec<String>,
    pub selected: Vec<usize>,
}

impl CurationSnapshot {
    /// Preview settings the runner is holding
    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            interval_ms: self.interval_ms,
            looping: self.looping,
            selection_mode: self.selection_mode,
        }
    }

    pub fn capture(curation: &Curation) -> Self {
        let settings = curation.settings();
        Self {
            sequence_length: curation.sequence_length(),
            selected_count: curation.selected_count(),
            current_preview_index: curation.current_preview_index(),
            current_frame: curation.current_frame().map(|f| f.uri().to_string()),
            playing: curation.is_playing(),
            interval_ms: settings.interval_ms,
            looping: settings.looping,
            selection_mode: settings.selection_mode,
            frames: curation
                .sequence()
                .frames()
                .iter()
                .map(|f| f.uri().to_string())
                .collect(),
            selected: curation.selection().ordered_indices(),
        }
    }
}

/// Shared state readable by API handlers (updated by the runner)
#[derive(Default)]
pub struct SharedApiState {
    pub curation: RwLock<CurationSnapshot>,
}

impl SharedApiState {
    pub fn update(&self, curation: &Curation) {
        *self.curation.write().unwrap_or_else(|e| e.into_inner()) = CurationSnapshot::capture(curation);
    }

    pub fn snapshot(&self) -> CurationSnapshot {
        self.curation.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Everything handlers need besides the command channel
#[derive(Clone)]
pub struct ApiServices {
    pub state: Arc<SharedApiState>,
    pub backend: Arc<dyn GenerationBackend>,
    pub history: Arc<Mutex<HistoryStore>>,
    pub settings: Arc<Mutex<SettingsStore>>,
    /// Where generated audio is written
    pub media_dir: PathBuf,
}

/// Request body for loading frames directly
#[derive(Debug, Deserialize)]
struct LoadFramesRequest {
    frames: Vec<String>,
}

/// Generic API response
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self { success: true, message: None, error: None }
    }

    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

fn bad_request(msg: &str) -> Response {
    Response::json(&ApiResponse::err(msg)).with_status_code(400)
}

/// REST API server
pub struct ApiServer {
    services: ApiServices,
    command_tx: Sender<ApiCommand>,
}

impl ApiServer {
    /// Start the API server in a background thread.
    /// Returns the command receiver for the runner to poll.
    pub fn start(port: u16, services: ApiServices) -> Receiver<ApiCommand> {
        let (tx, rx) = unbounded();
        let server = ApiServer::new(services, tx);

        thread::Builder::new()
            .name("frameforge-api".into())
            .spawn(move || server.run(port))
            .map_err(|e| error!("Failed to spawn API server thread: {}", e))
            .ok();

        rx
    }

    pub fn new(services: ApiServices, command_tx: Sender<ApiCommand>) -> Self {
        Self { services, command_tx }
    }

    fn run(self, port: u16) {
        let addr = format!("127.0.0.1:{}", port);
        info!("API server starting on http://{}", addr);

        rouille::start_server(&addr, move |request| self.handle_request(request));
    }

    pub fn handle_request(&self, request: &Request) -> Response {
        // Handle preflight
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        self.route(request)
            .with_additional_header("Access-Control-Allow-Origin", "*")
    }

    fn route(&self, request: &Request) -> Response {
        // Paths with parameters are matched by hand (router! doesn't capture well)
        let path = request.url();
        if request.method() == "POST" {
            if let Some(rest) = path.strip_prefix("/api/curation/toggle/") {
                return match rest.parse::<usize>() {
                    Ok(i) => self.apply(CurationOp::ToggleSelection(i)),
                    Err(_) => bad_request("Invalid frame index"),
                };
            }
            if let Some(rest) = path.strip_prefix("/api/curation/reorder/") {
                let mut parts = rest.splitn(2, '/').map(str::parse::<usize>);
                return match (parts.next(), parts.next()) {
                    (Some(Ok(from)), Some(Ok(to))) => self.apply(CurationOp::Reorder { from, to }),
                    _ => bad_request("Expected /api/curation/reorder/{from}/{to}"),
                };
            }
            if let Some(rest) = path.strip_prefix("/api/curation/speed/") {
                return match rest.parse::<u64>() {
                    Ok(ms) => self.apply(CurationOp::SetSpeed(ms)),
                    Err(_) => bad_request("Invalid interval"),
                };
            }
            if let Some(rest) = path.strip_prefix("/api/curation/loop/") {
                return match rest {
                    "1" | "true" | "on" => self.apply(CurationOp::SetLoop(true)),
                    "0" | "false" | "off" => self.apply(CurationOp::SetLoop(false)),
                    _ => bad_request("Loop must be 0 or 1"),
                };
            }
            if let Some(rest) = path.strip_prefix("/api/curation/mode/") {
                return match rest {
                    "positional" => self.apply(CurationOp::SetSelectionMode(SelectionMode::Positional)),
                    "follow" => self.apply(CurationOp::SetSelectionMode(SelectionMode::FollowFrame)),
                    _ => bad_request("Mode must be positional or follow"),
                };
            }
            if let Some(kind) = path.strip_prefix("/api/generate/") {
                return self.handle_generate(kind, request);
            }
        }
        if let Some(kind) = path.strip_prefix("/api/settings/") {
            return self.handle_settings(kind, request);
        }

        rouille::router!(request,
            (GET) ["/api/health"] => {
                Response::json(&ApiResponse::ok_msg("frameforge API server"))
            },
            (GET) ["/api/curation"] => {
                Response::json(&self.services.state.snapshot())
            },

            // Curation control
            (POST) ["/api/curation/frames"] => {
                match rouille::input::json_input::<LoadFramesRequest>(request) {
                    Ok(req) => self.apply(CurationOp::LoadFrames(req.frames)),
                    Err(e) => bad_request(&format!("Invalid JSON: {}", e)),
                }
            },
            (POST) ["/api/curation/split"] => {
                self.handle_split(request)
            },
            (POST) ["/api/curation/toggle-all"] => {
                self.apply(CurationOp::ToggleSelectAll)
            },
            (POST) ["/api/preview/start"] => {
                self.apply(CurationOp::StartPreview)
            },
            (POST) ["/api/preview/stop"] => {
                self.apply(CurationOp::StopPreview)
            },

            // History
            (GET) ["/api/history"] => {
                self.get_history(request)
            },
            (POST) ["/api/history/clear"] => {
                self.clear_history()
            },

            (POST) ["/api/shutdown"] => {
                self.send(ApiCommand::Shutdown)
            },

            // Fallback
            _ => {
                Response::json(&ApiResponse::err("Not found")).with_status_code(404)
            }
        )
    }

    fn send(&self, cmd: ApiCommand) -> Response {
        match self.command_tx.send(cmd) {
            Ok(_) => Response::json(&ApiResponse::ok()),
            Err(e) => Response::json(&ApiResponse::err(&format!("Failed to send command: {}", e)))
                .with_status_code(500),
        }
    }

    /// Forward `op` to the runner and wait for the outcome.
    fn apply(&self, op: CurationOp) -> Response {
        let (reply_tx, reply_rx) = bounded(1);
        let cmd = ApiCommand::Curation { op, reply: Some(reply_tx) };
        if let Err(e) = self.command_tx.send(cmd) {
            return Response::json(&ApiResponse::err(&format!("Runner unavailable: {}", e)))
                .with_status_code(503);
        }
        match reply_rx.recv_timeout(REPLY_TIMEOUT) {
            Ok(Ok(snapshot)) => Response::json(&snapshot),
            Ok(Err(msg)) => bad_request(&msg),
            Err(e) => Response::json(&ApiResponse::err(&format!("No reply from runner: {}", e)))
                .with_status_code(504),
        }
    }

    fn handle_split(&self, request: &Request) -> Response {
        let req = match rouille::input::json_input::<FrameExtractionRequest>(request) {
            Ok(req) => req,
            Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
        };
        match self.services.backend.extract_frames(&req) {
            Ok(resp) => self.apply(CurationOp::LoadFrames(resp.frames)),
            Err(e) => backend_failure(&e),
        }
    }

    fn handle_generate(&self, kind: &str, request: &Request) -> Response {
        let backend = &self.services.backend;
        match kind {
            "image" => {
                let req = match rouille::input::json_input::<ImageRequest>(request) {
                    Ok(req) => req,
                    Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
                };
                match backend.generate_image(&req) {
                    Ok(resp) => {
                        self.record(MediaKind::Image, &req.prompt, &resp.image_url, &req);
                        Response::json(&resp)
                    }
                    Err(e) => backend_failure(&e),
                }
            }
            "prompt" => {
                let req = match rouille::input::json_input::<PromptRequest>(request) {
                    Ok(req) => req,
                    Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
                };
                match backend.generate_prompt(&req) {
                    Ok(resp) => Response::json(&resp),
                    Err(e) => backend_failure(&e),
                }
            }
            "animation" => {
                let req = match rouille::input::json_input::<AnimationRequest>(request) {
                    Ok(req) => req,
                    Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
                };
                match backend.generate_animation(&req) {
                    Ok(resp) => {
                        self.record(MediaKind::Animation, &req.prompt, &resp.video_url, &req);
                        Response::json(&resp)
                    }
                    Err(e) => backend_failure(&e),
                }
            }
            "chiptune" => {
                let req = match rouille::input::json_input::<ChiptuneRequest>(request) {
                    Ok(req) => req,
                    Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
                };
                match backend.generate_chiptune(&req) {
                    Ok(audio) => {
                        let file = self
                            .services
                            .media_dir
                            .join(format!("chiptune_{}.mp3", uuid::Uuid::new_v4()));
                        match std::fs::write(&file, &audio.bytes) {
                            Ok(()) => {
                                let url = format!("file://{}", file.display());
                                self.record(MediaKind::Chiptune, &req.prompt, &url, &req);
                            }
                            Err(e) => warn!("Failed to keep chiptune at {}: {}", file.display(), e),
                        }
                        Response::from_data(audio.content_type, audio.bytes)
                    }
                    Err(e) => backend_failure(&e),
                }
            }
            _ => Response::json(&ApiResponse::err("Unknown generator")).with_status_code(404),
        }
    }

    /// Append a history item; storage trouble is logged, the generation still succeeds.
    fn record<P: Serialize>(&self, kind: MediaKind, prompt: &str, url: &str, params: &P) {
        let params = serde_json::to_value(params).unwrap_or_default();
        let item = HistoryItem::new(kind, prompt, url, params);
        let mut history = self.services.history.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = history.add(item) {
            error!("Failed to save history: {:#}", e);
        }
    }

    fn get_history(&self, request: &Request) -> Response {
        let history = self.services.history.lock().unwrap_or_else(|e| e.into_inner());
        match request.get_param("kind") {
            Some(kind) => match kind.parse::<MediaKind>() {
                Ok(kind) => Response::json(&history.by_kind(kind)),
                Err(e) => bad_request(&e),
            },
            None => Response::json(&history.all()),
        }
    }

    fn clear_history(&self) -> Response {
        let mut history = self.services.history.lock().unwrap_or_else(|e| e.into_inner());
        match history.clear() {
            Ok(()) => Response::json(&ApiResponse::ok()),
            Err(e) => Response::json(&ApiResponse::err(&format!("{:#}", e))).with_status_code(500),
        }
    }

    fn handle_settings(&self, kind: &str, request: &Request) -> Response {
        let kind = match kind.parse::<SettingsKind>() {
            Ok(kind) => kind,
            Err(e) => return Response::json(&ApiResponse::err(&e)).with_status_code(404),
        };
        // Preview settings live in the runner's Curation; it persists them
        if kind == SettingsKind::FramePreview {
            return match request.method() {
                "GET" => Response::json(&self.services.state.snapshot().preview_settings()),
                "POST" => match rouille::input::json_input::<PreviewSettings>(request) {
                    Ok(preview) => self.apply(CurationOp::ApplySettings(preview)),
                    Err(e) => bad_request(&format!("Invalid preview settings: {}", e)),
                },
                _ => Response::empty_406(),
            };
        }
        let mut settings = self.services.settings.lock().unwrap_or_else(|e| e.into_inner());
        match request.method() {
            "GET" => match settings.get_raw(kind) {
                Some(doc) => Response::json(doc),
                None => Response::json(&ApiResponse::err("No settings stored")).with_status_code(404),
            },
            "POST" => match rouille::input::json_input::<serde_json::Value>(request) {
                Ok(doc) => match settings.save(kind, &doc) {
                    Ok(()) => Response::json(&ApiResponse::ok()),
                    Err(e) => Response::json(&ApiResponse::err(&format!("{:#}", e))).with_status_code(500),
                },
                Err(e) => bad_request(&format!("Invalid JSON: {}", e)),
            },
            _ => Response::empty_406(),
        }
    }
}

/// Backend failures are shown to the user and never retried here.
fn backend_failure(e: &BackendError) -> Response {
    error!("Generation request failed: {}", e);
    let status = if e.is_client_error() { 400 } else { 502 };
    Response::json(&ApiResponse::err(&e.to_string())).with_status_code(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::*;
    use crate::core::PreviewSettings;
    use crate::runner::apply_op;
    use std::io::Read;

    /// Backend double returning canned answers
    struct FakeBackend;

    impl GenerationBackend for FakeBackend {
        fn generate_image(&self, req: &ImageRequest) -> Result<ImageResponse, BackendError> {
            req.validate()?;
            Ok(ImageResponse { image_url: "https://cdn.example/img.png".into() })
        }
        fn generate_prompt(&self, _req: &PromptRequest) -> Result<PromptResponse, BackendError> {
            Err(BackendError::Api { status: 500, detail: "model down".into() })
        }
        fn generate_animation(&self, _req: &AnimationRequest) -> Result<AnimationResponse, BackendError> {
            Ok(AnimationResponse { video_url: "https://cdn.example/run.mp4".into() })
        }
        fn generate_chiptune(&self, _req: &ChiptuneRequest) -> Result<ChiptuneAudio, BackendError> {
            Ok(ChiptuneAudio { content_type: "audio/mpeg".into(), bytes: vec![1, 2, 3] })
        }
        fn extract_frames(
            &self,
            req: &FrameExtractionRequest,
        ) -> Result<FrameExtractionResponse, BackendError> {
            Ok(FrameExtractionResponse {
                frames: (0..req.frame_count).map(|i| format!("f{}.png", i)).collect(),
            })
        }
    }

    struct Harness {
        server: ApiServer,
        runner: thread::JoinHandle<()>,
        dir: PathBuf,
    }

    /// Server plus a minimal runner thread applying ops to a real Curation
    fn harness() -> Harness {
        let dir = std::env::temp_dir().join(format!("frameforge_api_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let services = ApiServices {
            state: Arc::new(SharedApiState::default()),
            backend: Arc::new(FakeBackend),
            history: Arc::new(Mutex::new(HistoryStore::load(dir.join("history.json")))),
            settings: Arc::new(Mutex::new(SettingsStore::load(dir.join("settings.json")))),
            media_dir: dir.clone(),
        };
        let (tx, rx) = unbounded::<ApiCommand>();
        let state = Arc::clone(&services.state);
        let runner = thread::spawn(move || {
            let mut curation = Curation::new(PreviewSettings::default());
            while let Ok(cmd) = rx.recv() {
                match cmd {
                    ApiCommand::Curation { op, reply } => {
                        let result = apply_op(&mut curation, op).map_err(|e| e.to_string());
                        state.update(&curation);
                        if let Some(reply) = reply {
                            let _ = reply.send(result.map(|_| CurationSnapshot::capture(&curation)));
                        }
                    }
                    ApiCommand::Shutdown => break,
                }
            }
            curation.dispose();
        });
        Harness { server: ApiServer::new(services, tx), runner, dir }
    }

    impl Harness {
        fn call(&self, method: &str, url: &str, body: Option<serde_json::Value>) -> (u16, Vec<u8>) {
            let (headers, data) = match body {
                Some(json) => (
                    vec![("Content-Type".to_string(), "application/json".to_string())],
                    serde_json::to_vec(&json).unwrap(),
                ),
                None => (vec![], vec![]),
            };
            let request = Request::fake_http(method, url, headers, data);
            let response = self.server.handle_request(&request);
            let status = response.status_code;
            let (mut reader, _) = response.data.into_reader_and_size();
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).unwrap();
            (status, buf)
        }

        fn json(&self, method: &str, url: &str, body: Option<serde_json::Value>) -> (u16, serde_json::Value) {
            let (status, buf) = self.call(method, url, body);
            (status, serde_json::from_slice(&buf).unwrap())
        }

        fn finish(self) {
            let (status, _) = self.call("POST", "/api/shutdown", None);
            assert_eq!(status, 200);
            self.runner.join().unwrap();
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    #[test]
    fn test_load_toggle_reorder_flow() {
        let h = harness();
        let (status, snap) = h.json(
            "POST",
            "/api/curation/frames",
            Some(serde_json::json!({ "frames": ["a", "b", "c", "d"] })),
        );
        assert_eq!(status, 200);
        assert_eq!(snap["selected_count"], 4);

        let (_, snap) = h.json("POST", "/api/curation/toggle/1", None);
        assert_eq!(snap["selected"], serde_json::json!([0, 2, 3]));

        let (_, snap) = h.json("POST", "/api/curation/reorder/0/3", None);
        assert_eq!(snap["frames"], serde_json::json!(["b", "c", "d", "a"]));

        // Snapshot endpoint reflects the runner's state
        let (_, snap) = h.json("GET", "/api/curation", None);
        assert_eq!(snap["sequence_length"], 4);
        h.finish();
    }

    #[test]
    fn test_out_of_range_is_bad_request() {
        let h = harness();
        h.json("POST", "/api/curation/frames", Some(serde_json::json!({ "frames": ["a"] })));
        let (status, body) = h.json("POST", "/api/curation/toggle/5", None);
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);

        let (status, _) = h.call("POST", "/api/curation/toggle/abc", None);
        assert_eq!(status, 400);
        h.finish();
    }

    #[test]
    fn test_preview_start_stop() {
        let h = harness();
        h.json("POST", "/api/curation/frames", Some(serde_json::json!({ "frames": ["a", "b"] })));
        h.json("POST", "/api/curation/loop/0", None);
        let (_, snap) = h.json("POST", "/api/preview/start", None);
        assert_eq!(snap["playing"], true);
        assert_eq!(snap["current_preview_index"], 0);
        assert_eq!(snap["looping"], false);

        let (_, snap) = h.json("POST", "/api/preview/stop", None);
        assert_eq!(snap["playing"], false);
        // Stopping twice is fine
        let (status, _) = h.call("POST", "/api/preview/stop", None);
        assert_eq!(status, 200);
        h.finish();
    }

    #[test]
    fn test_split_loads_backend_frames() {
        let h = harness();
        let (status, snap) = h.json(
            "POST",
            "/api/curation/split",
            Some(serde_json::json!({ "video_url": "https://cdn.example/run.mp4", "interval": 0.5, "frame_count": 6 })),
        );
        assert_eq!(status, 200);
        assert_eq!(snap["sequence_length"], 6);
        assert_eq!(snap["selected_count"], 6);
        h.finish();
    }

    #[test]
    fn test_generation_records_history() {
        let h = harness();
        let (status, body) = h.json(
            "POST",
            "/api/generate/image",
            Some(serde_json::json!({ "prompt": "pixel castle" })),
        );
        assert_eq!(status, 200);
        assert_eq!(body["image_url"], "https://cdn.example/img.png");

        let (status, bytes) = h.call("POST", "/api/generate/chiptune", Some(serde_json::json!({ "prompt": "overworld" })));
        assert_eq!(status, 200);
        assert_eq!(bytes, vec![1, 2, 3]);

        let (_, all) = h.json("GET", "/api/history", None);
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["kind"], "chiptune");

        let (_, images) = h.json("GET", "/api/history?kind=image", None);
        assert_eq!(images[0]["prompt"], "pixel castle");
        h.finish();
    }

    #[test]
    fn test_backend_errors_surface() {
        let h = harness();
        let (status, body) = h.json(
            "POST",
            "/api/generate/prompt",
            Some(serde_json::json!({ "user_request": "a dragon" })),
        );
        assert_eq!(status, 502);
        assert_eq!(body["success"], false);

        let (status, _) = h.json("POST", "/api/generate/image", Some(serde_json::json!({ "prompt": " " })));
        assert_eq!(status, 400);
        h.finish();
    }

    #[test]
    fn test_settings_roundtrip() {
        let h = harness();
        let (status, _) = h.json("GET", "/api/settings/image", None);
        assert_eq!(status, 404);

        h.json("POST", "/api/settings/image", Some(serde_json::json!({ "size": "1024x1024" })));
        let (status, doc) = h.json("GET", "/api/settings/image_generation", None);
        assert_eq!(status, 200);
        assert_eq!(doc["size"], "1024x1024");
        h.finish();
    }

    #[test]
    fn test_preview_settings_go_to_runner() {
        let h = harness();
        let (status, snap) = h.json(
            "POST",
            "/api/settings/preview",
            Some(serde_json::json!({ "interval_ms": 120, "looping": false })),
        );
        assert_eq!(status, 200);
        assert_eq!(snap["interval_ms"], 120);
        assert_eq!(snap["looping"], false);

        let (status, doc) = h.json("GET", "/api/settings/frame_preview", None);
        assert_eq!(status, 200);
        assert_eq!(doc["interval_ms"], 120);
        assert_eq!(doc["selection_mode"], "positional");

        // Zero or malformed intervals never reach the Curation
        let (status, _) = h.json(
            "POST",
            "/api/settings/frame_preview",
            Some(serde_json::json!({ "interval_ms": 0 })),
        );
        assert_eq!(status, 400);
        let (status, _) = h.json(
            "POST",
            "/api/settings/frame_preview",
            Some(serde_json::json!({ "interval_ms": "fast" })),
        );
        assert_eq!(status, 400);
        let (_, snap) = h.json("GET", "/api/curation", None);
        assert_eq!(snap["interval_ms"], 120);

        // Not written behind the runner's back
        let settings = h.server.services.settings.lock().unwrap();
        assert!(settings.get_raw(SettingsKind::FramePreview).is_none());
        drop(settings);
        h.finish();
    }

    #[test]
    fn test_unknown_route() {
        let h = harness();
        let (status, _) = h.json("GET", "/api/nope", None);
        assert_eq!(status, 404);
        let (status, _) = h.call("OPTIONS", "/api/curation", None);
        assert_eq!(status, 204);
        h.finish();
    }
}
