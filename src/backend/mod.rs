//! Generation backend client.
//!
//! The backend (image, animation, prompt-assist, chiptune, frame extraction)
//! is an external service. This module only knows its HTTP contract:
//!
//! | Method | Path                      | Body                       | Reply                 |
//! |--------|---------------------------|----------------------------|-----------------------|
//! | POST   | `/api/generate-image`     | [`ImageRequest`]           | [`ImageResponse`]     |
//! | POST   | `/api/generate-prompt`    | [`PromptRequest`]          | [`PromptResponse`]    |
//! | POST   | `/api/generate-animation` | [`AnimationRequest`]       | [`AnimationResponse`] |
//! | POST   | `/api/generate-chiptune`  | [`ChiptuneRequest`]        | audio bytes           |
//! | POST   | `/api/extract-frames`     | [`FrameExtractionRequest`] | [`FrameExtractionResponse`] |
//!
//! Failures come back as [`BackendError`] and are surfaced to the user as-is.
//! Nothing here retries.

mod http;
pub mod models;

pub use http::HttpBackend;
pub use models::*;

/// Default backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Backend call errors
#[derive(Debug)]
pub enum BackendError {
    /// Rejected locally before sending
    InvalidRequest(String),
    /// Connection / IO failure
    Transport(String),
    /// Backend answered with an error status
    Api { status: u16, detail: String },
    /// Reply body did not match the contract
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            BackendError::Transport(e) => write!(f, "Backend unreachable: {}", e),
            BackendError::Api { status, detail } => write!(f, "Backend error {}: {}", status, detail),
            BackendError::Decode(e) => write!(f, "Unexpected backend reply: {}", e),
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// Caller's fault (4xx-ish) as opposed to backend/transport trouble
    pub fn is_client_error(&self) -> bool {
        match self {
            BackendError::InvalidRequest(_) => true,
            BackendError::Api { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

/// Generation backend as seen by the rest of the crate.
///
/// `HttpBackend` is the real one; tests plug in fakes.
pub trait GenerationBackend: Send + Sync {
    fn generate_image(&self, req: &ImageRequest) -> Result<ImageResponse, BackendError>;
    fn generate_prompt(&self, req: &PromptRequest) -> Result<PromptResponse, BackendError>;
    fn generate_animation(&self, req: &AnimationRequest) -> Result<AnimationResponse, BackendError>;
    fn generate_chiptune(&self, req: &ChiptuneRequest) -> Result<ChiptuneAudio, BackendError>;
    fn extract_frames(
        &self,
        req: &FrameExtractionRequest,
    ) -> Result<FrameExtractionResponse, BackendError>;
}
