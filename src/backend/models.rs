//! Request/response bodies of the generation backend.
//!
//! Field names and defaults match the backend's JSON contract. Local
//! validation only rejects requests the backend would bounce anyway
//! (blank prompt, zero frame count).

use serde::{Deserialize, Serialize};

use super::BackendError;

/// Text-to-image request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default = "default_true")]
    pub watermark: bool,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: default_image_size(),
            guidance_scale: default_guidance_scale(),
            seed: default_seed(),
            watermark: true,
        }
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        require_text("prompt", &self.prompt)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_url: String,
}

/// Prompt-assist request: turn a loose idea into a structured prompt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub user_request: String,
}

impl PromptRequest {
    pub fn validate(&self) -> Result<(), BackendError> {
        require_text("user_request", &self.user_request)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub generated_prompt: String,
}

/// Text(+first frame)-to-video request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_frame: Option<String>,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// Seconds
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub camera_fixed: bool,
    #[serde(default = "default_true")]
    pub watermark: bool,
}

impl AnimationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            first_frame: None,
            resolution: default_resolution(),
            duration: default_duration(),
            camera_fixed: false,
            watermark: true,
        }
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        require_text("prompt", &self.prompt)
    }

    /// Blank first-frame URLs are dropped rather than sent.
    pub(crate) fn normalized(mut self) -> Self {
        self.first_frame = self
            .first_frame
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationResponse {
    pub video_url: String,
}

/// Chiptune request; the backend answers with encoded audio bytes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChiptuneRequest {
    pub prompt: String,
    #[serde(default = "default_bpm")]
    pub bpm: u32,
}

impl ChiptuneRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            bpm: default_bpm(),
        }
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        require_text("prompt", &self.prompt)?;
        if self.bpm == 0 {
            return Err(BackendError::InvalidRequest("bpm must be positive".into()));
        }
        Ok(())
    }
}

/// Encoded audio returned by the chiptune endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChiptuneAudio {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Split a generated animation into still frames
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameExtractionRequest {
    pub video_url: String,
    /// Seconds between extracted frames
    pub interval: f32,
    pub frame_count: u32,
}

impl FrameExtractionRequest {
    pub fn validate(&self) -> Result<(), BackendError> {
        require_text("video_url", &self.video_url)?;
        if self.frame_count == 0 {
            return Err(BackendError::InvalidRequest("frame_count must be positive".into()));
        }
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(BackendError::InvalidRequest(format!(
                "interval must be positive, got {}",
                self.interval
            )));
        }
        Ok(())
    }
}

/// Ordered frame references, ready for `Curation::load_frames`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameExtractionResponse {
    pub frames: Vec<String>,
}

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

fn require_text(field: &str, value: &str) -> Result<(), BackendError> {
    if value.trim().is_empty() {
        Err(BackendError::InvalidRequest(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

fn default_image_size() -> String {
    "512x512".to_string()
}

fn default_guidance_scale() -> f32 {
    2.5
}

fn default_seed() -> i64 {
    12345
}

fn default_true() -> bool {
    true
}

fn default_resolution() -> String {
    "1080p".to_string()
}

fn default_duration() -> u32 {
    5
}

fn default_bpm() -> u32 {
    130
}
