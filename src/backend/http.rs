//! Blocking HTTP implementation of `GenerationBackend` (ureq).
//!
//! Animation generation blocks on the backend until the video is ready,
//! which can take minutes - call from a worker thread, never from the
//! curation event loop.

use log::{debug, error, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use ureq::Agent;

use super::models::ErrorBody;
use super::*;

/// Upper bound for chiptune audio payloads
const MAX_AUDIO_BYTES: u64 = 64 * 1024 * 1024;

/// Backend reached over HTTP
pub struct HttpBackend {
    base_url: String,
    agent: Agent,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Error statuses are decoded from the body, not turned into ureq errors
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        info!("Generation backend: {}", base_url);
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ureq::http::Response<ureq::Body>, BackendError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let mut resp = self.agent.post(&url).send_json(body).map_err(|e| {
            error!("POST {} failed: {}", url, e);
            BackendError::Transport(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let raw = resp.body_mut().read_to_string().unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&raw) {
            Ok(body) => match body.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            },
            Err(_) if raw.is_empty() => status.canonical_reason().unwrap_or("error").to_string(),
            Err(_) => raw,
        };
        error!("POST {} -> {}: {}", url, status.as_u16(), detail);
        Err(BackendError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, BackendError> {
        let mut resp = self.send(path, body)?;
        resp.body_mut()
            .read_json::<R>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl GenerationBackend for HttpBackend {
    fn generate_image(&self, req: &ImageRequest) -> Result<ImageResponse, BackendError> {
        req.validate()?;
        self.post_json("/api/generate-image", req)
    }

    fn generate_prompt(&self, req: &PromptRequest) -> Result<PromptResponse, BackendError> {
        req.validate()?;
        self.post_json("/api/generate-prompt", req)
    }

    fn generate_animation(&self, req: &AnimationRequest) -> Result<AnimationResponse, BackendError> {
        req.validate()?;
        let req = req.clone().normalized();
        self.post_json("/api/generate-animation", &req)
    }

    fn generate_chiptune(&self, req: &ChiptuneRequest) -> Result<ChiptuneAudio, BackendError> {
        req.validate()?;
        let mut resp = self.send("/api/generate-chiptune", req)?;
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let bytes = resp
            .body_mut()
            .with_config()
            .limit(MAX_AUDIO_BYTES)
            .read_to_vec()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(ChiptuneAudio { content_type, bytes })
    }

    fn extract_frames(
        &self,
        req: &FrameExtractionRequest,
    ) -> Result<FrameExtractionResponse, BackendError> {
        req.validate()?;
        let resp: FrameExtractionResponse = self.post_json("/api/extract-frames", req)?;
        info!("Split {} into {} frames", req.video_url, resp.frames.len());
        Ok(resp)
    }
}
