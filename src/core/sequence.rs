//! Ordered list of extracted frames.
//!
//! A split (frame extraction) result becomes a `FrameSequence`. After that
//! the only mutation is `reorder()` - frames are never inserted or dropped
//! individually, a new split replaces the whole list.
//!
//! Frame identity is positional: a frame is "whatever sits at index N".

use log::trace;
use serde::{Deserialize, Serialize};

use super::error::{CurationError, check_index};

/// Opaque reference to one still image (usually a URL)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(String);

impl Frame {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl From<String> for Frame {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<&str> for Frame {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered frames of one split result
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace content wholesale with a new split result.
    ///
    /// Selection reset is the caller's job (see `Curation::load_frames`).
    pub fn initialize<I, F>(&mut self, frames: I)
    where
        I: IntoIterator<Item = F>,
        F: Into<Frame>,
    {
        self.frames = frames.into_iter().map(Into::into).collect();
        trace!("FrameSequence initialized with {} frames", self.frames.len());
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, or `OutOfRange`.
    pub fn frame_at(&self, index: usize) -> Result<&Frame, CurationError> {
        check_index(index, self.frames.len())?;
        Ok(&self.frames[index])
    }

    /// Move frame at `from` to `to` (splice, not swap).
    ///
    /// `[a, b, c, d]` with `reorder(0, 2)` gives `[b, c, a, d]`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CurationError> {
        let len = self.frames.len();
        check_index(from, len)?;
        check_index(to, len)?;
        if from == to {
            return Ok(());
        }
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);
        trace!("Frame moved {} -> {}", from, to);
        Ok(())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
