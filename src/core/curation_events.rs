//! Curation and preview events.

use serde::Serialize;

// === Sequence ===

/// Split result loaded; selection reset to all
#[derive(Clone, Debug, Serialize)]
pub struct FramesLoadedEvent {
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameMovedEvent {
    pub from: usize,
    pub to: usize,
}

// === Selection ===

#[derive(Clone, Debug, Serialize)]
pub struct SelectionChangedEvent {
    pub selected: usize,
}

// === Preview ===

#[derive(Clone, Debug, Serialize)]
pub struct PreviewStartedEvent {
    pub first: usize,
    pub frames: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct PreviewIndexChangedEvent(pub usize);

/// Why a preview session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// stop_preview()
    Requested,
    /// Reached the end with loop off
    Finished,
    /// start_preview() while already playing
    Replaced,
    /// New split result loaded
    Reloaded,
    /// Owner torn down
    Disposed,
}

#[derive(Clone, Debug, Serialize)]
pub struct PreviewStoppedEvent {
    pub reason: StopReason,
    pub last: Option<usize>,
}
