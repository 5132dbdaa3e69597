//! Frame curation state driven by the UI / REST surface.
//!
//! **Owns**: the FrameSequence, its SelectionSet, the PlaybackController and
//! the preview settings. Every mutation goes through here so the invariants
//! hold together:
//! - selection always covers exactly `sequence.len()` positions
//! - loading a split result selects every frame and ends any preview
//! - at most one preview session is alive
//!
//! Changes are published on the event bus (see `curation_events`), which is
//! how the current preview index reaches whoever displays it.
//!
//! # Select-all toggle
//!
//! `toggle_select_all()` clears when everything is selected, otherwise selects
//! everything. The decision compares `selection.size()` with the sequence
//! length here, not inside SelectionSet.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::curation_events::*;
use super::error::CurationError;
use super::event_bus::EventEmitter;
use super::playback::{PlaybackConfig, PlaybackController, TickOutcome};
use super::selection::{SelectionMode, SelectionSet};
use super::sequence::{Frame, FrameSequence};
use super::timer::TickSource;

/// Default preview interval
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Preview configuration applied on the next `start_preview()`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub interval_ms: u64,
    pub looping: bool,
    pub selection_mode: SelectionMode,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            looping: true,
            selection_mode: SelectionMode::Positional,
        }
    }
}

impl PreviewSettings {
    /// Same settings with a usable interval; zero falls back to the default.
    pub fn validated(mut self) -> Self {
        if self.interval_ms == 0 {
            warn!(
                "Preview interval 0 ms is invalid, using {} ms",
                DEFAULT_INTERVAL_MS
            );
            self.interval_ms = DEFAULT_INTERVAL_MS;
        }
        self
    }

    fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            interval: Duration::from_millis(self.interval_ms),
            looping: self.looping,
        }
    }
}

/// Composed curation state
#[derive(Debug, Default)]
pub struct Curation {
    sequence: FrameSequence,
    selection: SelectionSet,
    playback: PlaybackController,
    settings: PreviewSettings,
    events: EventEmitter,
}

impl Curation {
    pub fn new(settings: PreviewSettings) -> Self {
        Self {
            settings: settings.validated(),
            ..Self::default()
        }
    }

    /// Publish changes through `events`
    pub fn with_emitter(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    // === Read accessors ===

    pub fn current_preview_index(&self) -> Option<usize> {
        self.playback.current_preview_index()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.size()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence.len()
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Frame currently previewed
    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_preview_index()
            .and_then(|i| self.sequence.frame_at(i).ok())
    }

    /// Tick channel of the running preview, if any
    pub fn tick_source(&self) -> Option<TickSource> {
        self.playback.tick_source()
    }

    // === Mutators ===

    /// Replace the sequence with a new split result.
    ///
    /// Stops any running preview, selects every frame.
    pub fn load_frames<I, F>(&mut self, frames: I)
    where
        I: IntoIterator<Item = F>,
        F: Into<Frame>,
    {
        let last = self.current_preview_index();
        if self.playback.stop() {
            self.events.emit(PreviewStoppedEvent {
                reason: StopReason::Reloaded,
                last,
            });
        }
        self.playback.clear_preview_index();

        self.sequence.initialize(frames);
        self.selection.reset(self.sequence.len());
        info!("Loaded {} frames, all selected", self.sequence.len());
        self.events.emit(FramesLoadedEvent {
            count: self.sequence.len(),
        });
    }

    pub fn toggle_selection(&mut self, index: usize) -> Result<(), CurationError> {
        self.selection.toggle(index)?;
        debug!(
            "Frame {} {}",
            index,
            if self.selection.is_selected(index) { "selected" } else { "deselected" }
        );
        self.emit_selection();
        Ok(())
    }

    /// Clear if everything is selected, otherwise select everything.
    pub fn toggle_select_all(&mut self) {
        if self.selection.size() == self.sequence.len() {
            self.selection.clear();
        } else {
            self.selection.select_all();
        }
        self.emit_selection();
    }

    /// Move a frame. Selection follows only in `SelectionMode::FollowFrame`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CurationError> {
        self.sequence.reorder(from, to)?;
        if self.settings.selection_mode == SelectionMode::FollowFrame {
            self.selection.follow_move(from, to)?;
        }
        self.events.emit(FrameMovedEvent { from, to });
        Ok(())
    }

    /// New preview interval; applies from the next `start_preview()`.
    pub fn set_speed(&mut self, interval_ms: u64) -> Result<(), CurationError> {
        if interval_ms == 0 {
            return Err(CurationError::InvalidInterval(interval_ms));
        }
        self.settings.interval_ms = interval_ms;
        self.note_deferred("interval");
        Ok(())
    }

    /// Loop mode; applies from the next `start_preview()`.
    pub fn set_loop(&mut self, looping: bool) {
        self.settings.looping = looping;
        self.note_deferred("loop");
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.settings.selection_mode = mode;
    }

    /// Replace interval, loop and mode at once; applies from the next `start_preview()`.
    pub fn apply_settings(&mut self, settings: PreviewSettings) -> Result<(), CurationError> {
        if settings.interval_ms == 0 {
            return Err(CurationError::InvalidInterval(0));
        }
        self.settings = settings;
        self.note_deferred("settings");
        Ok(())
    }

    /// Start previewing the current selection. False if nothing is selected.
    pub fn start_preview(&mut self) -> bool {
        let was_playing = self.is_playing();
        let last = self.current_preview_index();

        let config = self.settings.playback_config();
        if !self.playback.start(&self.selection, &self.sequence, config) {
            return false;
        }

        if was_playing {
            self.events.emit(PreviewStoppedEvent {
                reason: StopReason::Replaced,
                last,
            });
        }
        let frames = self.playback.session_frames().map_or(0, <[usize]>::len);
        if let Some(first) = self.current_preview_index() {
            self.events.emit(PreviewStartedEvent { first, frames });
            self.events.emit(PreviewIndexChangedEvent(first));
        }
        true
    }

    pub fn stop_preview(&mut self) {
        if self.playback.stop() {
            self.events.emit(PreviewStoppedEvent {
                reason: StopReason::Requested,
                last: self.current_preview_index(),
            });
        }
    }

    /// Tick from the event loop; stale epochs are ignored.
    pub fn on_tick(&mut self, epoch: u64) -> Option<TickOutcome> {
        let outcome = self.playback.on_tick(epoch)?;
        match outcome {
            TickOutcome::Advanced(i) | TickOutcome::Wrapped(i) => {
                self.events.emit(PreviewIndexChangedEvent(i));
            }
            TickOutcome::Finished(i) => {
                self.events.emit(PreviewStoppedEvent {
                    reason: StopReason::Finished,
                    last: Some(i),
                });
            }
        }
        Some(outcome)
    }

    /// Release the preview timer. Call on every teardown path.
    pub fn dispose(&mut self) {
        if self.is_playing() {
            let last = self.current_preview_index();
            self.playback.dispose();
            self.events.emit(PreviewStoppedEvent {
                reason: StopReason::Disposed,
                last,
            });
        }
    }

    fn emit_selection(&self) {
        self.events.emit(SelectionChangedEvent {
            selected: self.selection.size(),
        });
    }

    fn note_deferred(&self, what: &str) {
        if self.is_playing() {
            warn!("Preview {} changed while playing; applies on next start", what);
        }
    }
}
