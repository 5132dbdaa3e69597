//! Preview playback over the selected frames.
//!
//! **Model**: two states. Idle (no session) and Playing (exactly one
//! `PlaybackSession` owning one `RepeatingTimer`). The controller never
//! reads the live selection - `start()` takes a snapshot of the ordered
//! selected indices and walks that.
//!
//! # Tick
//!
//! Each tick advances the cursor by one:
//! - still inside the list: expose `ordered[cursor]`
//! - past the end, looping: wrap to the first selected frame
//! - past the end, not looping: drop the timer, go Idle, keep the last index
//!
//! # Ownership
//!
//! `start()` cancels any running session before creating the new one, so two
//! timers never advance the same cursor. `stop()` / `dispose()` release the
//! timer on every exit path; `Drop` calls `dispose()` as a backstop, callers
//! still call it explicitly on teardown.
//!
//! Interval and loop are fixed at `start()`. Changing them while Playing only
//! affects the next session.

use log::{info, trace};
use std::time::Duration;

use super::selection::SelectionSet;
use super::sequence::FrameSequence;
use super::timer::{RepeatingTimer, TickSource};

/// Session parameters captured at `start()`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub interval: Duration,
    pub looping: bool,
}

/// What a tick did to the preview index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the next selected frame
    Advanced(usize),
    /// Passed the end and restarted at the first selected frame
    Wrapped(usize),
    /// Passed the end without looping; session is gone, index stays here
    Finished(usize),
}

impl TickOutcome {
    pub fn index(&self) -> usize {
        match *self {
            TickOutcome::Advanced(i) | TickOutcome::Wrapped(i) | TickOutcome::Finished(i) => i,
        }
    }
}

/// Live state of one preview run
#[derive(Debug)]
struct PlaybackSession {
    ordered: Vec<usize>,
    cursor: usize,
    looping: bool,
    timer: RepeatingTimer,
}

/// Timer-driven walker over the selected subsequence
#[derive(Debug, Default)]
pub struct PlaybackController {
    session: Option<PlaybackSession>,
    preview_index: Option<usize>,
    next_epoch: u64,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// Index currently shown, `None` until the first preview starts
    pub fn current_preview_index(&self) -> Option<usize> {
        self.preview_index
    }

    /// Ordered indices the live session walks
    pub fn session_frames(&self) -> Option<&[usize]> {
        self.session.as_ref().map(|s| s.ordered.as_slice())
    }

    /// Interval of the live session
    pub fn session_interval(&self) -> Option<Duration> {
        self.session.as_ref().map(|s| s.timer.interval())
    }

    /// Start previewing `selection` over `sequence`.
    ///
    /// Returns false (and changes nothing) when nothing is selected.
    pub fn start(
        &mut self,
        selection: &SelectionSet,
        sequence: &FrameSequence,
        config: PlaybackConfig,
    ) -> bool {
        let len = sequence.len();
        let ordered: Vec<usize> = selection
            .ordered_indices()
            .into_iter()
            .filter(|&i| i < len)
            .collect();
        if ordered.is_empty() {
            trace!("Preview start ignored: empty selection");
            return false;
        }

        // Cancel-before-replace
        if self.stop() {
            trace!("Previous preview session cancelled by restart");
        }

        let epoch = self.next_epoch;
        self.next_epoch = self.next_epoch.wrapping_add(1);

        let first = ordered[0];
        info!(
            "Preview started: {} frames, {} ms, loop={} (epoch {})",
            ordered.len(),
            config.interval.as_millis(),
            config.looping,
            epoch
        );
        self.preview_index = Some(first);
        self.session = Some(PlaybackSession {
            ordered,
            cursor: 0,
            looping: config.looping,
            timer: RepeatingTimer::start(epoch, config.interval),
        });
        true
    }

    /// Tick channel of the live session, for the event loop to wait on.
    pub fn tick_source(&self) -> Option<TickSource> {
        self.session.as_ref().map(|s| s.timer.source())
    }

    /// Handle a tick delivered by the event loop.
    ///
    /// Ticks from a cancelled or replaced session are ignored.
    pub fn on_tick(&mut self, epoch: u64) -> Option<TickOutcome> {
        let live = self.session.as_ref().map(|s| s.timer.epoch());
        if live != Some(epoch) {
            trace!("Stale tick ignored (epoch {}, live {:?})", epoch, live);
            return None;
        }
        self.advance()
    }

    /// Tick body: move the cursor one step.
    pub fn advance(&mut self) -> Option<TickOutcome> {
        let session = self.session.as_mut()?;

        let next = session.cursor + 1;
        let outcome = if next < session.ordered.len() {
            session.cursor = next;
            TickOutcome::Advanced(session.ordered[next])
        } else if session.looping {
            trace!("Preview loop: {} -> {}", session.cursor, 0);
            session.cursor = 0;
            TickOutcome::Wrapped(session.ordered[0])
        } else {
            let last = session.ordered[session.cursor];
            trace!("Reached end of selection, stopping at frame {}", last);
            TickOutcome::Finished(last)
        };

        self.preview_index = Some(outcome.index());
        if let TickOutcome::Finished(_) = outcome {
            // Drops the timer
            self.session = None;
            info!("Preview finished");
        }
        Some(outcome)
    }

    /// Cancel the live session, if any. Returns true if one was running.
    pub fn stop(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                trace!("Preview stopped (epoch {})", session.timer.epoch());
                true
            }
            None => false,
        }
    }

    /// Teardown path of the owning context.
    pub fn dispose(&mut self) {
        if self.stop() {
            info!("Preview disposed while playing");
        }
    }

    /// Forget the shown index (sequence was replaced).
    pub fn clear_preview_index(&mut self) {
        self.preview_index = None;
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(n: usize) -> FrameSequence {
        let mut s = FrameSequence::new();
        s.initialize((0..n).map(|i| format!("frame_{:02}.png", i)));
        s
    }

    fn cfg(ms: u64, looping: bool) -> PlaybackConfig {
        PlaybackConfig {
            interval: Duration::from_millis(ms),
            looping,
        }
    }

    /// Start, then collect the exposed index after `ticks` advances
    fn observe(ctl: &mut PlaybackController, ticks: usize) -> Vec<usize> {
        let mut seen = vec![ctl.current_preview_index().unwrap()];
        for _ in 0..ticks {
            if ctl.advance().is_none() {
                break;
            }
            if ctl.is_playing() {
                seen.push(ctl.current_preview_index().unwrap());
            }
        }
        seen
    }

    #[test]
    fn test_one_shot_walks_then_halts_on_last() {
        let seq = sequence(5);
        let sel = SelectionSet::all(5);
        let mut ctl = PlaybackController::new();

        assert!(ctl.start(&sel, &seq, cfg(100, false)));
        assert_eq!(observe(&mut ctl, 10), vec![0, 1, 2, 3, 4]);
        assert!(!ctl.is_playing());
        assert_eq!(ctl.current_preview_index(), Some(4));
        assert!(ctl.tick_source().is_none());

        // Further ticks do nothing
        assert_eq!(ctl.advance(), None);
        assert_eq!(ctl.current_preview_index(), Some(4));
    }

    #[test]
    fn test_finish_outcome_reported_once() {
        let seq = sequence(2);
        let sel = SelectionSet::all(2);
        let mut ctl = PlaybackController::new();
        ctl.start(&sel, &seq, cfg(100, false));
        assert_eq!(ctl.advance(), Some(TickOutcome::Advanced(1)));
        assert_eq!(ctl.advance(), Some(TickOutcome::Finished(1)));
        assert_eq!(ctl.advance(), None);
    }

    #[test]
    fn test_loop_cycles_sparse_selection() {
        let seq = sequence(5);
        let mut sel = SelectionSet::all(5);
        sel.toggle(1).unwrap();
        sel.toggle(3).unwrap();

        let mut ctl = PlaybackController::new();
        ctl.start(&sel, &seq, cfg(100, true));
        assert_eq!(observe(&mut ctl, 8), vec![0, 2, 4, 0, 2, 4, 0, 2, 4]);
        assert!(ctl.is_playing());

        ctl.stop();
        assert!(!ctl.is_playing());
        assert_eq!(ctl.advance(), None);
    }

    #[test]
    fn test_wrap_outcome() {
        let seq = sequence(3);
        let mut sel = SelectionSet::all(3);
        sel.clear();
        sel.toggle(2).unwrap();
        let mut ctl = PlaybackController::new();
        ctl.start(&sel, &seq, cfg(100, true));
        assert_eq!(ctl.current_preview_index(), Some(2));
        assert_eq!(ctl.advance(), Some(TickOutcome::Wrapped(2)));
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let seq = sequence(4);
        let mut sel = SelectionSet::all(4);
        sel.clear();
        let mut ctl = PlaybackController::new();

        assert!(!ctl.start(&sel, &seq, cfg(100, true)));
        assert!(!ctl.is_playing());
        assert!(ctl.tick_source().is_none());
        assert_eq!(ctl.current_preview_index(), None);
    }

    #[test]
    fn test_empty_selection_keeps_running_session() {
        let seq = sequence(4);
        let all = SelectionSet::all(4);
        let mut none = SelectionSet::all(4);
        none.clear();

        let mut ctl = PlaybackController::new();
        ctl.start(&all, &seq, cfg(100, true));
        ctl.advance();
        assert!(!ctl.start(&none, &seq, cfg(100, true)));
        assert!(ctl.is_playing());
        assert_eq!(ctl.current_preview_index(), Some(1));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut ctl = PlaybackController::new();
        assert!(!ctl.stop());
        ctl.dispose();
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_restart_leaves_single_live_timer() {
        let seq = sequence(5);
        let sel = SelectionSet::all(5);
        let mut ctl = PlaybackController::new();

        ctl.start(&sel, &seq, cfg(100, true));
        let first = ctl.tick_source().unwrap();
        ctl.advance();
        ctl.advance();

        ctl.start(&sel, &seq, cfg(100, true));
        let second = ctl.tick_source().unwrap();
        assert_ne!(first.epoch, second.epoch);
        assert_eq!(ctl.current_preview_index(), Some(0));

        // Old timer's ticks must not move the cursor
        assert_eq!(ctl.on_tick(first.epoch), None);
        assert_eq!(ctl.current_preview_index(), Some(0));

        // Only the new session advances, one step per tick
        assert_eq!(ctl.on_tick(second.epoch), Some(TickOutcome::Advanced(1)));
        assert_eq!(ctl.on_tick(second.epoch), Some(TickOutcome::Advanced(2)));
    }

    #[test]
    fn test_tick_after_stop_is_noop() {
        let seq = sequence(3);
        let sel = SelectionSet::all(3);
        let mut ctl = PlaybackController::new();
        ctl.start(&sel, &seq, cfg(100, true));
        let src = ctl.tick_source().unwrap();
        ctl.stop();
        assert_eq!(ctl.on_tick(src.epoch), None);
        assert_eq!(ctl.current_preview_index(), Some(0));
    }

    #[test]
    fn test_ten_frames_minus_two_with_real_timer() {
        let seq = sequence(10);
        let mut sel = SelectionSet::all(10);
        sel.toggle(1).unwrap();
        sel.toggle(3).unwrap();

        let mut ctl = PlaybackController::new();
        assert!(ctl.start(&sel, &seq, cfg(2, false)));

        let mut visited = vec![ctl.current_preview_index().unwrap()];
        while let Some(src) = ctl.tick_source() {
            src.ticks.recv().unwrap();
            match ctl.on_tick(src.epoch) {
                Some(TickOutcome::Advanced(i)) => visited.push(i),
                Some(TickOutcome::Finished(_)) => break,
                other => panic!("unexpected tick outcome {:?}", other),
            }
        }

        assert_eq!(visited, vec![0, 2, 4, 5, 6, 7, 8, 9]);
        assert!(!ctl.is_playing());
        assert_eq!(ctl.current_preview_index(), Some(9));
    }

    #[test]
    fn test_session_snapshot_ignores_later_edits() {
        let seq = sequence(4);
        let mut sel = SelectionSet::all(4);
        let mut ctl = PlaybackController::new();
        ctl.start(&sel, &seq, cfg(250, false));

        sel.clear();
        assert_eq!(ctl.session_frames(), Some(&[0, 1, 2, 3][..]));
        assert_eq!(ctl.session_interval(), Some(Duration::from_millis(250)));
    }
}
