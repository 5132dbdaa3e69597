//! Curation engine - frame sequence, selection, preview playback, events.
//!
//! Independent of transport: the REST server and the runner drive it, tests
//! drive it directly.

pub mod curation;
pub mod curation_events;
pub mod error;
pub mod event_bus;
pub mod playback;
pub mod selection;
pub mod sequence;
pub mod timer;

pub use curation::{Curation, PreviewSettings};
pub use error::CurationError;
pub use event_bus::{EventBus, EventEmitter};
pub use playback::{PlaybackConfig, PlaybackController, TickOutcome};
pub use selection::{SelectionMode, SelectionSet};
pub use sequence::{Frame, FrameSequence};
pub use timer::{RepeatingTimer, TickSource};
