//! frameforge - frame curation and preview for generated sprite animations
//!
//! Re-exports all modules for use by the binary target.

// Curation engine (sequence, selection, playback, events)
pub mod core;

// Generation backend client
pub mod backend;

// App modules
pub mod cli;
pub mod paths;
pub mod runner;
pub mod server;
pub mod storage;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use core::{Curation, CurationError, Frame, FrameSequence, PreviewSettings, SelectionMode, SelectionSet};

pub use backend::{BackendError, GenerationBackend, HttpBackend};
