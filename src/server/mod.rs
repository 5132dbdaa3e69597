//! REST API server for remote control of frame curation and generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────┐    crossbeam channel    ┌───────────────────────┐
//! │   API Server Thread         │  ─── ApiCommand ─────▶  │   Runner Thread       │
//! │   (rouille HTTP)            │                         │   (select! loop)      │
//! │                             │  ◀── OpReply ─────────  │                       │
//! │  POST /api/curation/toggle/3│                         │  Curation + ticks     │
//! │  POST /api/preview/start    │                         │                       │
//! └─────────────────────────────┘                         └───────────────────────┘
//!          │                                                      │
//!          │  Arc<SharedApiState> (RwLock)                        │
//!          │◀──────────── read snapshots ─────────────────────────│
//!          │                                        updated after every change
//!          │
//!          └──▶ GenerationBackend (ureq), HistoryStore, SettingsStore
//! ```
//!
//! # Endpoints
//!
//! | Method   | Path                              | Description                          |
//! |----------|-----------------------------------|--------------------------------------|
//! | GET      | `/api/health`                     | Health check                         |
//! | GET      | `/api/curation`                   | Curation snapshot                    |
//! | POST     | `/api/curation/frames`            | Load frames `{ "frames": [...] }`    |
//! | POST     | `/api/curation/split`             | Extract frames via backend and load  |
//! | POST     | `/api/curation/toggle/{i}`        | Toggle selection of position i       |
//! | POST     | `/api/curation/toggle-all`        | Select all / clear                   |
//! | POST     | `/api/curation/reorder/{from}/{to}` | Move a frame                       |
//! | POST     | `/api/curation/speed/{ms}`        | Preview interval (next start)        |
//! | POST     | `/api/curation/loop/{0\|1}`       | Loop mode (next start)               |
//! | POST     | `/api/curation/mode/{positional\|follow}` | Selection mode on reorder    |
//! | POST     | `/api/preview/start`              | Start preview of the selection       |
//! | POST     | `/api/preview/stop`               | Stop preview                         |
//! | POST     | `/api/generate/{image\|prompt\|animation\|chiptune}` | Proxy to backend  |
//! | GET      | `/api/history[?kind=...]`         | Generation history, newest first     |
//! | POST     | `/api/history/clear`              | Drop history                         |
//! | GET/POST | `/api/settings/{kind}`            | Read / store a settings document (`frame_preview` goes to the runner) |
//! | POST     | `/api/shutdown`                   | Stop the runner                      |

mod api;

pub use api::{
    ApiCommand, ApiServer, ApiServices, CurationOp, CurationSnapshot, OpReply, SharedApiState,
};
