//! Application runner - owns the Curation and drives it from one thread.
//!
//! The loop waits on two sources with `crossbeam_channel::select!`:
//! - API commands from the REST server (or nothing with `--no-server`)
//! - ticks of the live preview session, tagged with the session epoch
//!
//! After every change the shared snapshot is refreshed and the event bus is
//! drained. Every exit path goes through `shutdown()`, which disposes the
//! preview timer and persists the preview settings.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, never, select};
use log::{debug, info, trace, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::backend::HttpBackend;
use crate::cli::Args;
use crate::core::curation_events::{
    FramesLoadedEvent, PreviewIndexChangedEvent, PreviewStartedEvent, PreviewStoppedEvent,
    StopReason,
};
use crate::core::event_bus::downcast_event;
use crate::core::{Curation, CurationError, EventBus, PreviewSettings};
use crate::paths::{self, PathConfig};
use crate::server::{ApiCommand, ApiServer, ApiServices, CurationOp, CurationSnapshot, SharedApiState};
use crate::storage::{HISTORY_FILE, HistoryStore, SETTINGS_FILE, SettingsKind, SettingsStore};

/// Whether the loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Apply one curation mutation. Starting with nothing selected is not an error.
pub fn apply_op(curation: &mut Curation, op: CurationOp) -> Result<(), CurationError> {
    match op {
        CurationOp::LoadFrames(frames) => curation.load_frames(frames),
        CurationOp::ToggleSelection(index) => curation.toggle_selection(index)?,
        CurationOp::ToggleSelectAll => curation.toggle_select_all(),
        CurationOp::Reorder { from, to } => curation.reorder(from, to)?,
        CurationOp::SetSpeed(ms) => curation.set_speed(ms)?,
        CurationOp::SetLoop(looping) => curation.set_loop(looping),
        CurationOp::SetSelectionMode(mode) => curation.set_selection_mode(mode),
        CurationOp::ApplySettings(preview) => curation.apply_settings(preview)?,
        CurationOp::StartPreview => {
            if !curation.start_preview() {
                debug!("Preview not started: nothing selected");
            }
        }
        CurationOp::StopPreview => curation.stop_preview(),
    }
    Ok(())
}

/// Read frame URIs from a file: a JSON array, or one URI per line.
pub fn load_frames_file(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read frames file {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON frame list in {}", path.display()));
    }
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Single-threaded owner of the curation state
pub struct Runner {
    curation: Curation,
    bus: EventBus,
    state: Arc<SharedApiState>,
    settings: Arc<Mutex<SettingsStore>>,
    exit_on_finish: bool,
}

impl Runner {
    pub fn new(
        preview: PreviewSettings,
        state: Arc<SharedApiState>,
        settings: Arc<Mutex<SettingsStore>>,
        exit_on_finish: bool,
    ) -> Self {
        let bus = EventBus::new();
        bus.subscribe::<PreviewIndexChangedEvent, _>(|e| trace!("Preview index -> {}", e.0));
        let curation = Curation::new(preview).with_emitter(bus.emitter());
        state.update(&curation);
        Self {
            curation,
            bus,
            state,
            settings,
            exit_on_finish,
        }
    }

    pub fn curation(&self) -> &Curation {
        &self.curation
    }

    pub fn curation_mut(&mut self) -> &mut Curation {
        &mut self.curation
    }

    /// Run until shutdown. `None` means no command source: the loop ends
    /// once nothing is playing.
    pub fn run(&mut self, commands: Option<Receiver<ApiCommand>>) -> Result<()> {
        let serving = commands.is_some();
        let commands = commands.unwrap_or_else(never);
        self.state.update(&self.curation);
        // Events emitted before the loop (startup load/autoplay)
        if self.drain_events() == Flow::Exit {
            return self.shutdown();
        }

        loop {
            if !serving && !self.curation.is_playing() {
                info!("Nothing playing and no API server, exiting");
                break;
            }

            let source = self.curation.tick_source();
            let epoch = source.as_ref().map_or(0, |s| s.epoch);
            let ticks = source.map(|s| s.ticks).unwrap_or_else(never);

            let flow = select! {
                recv(commands) -> msg => match msg {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(_) => {
                        info!("Command channel closed");
                        Flow::Exit
                    }
                },
                recv(ticks) -> tick => {
                    if tick.is_ok() && self.curation.on_tick(epoch).is_some() {
                        self.state.update(&self.curation);
                    }
                    Flow::Continue
                },
            };

            if flow == Flow::Exit || self.drain_events() == Flow::Exit {
                break;
            }
        }

        self.shutdown()
    }

    fn handle_command(&mut self, cmd: ApiCommand) -> Flow {
        match cmd {
            ApiCommand::Curation { op, reply } => {
                trace!("API command: {:?}", op);
                let persist = matches!(op, CurationOp::ApplySettings(_));
                let result = apply_op(&mut self.curation, op).map_err(|e| {
                    warn!("Rejected curation command: {}", e);
                    e.to_string()
                });
                if persist
                    && result.is_ok()
                    && let Err(e) = self.persist_settings()
                {
                    warn!("{:#}", e);
                }
                self.state.update(&self.curation);
                if let Some(reply) = reply {
                    // Handler may have timed out and gone away
                    let _ = reply.send(result.map(|_| CurationSnapshot::capture(&self.curation)));
                }
                Flow::Continue
            }
            ApiCommand::Shutdown => {
                info!("Shutdown requested");
                Flow::Exit
            }
        }
    }

    /// Log queued events; a finished one-shot preview ends the run with `--exit-on-finish`.
    fn drain_events(&self) -> Flow {
        let mut flow = Flow::Continue;
        for event in self.bus.poll() {
            if let Some(e) = downcast_event::<FramesLoadedEvent>(&event) {
                info!("Frames loaded: {}", e.count);
            } else if let Some(e) = downcast_event::<PreviewStartedEvent>(&event) {
                info!("Preview started at {} ({} frames)", e.first, e.frames);
            } else if let Some(e) = downcast_event::<PreviewStoppedEvent>(&event) {
                info!("Preview stopped ({:?}), last index {:?}", e.reason, e.last);
                if e.reason == StopReason::Finished && self.exit_on_finish {
                    flow = Flow::Exit;
                }
            }
        }
        flow
    }

    /// Dispose the preview and persist its settings.
    fn shutdown(&mut self) -> Result<()> {
        self.curation.dispose();
        self.state.update(&self.curation);
        self.drain_events();
        self.persist_settings()
    }

    fn persist_settings(&self) -> Result<()> {
        let mut settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        settings
            .save(SettingsKind::FramePreview, self.curation.settings())
            .context("Failed to persist preview settings")
    }
}

/// Run frameforge with the given arguments.
pub fn run_app(args: Args) -> Result<()> {
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = paths::ensure_dirs(&path_config) {
        warn!("Failed to create application directories: {:#}", e);
    }

    let settings_path = paths::config_file(SETTINGS_FILE, &path_config);
    let history_path = paths::data_file(HISTORY_FILE, &path_config);
    info!("Settings: {}", settings_path.display());
    info!("History: {}", history_path.display());

    let settings = Arc::new(Mutex::new(SettingsStore::load(settings_path)));
    let mut preview = settings
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get::<PreviewSettings>(SettingsKind::FramePreview)
        .unwrap_or_default();
    if let Some(ms) = args.interval_ms {
        if ms == 0 {
            bail!("--interval must be greater than 0");
        }
        preview.interval_ms = ms;
    }
    if let Some(l) = args.loop_playback {
        preview.looping = l != 0;
    }
    debug!("Preview settings: {:?}", preview);

    let state = Arc::new(SharedApiState::default());
    let mut runner = Runner::new(preview, Arc::clone(&state), Arc::clone(&settings), args.exit_on_finish);

    if let Some(path) = &args.frames {
        let frames = load_frames_file(path)?;
        runner.curation_mut().load_frames(frames);
    }
    if args.autoplay && !runner.curation_mut().start_preview() {
        warn!("--autoplay: nothing to preview");
    }

    let commands = if args.no_server {
        None
    } else {
        let services = ApiServices {
            state,
            backend: Arc::new(HttpBackend::new(args.backend_url.as_str())),
            history: Arc::new(Mutex::new(HistoryStore::load(history_path))),
            settings,
            media_dir: paths::data_dir(&path_config),
        };
        info!("Backend: {}", args.backend_url);
        Some(ApiServer::start(args.port, services))
    };

    runner.run(commands)
}
