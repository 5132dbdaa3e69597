use clap::Parser;
use std::path::PathBuf;

use crate::backend::DEFAULT_BACKEND_URL;

/// Default REST API port
pub const DEFAULT_PORT: u16 = 8765;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "HTTP:   rouille (server), ureq (client)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Frame curation and preview service for generated sprite animations
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// REST API port
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Don't start the REST API (useful with --frames --autoplay --exit-on-finish)
    #[arg(long = "no-server")]
    pub no_server: bool,

    /// Generation backend base URL
    #[arg(short = 'b', long = "backend-url", value_name = "URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Load frames from a file: JSON array of URIs or one URI per line
    #[arg(short = 'f', long = "frames", value_name = "FILE")]
    pub frames: Option<PathBuf>,

    /// Preview interval in milliseconds (overrides stored settings)
    #[arg(short = 'i', long = "interval", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Loop preview (overrides stored settings)
    #[arg(short = 'o', long = "loop", value_name = "0|1", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub loop_playback: Option<u8>,

    /// Start preview of loaded frames on startup
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Exit when a non-looping preview finishes
    #[arg(long = "exit-on-finish")]
    pub exit_on_finish: bool,

    /// Enable debug logging to file (default: frameforge.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
