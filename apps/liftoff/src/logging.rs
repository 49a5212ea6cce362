//! Tracing subscriber setup

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,liftoff=info,liftoff_net=info,liftoff_ops=info";
const DEBUG_FILTER: &str = "info,liftoff=debug,liftoff_net=debug,liftoff_ops=debug,liftoff_root=debug";

/// Directory that receives `--debug` log files
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("liftoff")
        .join("logs")
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Open a fresh timestamped log file under [`log_dir`]
fn open_log_file() -> std::io::Result<(PathBuf, std::fs::File)> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!(
        "liftoff-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    Ok((path, file))
}

/// Initialize tracing
///
/// - `--json` silences the console so only the result document reaches
///   stdout; with `--debug` the logs still go to a file.
/// - `--debug` (or `RUST_LOG`) writes JSON logs to a file.
/// - Otherwise human-readable logs go to stderr.
pub fn init_tracing(json_mode: bool, debug_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_flag;

    if debug_enabled {
        match open_log_file() {
            Ok((path, file)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter(DEBUG_FILTER))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", path.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            Err(_) => {}
        }
    }

    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(filter(DEFAULT_FILTER))
            .init();
    }
}
