use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_FILTER: &str = "storyboard=info,storyboard_core=info";

/// Log file name inside the storage directory, used while the TUI owns the screen.
pub const LOG_FILE: &str = "storyboard.log";

/// Initialize `env_logger`. `RUST_LOG` overrides the default filter.
///
/// With `log_file` set, records are appended there instead of stderr.
pub fn init_logger(log_file: Option<&Path>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Warn);

    builder.format(|buf, record| {
        let module_path = record.module_path().unwrap_or("<unknown>");
        writeln!(
            buf,
            "[{}][{}][{}] {}",
            buf.timestamp(),
            record.level(),
            module_path,
            record.args()
        )
    });

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                // Nowhere safe to log while the alternate screen is up
                eprintln!("Could not open log file {}: {e}", path.display());
                builder.target(Target::Pipe(Box::new(std::io::sink())));
            }
        }
    }

    let _ = builder.try_init();
}
