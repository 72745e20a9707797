use std::path::{Path, PathBuf};

use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Start file logging under `logs/`; later calls are no-ops.
pub fn init() -> anyhow::Result<()> {
    init_in(&log_dir())
}

pub fn init_in(log_dir: &Path) -> anyhow::Result<()> {
    LOGGER.get_or_try_init(|| -> anyhow::Result<()> {
        std::fs::create_dir_all(log_dir)?;
        let handle = Logger::try_with_env_or_str("info")?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename("reader")
                    .suffix("log"),
            )
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::AgeOrSize(Age::Day, 5_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(7),
            )
            .start()?;
        // Dropping the handle shuts the file writer down.
        std::mem::forget(handle);
        Ok(())
    })?;
    Ok(())
}

fn log_dir() -> PathBuf {
    PathBuf::from("logs")
}
