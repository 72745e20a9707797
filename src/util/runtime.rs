use std::path::PathBuf;

/// Directory for helper binaries, settings and synthesized audio.
pub fn runtime_dir() -> PathBuf {
    dir_from_env("READER_RUNTIME_DIR").unwrap_or_else(|| PathBuf::from("runtime"))
}

pub fn voices_dir() -> PathBuf {
    dir_from_env("READER_VOICES_DIR").unwrap_or_else(|| PathBuf::from("assets/voices"))
}

pub fn output_dir() -> PathBuf {
    dir_from_env("READER_OUTPUT_DIR").unwrap_or_else(|| runtime_dir().join("output"))
}

fn dir_from_env(key: &str) -> Option<PathBuf> {
    let value = std::env::var_os(key)?;
    let candidate = PathBuf::from(value);
    if candidate.components().next().is_some() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn empty_override_falls_back() {
        std::env::set_var("READER_RUNTIME_DIR", "");
        let dir = runtime_dir();
        std::env::remove_var("READER_RUNTIME_DIR");
        assert_eq!(dir, PathBuf::from("runtime"));
    }

    #[test]
    #[serial]
    fn output_dir_follows_runtime_dir() {
        std::env::remove_var("READER_OUTPUT_DIR");
        std::env::set_var("READER_RUNTIME_DIR", "/tmp/reader-rt");
        let dir = output_dir();
        std::env::remove_var("READER_RUNTIME_DIR");
        assert_eq!(dir, PathBuf::from("/tmp/reader-rt/output"));
    }
}
