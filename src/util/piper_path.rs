use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PiperCommand {
    Executable(PathBuf),
    PythonModule,
    /// Program plus leading arguments taken from `READER_PIPER_COMMAND`.
    Custom(Vec<String>),
}

#[derive(Debug, Error)]
pub enum PiperPathError {
    #[error("READER_PIPER_COMMAND is empty")]
    EmptyOverride,
    #[error("piper was not found in the runtime directory or PATH, and python is unavailable")]
    Unavailable,
}

/// Locate Piper: explicit override, bundled executable, `piper` on PATH, then `python -m piper`.
pub fn resolve(runtime_dir: &Path) -> Result<PiperCommand, PiperPathError> {
    if let Some(raw) = std::env::var_os("READER_PIPER_COMMAND") {
        let parts: Vec<String> = shlex::Shlex::new(&raw.to_string_lossy()).collect();
        if parts.is_empty() {
            return Err(PiperPathError::EmptyOverride);
        }
        return Ok(PiperCommand::Custom(parts));
    }

    let candidate =
        runtime_dir
            .join("piper")
            .join(if cfg!(windows) { "piper.exe" } else { "piper" });
    if candidate.exists() {
        return Ok(PiperCommand::Executable(candidate));
    }

    if let Ok(path) = which::which("piper") {
        return Ok(PiperCommand::Executable(path));
    }

    if which::which("python").is_ok() {
        return Ok(PiperCommand::PythonModule);
    }

    Err(PiperPathError::Unavailable)
}

pub fn command_to_args(cmd: &PiperCommand) -> (OsString, Vec<OsString>) {
    match cmd {
        PiperCommand::Executable(path) => (path.as_os_str().into(), vec![]),
        PiperCommand::PythonModule => (
            OsString::from("python"),
            vec!["-m".into(), "piper".into()],
        ),
        PiperCommand::Custom(parts) => {
            let mut parts = parts.iter().map(OsString::from);
            let program = parts.next().unwrap_or_default();
            (program, parts.collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn prefers_bundled_executable() {
        std::env::remove_var("READER_PIPER_COMMAND");
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("piper");
        std::fs::create_dir_all(&dir).unwrap();
        let exe = dir.join(if cfg!(windows) { "piper.exe" } else { "piper" });
        std::fs::write(&exe, b"").unwrap();
        assert_eq!(resolve(temp.path()).unwrap(), PiperCommand::Executable(exe));
    }

    #[test]
    #[serial]
    fn override_is_shell_split() {
        std::env::set_var("READER_PIPER_COMMAND", "python3 '/opt/my piper/run.py'");
        let resolved = resolve(Path::new("unused"));
        std::env::remove_var("READER_PIPER_COMMAND");
        let cmd = resolved.unwrap();
        assert_eq!(
            cmd,
            PiperCommand::Custom(vec!["python3".into(), "/opt/my piper/run.py".into()])
        );
        let (program, args) = command_to_args(&cmd);
        assert_eq!(program, OsString::from("python3"));
        assert_eq!(args, vec![OsString::from("/opt/my piper/run.py")]);
    }

    #[test]
    fn python_module_args() {
        let (program, args) = command_to_args(&PiperCommand::PythonModule);
        assert_eq!(program, OsString::from("python"));
        assert_eq!(args, vec![OsString::from("-m"), OsString::from("piper")]);
    }
}
