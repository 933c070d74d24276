use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home_dir().join(".rehearse")
}

fn flag_path() -> PathBuf {
    config_dir().join("auth.json")
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthFlag {
    authenticated: bool,
}

fn read_flag_file(path: &Path) -> Result<bool, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let flag: AuthFlag = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    Ok(flag.authenticated)
}

fn write_flag_file(dir: &Path, path: &Path, authenticated: bool) -> io::Result<()> {
    let tmp_path = dir.join("auth.json.tmp");
    let bytes = serde_json::to_vec_pretty(&AuthFlag { authenticated })
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

/// Reads the persisted login flag. A missing file means logged out; an
/// unreadable one also means logged out, with a warning for the diagnostics
/// log.
pub fn load() -> (bool, Option<String>) {
    let path = flag_path();
    if !path.exists() {
        return (false, None);
    }
    match read_flag_file(&path) {
        Ok(authenticated) => (authenticated, None),
        Err(warning) => (false, Some(warning)),
    }
}

/// Persists the login flag with a write-then-rename so a crash never leaves
/// a half-written file behind.
pub fn save(authenticated: bool) -> io::Result<()> {
    let dir = config_dir();
    fs::create_dir_all(&dir)?;
    write_flag_file(&dir, &flag_path(), authenticated)
}

#[cfg(test)]
mod tests {
    use super::{read_flag_file, write_flag_file};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "rehearse_auth_store_{prefix}_{}_{}",
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    #[test]
    fn flag_roundtrips_through_disk() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("auth.json");

        write_flag_file(&dir, &path, true).expect("flag should write");
        assert!(read_flag_file(&path).expect("flag should read"));

        write_flag_file(&dir, &path, false).expect("flag should overwrite");
        assert!(!read_flag_file(&path).expect("flag should read again"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_flag_file_reports_a_warning() {
        let dir = temp_dir("corrupt");
        let path = dir.join("auth.json");
        fs::write(&path, "not json").expect("fixture should write");

        let error = read_flag_file(&path).expect_err("corrupt flag should fail");
        assert!(error.contains("failed to parse"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_flag_file_fails_to_read() {
        let dir = temp_dir("missing");
        let path = dir.join("auth.json");
        assert!(read_flag_file(&path).is_err());
        let _ = fs::remove_dir_all(dir);
    }
}
