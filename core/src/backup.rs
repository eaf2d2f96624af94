use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Copy of the previous contents, when backups are kept.
    pub backup_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("could not create backup: {0}")]
    BackupCreate(String),
}

/// Replace `target` with `contents` through a sibling temporary file.
///
/// With `keep_backup`, the current file is first copied to
/// `<name>.bak.<timestamp>` next to it.
pub fn backup_and_swap(target: &Path, contents: &[u8], keep_backup: bool) -> Result<WriteOutcome, WriteError> {
    let parent = target
        .parent()
        .ok_or_else(|| WriteError::BackupCreate("target has no parent directory".into()))?;

    let backup_path = if keep_backup && target.exists() {
        let timestamp = Local::now().format("%Y%m%d%H%M%S");
        let mut name = target
            .file_name()
            .ok_or_else(|| WriteError::BackupCreate("target has no file name".into()))?
            .to_os_string();
        name.push(format!(".bak.{timestamp}"));
        let candidate = parent.join(name);

        fs::copy(target, &candidate).map_err(|err| WriteError::BackupCreate(err.to_string()))?;
        Some(candidate)
    } else {
        None
    };

    let temp_path = build_temp_path(target);
    let written = write_synced(&temp_path, contents).and_then(|()| swap(&temp_path, target));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(WriteError::Io(err));
    }

    Ok(WriteOutcome { backup_path })
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(target_os = "windows")]
fn swap(temp_path: &Path, target: &Path) -> io::Result<()> {
    use std::io::ErrorKind;
    match fs::rename(temp_path, target) {
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(target)?;
            fs::rename(temp_path, target)
        }
        other => other,
    }
}

#[cfg(not(target_os = "windows"))]
fn swap(temp_path: &Path, target: &Path) -> io::Result<()> {
    fs::rename(temp_path, target)
}

fn build_temp_path(target: &Path) -> PathBuf {
    let mut temp = target.to_path_buf();
    let pid = std::process::id();
    let suffix = format!("__tmp__pid_{}", pid);
    match temp.file_name() {
        Some(name) => {
            let mut os_string = name.to_os_string();
            os_string.push(suffix);
            temp.set_file_name(os_string);
        }
        None => {
            temp.push(format!("temp_{pid}"));
        }
    }
    temp
}
