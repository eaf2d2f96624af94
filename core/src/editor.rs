/// External editor round trip
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("failed to prepare temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("failed to launch editor '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read edited file: {0}")]
    ReadBack(#[source] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Something that lets a person change the contents of a file in place.
pub trait Editor {
    /// Returns once editing has finished.
    fn edit(&self, path: &Path) -> Result<(), EditorError>;
}

impl<F> Editor for F
where
    F: Fn(&Path) -> Result<(), EditorError>,
{
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        self(path)
    }
}

/// Interactive program started with the file path as last argument.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        log::debug!("launching {} for {}", self.program, path.display());

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|source| EditorError::Launch {
                program: self.program.clone(),
                source,
            })?;

        // only the file content matters
        if !status.success() {
            log::debug!("editor exited with {}", status);
        }
        Ok(())
    }
}

/// Hand `initial` to `editor` and return the text it left behind.
///
/// The temporary file is removed when this returns, on success or error.
pub fn edit_text(editor: &dyn Editor, initial: &str) -> Result<String, EditorError> {
    let mut file = tempfile::Builder::new()
        .prefix("translation-")
        .suffix(".json")
        .tempfile()
        .map_err(EditorError::TempFile)?;
    file.write_all(initial.as_bytes()).map_err(EditorError::TempFile)?;
    file.flush().map_err(EditorError::TempFile)?;

    editor.edit(file.path())?;

    fs::read_to_string(file.path()).map_err(EditorError::ReadBack)
}
