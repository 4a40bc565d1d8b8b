use crate::error::Result;
use log::info;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Line-oriented text sink.
///
/// The target file is truncated when the writer is created. Every write then
/// reopens the file in append mode and closes it again, so the file on disk is
/// complete after each call.
#[derive(Debug, Clone)]
pub struct TextWriter {
    path: PathBuf,
}

impl TextWriter {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    /// * Returns `SamplerError::Io` if the file cannot be created
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::create(&path)?;
        Ok(TextWriter { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` and a newline. When `echo` is set the line is also logged.
    pub fn write_line(&self, line: &str, echo: bool) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        if echo {
            info!("{}", line);
        }
        Ok(())
    }

    /// Appends a two-line FASTA-like record: `>label` then `sequence`
    pub fn write_record(&self, label: usize, sequence: &str) -> Result<()> {
        self.write_line(&format!(">{}", label), false)?;
        self.write_line(sequence, false)
    }
}
