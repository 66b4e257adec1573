use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

use super::Extractor;

/// Runs the external `7z` tool, which understands both rpm and cpio.
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    program: String,
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        Self::new("7z")
    }
}

impl SevenZipExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, archive: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("x")
            .arg(format!("-o{}", output_dir.display()))
            .arg("-y")
            .arg(archive)
            .stdout(Stdio::null());
        command
    }
}

impl Extractor for SevenZipExtractor {
    #[tracing::instrument(skip(self))]
    fn extract(&self, archive: &Path, output_dir: &Path) -> Result<()> {
        debug!("Extracting {:?} to {:?}", archive, output_dir);
        let output = self
            .command(archive, output_dir)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} failed for {}: {}",
                self.program,
                archive.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let extractor = SevenZipExtractor::default();
        let command = extractor.command(Path::new("/cache/zlib.rpm"), Path::new("/out"));

        assert_eq!(command.get_program(), "7z");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["x", "-o/out", "-y", "/cache/zlib.rpm"]);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let extractor = SevenZipExtractor::new("rpmfetch-no-such-7z");
        let err = extractor
            .extract(Path::new("zlib.rpm"), Path::new("out"))
            .unwrap_err();
        assert!(err.to_string().contains("rpmfetch-no-such-7z"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_an_error() {
        let extractor = SevenZipExtractor::new("false");
        assert!(extractor.extract(Path::new("zlib.rpm"), Path::new("out")).is_err());
    }
}
