use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// HTML-to-PDF collaborator: lays out `html`, resolving relative links and
/// images against `base_dir`, styled by `stylesheet`.
pub trait PdfEngine {
    fn render(&self, html: &str, base_dir: &Path, stylesheet: &Path) -> Result<Vec<u8>, PdfError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF engine `{0}` not found in PATH")]
    EngineNotFound(String),

    #[error("failed to run PDF engine `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to exchange data with PDF engine")]
    Io(#[from] io::Error),

    #[error("PDF engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },
}

/// Runs the `weasyprint` command line tool, HTML on stdin, PDF on stdout.
#[derive(Debug, Clone)]
pub struct WeasyPrint {
    program: String,
}

impl WeasyPrint {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, base_dir: &Path, stylesheet: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--base-url")
            .arg(base_dir)
            .arg("--stylesheet")
            .arg(stylesheet)
            .arg("-")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl PdfEngine for WeasyPrint {
    fn render(&self, html: &str, base_dir: &Path, stylesheet: &Path) -> Result<Vec<u8>, PdfError> {
        log::debug!(
            "{} --base-url {} --stylesheet {}",
            self.program,
            base_dir.display(),
            stylesheet.display()
        );

        let mut child = self
            .command(base_dir, stylesheet)
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => PdfError::EngineNotFound(self.program.clone()),
                _ => PdfError::Spawn {
                    program: self.program.clone(),
                    source,
                },
            })?;

        // The engine reads all of stdin before writing, so stdin is closed
        // before waiting on the output.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(html.as_bytes()),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(PdfError::EngineFailed {
                status: output.status.to_string(),
                stderr: last_line(&String::from_utf8_lossy(&output.stderr)),
            });
        }
        written?;
        Ok(output.stdout)
    }
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no output")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_is_reported_by_name() {
        let engine = WeasyPrint::new("course-pdf-no-such-engine");
        let err = engine
            .render("<p>x</p>", Path::new("."), Path::new("style.css"))
            .unwrap_err();

        assert!(matches!(err, PdfError::EngineNotFound(_)));
        assert_eq!(
            err.to_string(),
            "PDF engine `course-pdf-no-such-engine` not found in PATH"
        );
    }

    #[test]
    fn command_passes_base_url_and_stylesheet() {
        let engine = WeasyPrint::new("weasyprint");
        let cmd = engine.command(Path::new("/course/cm1-td"), Path::new("/course/assets/pdf.css"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "weasyprint");
        assert_eq!(
            args,
            [
                "--base-url",
                "/course/cm1-td",
                "--stylesheet",
                "/course/assets/pdf.css",
                "-",
                "-"
            ]
        );
    }

    #[cfg(unix)]
    fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn engine_output_is_returned_as_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let engine = WeasyPrint::new(script(&dir, "echo-engine", "cat"));
        let html = "<!doctype html><p>Énoncé</p>";

        let pdf = engine
            .render(html, Path::new("."), Path::new("style.css"))
            .unwrap();

        assert_eq!(pdf, html.as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_last_stderr_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let engine = WeasyPrint::new(script(
            &dir,
            "failing-engine",
            "echo 'WARNING: ignored rule' >&2\necho 'ERROR: bad stylesheet' >&2\nexit 1",
        ));

        let err = engine
            .render("<p>x</p>", Path::new("."), Path::new("style.css"))
            .unwrap_err();

        match &err {
            PdfError::EngineFailed { stderr, .. } => assert_eq!(stderr, "ERROR: bad stylesheet"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().ends_with(": ERROR: bad stylesheet"));
    }

    #[test]
    fn last_line_skips_trailing_blanks() {
        assert_eq!(last_line("WARNING: x\nERROR: bad css\n\n"), "ERROR: bad css");
        assert_eq!(last_line(""), "no output");
    }
}
