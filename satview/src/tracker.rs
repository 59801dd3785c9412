//! Invocation of the external tracker executable

use crate::config;
use std::{
    borrow::Cow,
    io,
    path::PathBuf,
    process::{Command, ExitStatus},
};
use tracing::{debug, trace, warn};
use trackproto::LINE_DELIMITER;
use tracktypes::prelude::TrackerMode;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Failed to run tracker '{}'", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Tracker '{}' exited with {status}: {stderr}", program.display())]
    Status {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tracker {
    program: PathBuf,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Tracker {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn from_config(cfg: &config::Tracker) -> Self {
        Self {
            program: cfg.program.clone(),
            leading_args: cfg.args.clone(),
            working_dir: cfg.working_dir.clone(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command(&self, mode: &TrackerMode) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).arg(mode.as_arg());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run the tracker in the given mode and return its stdout lines
    pub fn invoke(&self, mode: &TrackerMode) -> Result<Vec<String>, TrackerError> {
        debug!(program = %self.program.display(), %mode, "Invoking tracker");
        let output = self
            .command(mode)
            .output()
            .map_err(|source| TrackerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TrackerError::Status {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let lines = split_lines(&output.stdout);
        debug!(%mode, lines = lines.len(), "Tracker output");
        for line in lines.iter() {
            trace!(%line);
        }
        Ok(lines)
    }
}

/// Decode the tracker's stdout and split it on newlines.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn split_lines(stdout: &[u8]) -> Vec<String> {
    let text: Cow<str> = match std::str::from_utf8(stdout) {
        Ok(t) => t.into(),
        Err(e) => {
            warn!(error = %e, "Tracker output is not valid UTF-8");
            String::from_utf8_lossy(stdout)
        }
    };
    text.split(LINE_DELIMITER)
        .map(|l| l.trim_end_matches('\r').to_owned())
        .collect()
}
