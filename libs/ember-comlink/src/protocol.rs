//! Builder protocol tokens and response framing
//!
//! Every request is newline-terminated UTF-8. Simple commands open with
//! `STARTUP`, send one directive and read lines until `COMPLETE` or until the
//! builder closes the connection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComlinkError, Result};

pub use ember_model::wire::{BEGINDATA, ENDDATA, SHUTDOWN, STARTJOB, STARTUP};

/// End of a simple command's response
pub const COMPLETE: &str = "COMPLETE";

pub const GETDEFAULTS: &str = "GETDEFAULTS";
pub const LIST_TIMEZONES: &str = "LIST_TIMEZONES";
pub const GET_LICENSES: &str = "GET_LICENSES";

/// Which job listing to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobListKind {
    Complete,
    Running,
    Queued,
}

impl JobListKind {
    pub fn directive(self) -> &'static str {
        match self {
            JobListKind::Complete => "LIST_OPTIONS_COMPLETE",
            JobListKind::Running => "LIST_OPTIONS_RUNNING",
            JobListKind::Queued => "LIST_OPTIONS_QUEUED",
        }
    }
}

/// One simple-command directive line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    GetDefaults,
    ListTimezones,
    GetLicenses,
    Tar(&'a str),
    Zip(&'a str),
    Delete(&'a str),
    StopJob { job: &'a str, priority: u16 },
    ListJobs(JobListKind),
}

impl Directive<'_> {
    /// Job name the directive targets, if any
    fn job(&self) -> Option<&str> {
        match self {
            Directive::Tar(job) | Directive::Zip(job) | Directive::Delete(job) => Some(*job),
            Directive::StopJob { job, .. } => Some(*job),
            _ => None,
        }
    }

    /// Reject job names that would break the line framing
    pub fn check(&self) -> Result<()> {
        match self.job() {
            Some(job) if job.trim().is_empty() => {
                Err(ComlinkError::InvalidArgument("job name is empty".to_string()))
            },
            Some(job) if job.contains(|c: char| matches!(c, '\n' | '\r' | '|')) => {
                Err(ComlinkError::InvalidArgument(format!(
                    "job name '{}' contains a line break or '|'",
                    job.escape_debug()
                )))
            },
            _ => Ok(()),
        }
    }

    /// Full request: `STARTUP` then the directive
    pub fn request(&self) -> String {
        format!("{}\n{}\n", STARTUP, self)
    }
}

impl fmt::Display for Directive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::GetDefaults => write!(f, "{}", GETDEFAULTS),
            Directive::ListTimezones => write!(f, "{}", LIST_TIMEZONES),
            Directive::GetLicenses => write!(f, "{}", GET_LICENSES),
            Directive::Tar(job) => write!(f, "TAR {}", job),
            Directive::Zip(job) => write!(f, "ZIP {}", job),
            Directive::Delete(job) => write!(f, "DELETE {}", job),
            Directive::StopJob { job, priority } => write!(f, "STOP_JOB {}|{}", job, priority),
            Directive::ListJobs(kind) => write!(f, "{}", kind.directive()),
        }
    }
}

/// Accumulates response bytes into lines up to the `COMPLETE` sentinel
#[derive(Debug, Default)]
pub struct ResponseLines {
    pending: Vec<u8>,
    lines: Vec<String>,
    complete: bool,
}

impl ResponseLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one received chunk; returns true once `COMPLETE` has been seen
    ///
    /// Bytes after the sentinel are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.complete {
            return true;
        }
        self.pending.extend_from_slice(chunk);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..pos]);
            let line = line.trim_end_matches('\r');
            if line == COMPLETE {
                self.complete = true;
                self.pending.clear();
                break;
            }
            self.lines.push(line.to_string());
        }
        self.complete
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Lines received so far, plus any unterminated tail
    pub fn finish(mut self) -> Vec<String> {
        if !self.complete && !self.pending.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending);
            let tail = tail.trim_end_matches('\r');
            if tail != COMPLETE {
                self.lines.push(tail.to_string());
            }
        }
        self.lines
    }
}
