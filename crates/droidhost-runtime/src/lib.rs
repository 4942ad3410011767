//! Thin wrapper around a container runtime CLI (`docker` by default).
//!
//! Every external invocation goes through [`ProcessRunner`], so callers can
//! swap the real subprocess runner for a scripted one.

mod container;
mod runner;

pub use container::{ContainerRuntime, ContainerSpec};
pub use runner::TokioProcessRunner;

use async_trait::async_trait;

const MAX_DETAIL_BYTES: usize = 4 * 1024;

/// Captured result of one finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output.
    ///
    /// An `Err` means the process could not be executed at all. A process that
    /// ran and exited non-zero is reported through [`ProcessOutput::exit_code`].
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProcessOutput>;
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("exec `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", describe_failure(.code, .detail))]
    Failed { code: Option<i32>, detail: String },
}

impl RuntimeError {
    pub(crate) fn from_output(out: &ProcessOutput) -> Self {
        let stderr = out.stderr.trim();
        let detail = if stderr.is_empty() {
            out.stdout.trim()
        } else {
            stderr
        };
        RuntimeError::Failed {
            code: out.exit_code,
            detail: truncate_utf8(detail, MAX_DETAIL_BYTES),
        }
    }
}

fn describe_failure(code: &Option<i32>, detail: &str) -> String {
    let status = match *code {
        Some(c) => format!("exit status {c}"),
        None => "terminated by signal".to_string(),
    };
    if detail.is_empty() {
        status
    } else {
        format!("{status}: {detail}")
    }
}

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let suffix = "…(truncated)";
    let keep = max_bytes.saturating_sub(suffix.len()).max(1);
    let mut end = keep.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = s[..end].to_string();
    out.push_str(suffix);
    out
}
