// LaTeX → PDF compilation.
// Every job owns a scratch directory under the configured root; the directory
// is removed before `compile` returns, whatever the outcome.

pub mod latex;
pub mod sweep;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use latex::{LatexCompiler, LatexSettings};
pub use sweep::spawn_sweep_worker;

/// Prefix of every job scratch directory. The sweep only touches names with it.
pub const JOB_DIR_PREFIX: &str = "job-";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("LaTeX compilation failed on pass {pass} ({status})")]
    Failed {
        pass: u8,
        status: String,
        log: Option<String>,
    },

    #[error("LaTeX compilation timed out after {}s", .timeout.as_secs())]
    TimedOut {
        timeout: Duration,
        log: Option<String>,
    },

    #[error("LaTeX compiler exited successfully but produced no PDF")]
    MissingArtifact { log: Option<String> },

    #[error("failed to start LaTeX compiler '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("scratch directory I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// True for failures caused by the document itself (or the engine's verdict
    /// on it), as opposed to infrastructure failures.
    pub fn is_compilation_failure(&self) -> bool {
        matches!(
            self,
            CompileError::Failed { .. }
                | CompileError::TimedOut { .. }
                | CompileError::MissingArtifact { .. }
        )
    }

    /// Engine log captured for a compilation failure, if it could be read.
    pub fn log(&self) -> Option<&str> {
        match self {
            CompileError::Failed { log, .. }
            | CompileError::TimedOut { log, .. }
            | CompileError::MissingArtifact { log } => log.as_deref(),
            CompileError::Spawn { .. } | CompileError::Io(_) => None,
        }
    }

    fn with_log(mut self, captured: Option<String>) -> Self {
        match &mut self {
            CompileError::Failed { log, .. }
            | CompileError::TimedOut { log, .. }
            | CompileError::MissingArtifact { log } => *log = captured,
            CompileError::Spawn { .. } | CompileError::Io(_) => {}
        }
        self
    }
}

/// A static file the template needs next to its source (e.g. a document class).
#[derive(Debug, Clone)]
pub struct AuxResource {
    pub file_name: String,
    pub contents: Bytes,
}

/// Turns rendered source into a PDF.
///
/// The default implementation is `LatexCompiler`; handlers only see this trait.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    async fn compile(&self, source: &str) -> Result<Bytes, CompileError>;
}
