//! `LatexCompiler`: runs a LaTeX engine against a per-job scratch directory.
//!
//! Job lifecycle: CREATED (directory allocated) → SOURCE_WRITTEN → COMPILING
//! (one or two passes, strictly sequential) → SUCCEEDED | FAILED → CLEANUP.
//! The scratch directory is owned by a `TempDir`, so CLEANUP also happens on
//! early returns and panics.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compile::{AuxResource, CompileError, DocumentCompiler, JOB_DIR_PREFIX};
use crate::config::Config;

const SOURCE_FILE: &str = "resume.tex";
const ARTIFACT_FILE: &str = "resume.pdf";
const LOG_FILE: &str = "resume.log";
/// Engine output kept for debug logs.
const OUTPUT_TAIL_BYTES: usize = 2048;

#[derive(Debug, Clone)]
pub struct LatexSettings {
    pub engine: String,
    pub extra_args: Vec<String>,
    pub extra_path: Option<PathBuf>,
    pub passes: u8,
    pub timeout: Duration,
    pub scratch_root: PathBuf,
}

impl LatexSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: config.latex_engine.clone(),
            extra_args: config.latex_args.clone(),
            extra_path: config.latex_extra_path.clone(),
            passes: config.latex_passes,
            timeout: config.compile_timeout,
            scratch_root: config.scratch_dir.clone(),
        }
    }
}

#[derive(Debug)]
pub struct LatexCompiler {
    settings: LatexSettings,
    resources: Vec<AuxResource>,
}

impl LatexCompiler {
    pub fn new(settings: LatexSettings) -> Self {
        Self {
            settings,
            resources: Vec::new(),
        }
    }

    /// Adds a static file copied verbatim into every job directory.
    pub fn with_resource(mut self, resource: AuxResource) -> Self {
        self.resources.push(resource);
        self
    }

    async fn run_job(&self, job: &CompilationJob, source: &str) -> Result<Bytes, CompileError> {
        let source_path = job.path().join(SOURCE_FILE);
        fs::write(&source_path, source).await?;
        for resource in &self.resources {
            fs::write(job.path().join(&resource.file_name), &resource.contents).await?;
        }
        debug!(
            job_id = %job.id,
            source_bytes = source.len(),
            resources = self.resources.len(),
            "source written"
        );

        for pass in 1..=self.settings.passes {
            if let Err(err) = self.run_pass(job, &source_path, pass).await {
                return Err(attach_log(err, job.path()).await);
            }
        }

        match fs::read(job.path().join(ARTIFACT_FILE)).await {
            Ok(pdf) if !pdf.is_empty() => Ok(Bytes::from(pdf)),
            Ok(_) => Err(attach_log(CompileError::MissingArtifact { log: None }, job.path()).await),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(attach_log(CompileError::MissingArtifact { log: None }, job.path()).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn run_pass(
        &self,
        job: &CompilationJob,
        source_path: &Path,
        pass: u8,
    ) -> Result<(), CompileError> {
        let mut output_dir_arg = OsString::from("-output-directory=");
        output_dir_arg.push(job.path());

        let mut command = Command::new(&self.settings.engine);
        command
            .args(&self.settings.extra_args)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(output_dir_arg)
            .arg(source_path)
            .current_dir(job.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }

        debug!(job_id = %job.id, pass, engine = %self.settings.engine, "running LaTeX pass");
        let started = Instant::now();

        let child = command.spawn().map_err(|source| CompileError::Spawn {
            program: self.settings.engine.clone(),
            source,
        })?;

        // On timeout the wait future is dropped with the child, which kills it.
        let output = match tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await
        {
            Ok(output) => output?,
            Err(_) => {
                warn!(
                    job_id = %job.id,
                    pass,
                    timeout_secs = self.settings.timeout.as_secs_f64(),
                    "LaTeX pass timed out, engine killed"
                );
                return Err(CompileError::TimedOut {
                    timeout: self.settings.timeout,
                    log: None,
                });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !output.status.success() {
            debug!(
                job_id = %job.id,
                pass,
                elapsed_ms,
                stdout = %tail(&output.stdout),
                stderr = %tail(&output.stderr),
                "LaTeX engine output"
            );
            return Err(CompileError::Failed {
                pass,
                status: output.status.to_string(),
                log: None,
            });
        }

        debug!(job_id = %job.id, pass, elapsed_ms, "LaTeX pass finished");
        Ok(())
    }

    /// Current PATH with the configured TeX bin directory appended.
    fn search_path(&self) -> Option<OsString> {
        let extra = self.settings.extra_path.as_ref()?;
        let mut paths: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        paths.push(extra.clone());
        std::env::join_paths(paths).ok()
    }
}

#[async_trait]
impl DocumentCompiler for LatexCompiler {
    async fn compile(&self, source: &str) -> Result<Bytes, CompileError> {
        let job = CompilationJob::create(&self.settings.scratch_root).await?;
        let started = Instant::now();
        info!(job_id = %job.id, "compilation job started");

        let result = self.run_job(&job, source).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(pdf) => info!(job_id = %job.id, bytes = pdf.len(), elapsed_ms, "compilation succeeded"),
            Err(err) => warn!(job_id = %job.id, error = %err, elapsed_ms, "compilation failed"),
        }

        job.finish().await;
        result
    }
}

/// Scratch directory exclusively owned by one job, named from its id.
struct CompilationJob {
    id: Uuid,
    dir: TempDir,
}

impl CompilationJob {
    /// Directory creation runs on the blocking pool, off the request's worker thread.
    async fn create(root: &Path) -> Result<Self, CompileError> {
        let root = root.to_path_buf();
        let id = Uuid::new_v4();
        let dir = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&root)?;
            tempfile::Builder::new()
                .prefix(&format!("{JOB_DIR_PREFIX}{id}"))
                .rand_bytes(0)
                .tempdir_in(&root)
        })
        .await
        .map_err(io::Error::other)??;
        Ok(Self { id, dir })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory now so failures can be logged; drop is the fallback.
    async fn finish(self) {
        let Self { id, dir } = self;
        let path = dir.path().to_path_buf();
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => debug!(job_id = %id, "scratch directory removed"),
            Ok(Err(e)) => warn!(
                job_id = %id,
                path = %path.display(),
                error = %e,
                "failed to remove scratch directory"
            ),
            Err(e) => warn!(
                job_id = %id,
                path = %path.display(),
                error = %e,
                "scratch directory cleanup task failed"
            ),
        }
    }
}

async fn attach_log(err: CompileError, dir: &Path) -> CompileError {
    if !err.is_compilation_failure() {
        return err;
    }
    let log = read_log(dir).await;
    err.with_log(log)
}

/// Best-effort read of the engine log; absence is not an error.
async fn read_log(dir: &Path) -> Option<String> {
    match fs::read(dir.join(LOG_FILE)).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!(error = %e, "LaTeX log unavailable");
            None
        }
    }
}

fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= OUTPUT_TAIL_BYTES {
        return text.into_owned();
    }
    let mut start = text.len() - OUTPUT_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
