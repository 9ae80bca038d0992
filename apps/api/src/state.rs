use std::sync::Arc;

use crate::compile::DocumentCompiler;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable compiler. Default: LatexCompiler driving the configured engine.
    pub compiler: Arc<dyn DocumentCompiler>,
    /// xelatex with the Deedy class file; `None` when no class file is configured.
    pub deedy_compiler: Option<Arc<dyn DocumentCompiler>>,
}
