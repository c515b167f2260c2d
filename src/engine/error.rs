//! Engine error taxonomy.
//!
//! Every variant is contained per-formula or per-def: a scan always
//! returns fixed-shape rows, never an aborted response.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A def cycle was detected; the offending name is zero-filled.
    #[error("circular dependency through `{0}`")]
    CircularDependency(String),

    /// An expression is not valid under the accepted grammar subset.
    #[error("formula `{name}` failed to compile: {reason}")]
    CompileError { name: String, reason: String },

    /// Tokenizing, parsing, or evaluating an expression failed.
    #[error("evaluation failed: {0}")]
    EvalError(String),

    /// An identifier matched no base series, def, or temp series.
    #[error("unknown series `{0}`")]
    MissingSeries(String),

    /// The candle set for a symbol was empty.
    #[error("candle set is empty")]
    EmptyCandles,
}
