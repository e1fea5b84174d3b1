use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MultihostError {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("failed to write config to {path}")]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no roster config found (looked in {searched})")]
    #[diagnostic(help("pass --config <file>, pick a built-in roster with --preset, or run `multihost init`"))]
    NoConfig { searched: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("roster check found {errors} error(s)")]
    CheckFailed { errors: usize },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("init cancelled")]
    InitCancelled,
}
