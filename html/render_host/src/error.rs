use std::io;

use declarative_render::ReconcileError;
use thiserror::Error;

/// Why a request was refused; reported to the peer as an `error` envelope.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sid mismatch: expected {expected}, got {got}")]
    SidMismatch { expected: String, got: String },

    #[error("render revision mismatch: rev={rev}, expected={expected}")]
    RevMismatch { rev: u64, expected: u64 },

    #[error("no component mounted at `{0}`")]
    UnknownTarget(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SidMismatch { .. } => "sid_mismatch",
            Self::RevMismatch { .. } => "rev_mismatch",
            Self::UnknownTarget(_) => "unknown_target",
            Self::Reconcile(ReconcileError::Render(_)) => "render_error",
            Self::Reconcile(_) => "reconcile_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("outbound queue closed")]
    QueueClosed,

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative_render::RenderError;

    #[test]
    fn render_failures_surface_as_render_errors() {
        let err = SessionError::from(ReconcileError::Render(RenderError::TooDeep {
            limit: 64,
            item: "loop".to_string(),
        }));
        assert_eq!(err.code(), "render_error");

        let err = SessionError::from(ReconcileError::NoVNode("app".to_string()));
        assert_eq!(err.code(), "reconcile_error");
        assert_eq!(err.to_string(), "no vnode produced for render target `app`");
    }
}
