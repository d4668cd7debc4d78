// ── Load state of a server-backed value ──

use std::sync::Arc;

use crate::error::CoreError;

/// State of a shared, server-backed value.
///
/// Failures are carried as a value instead of terminating the stream, so
/// every subscriber keeps receiving updates after an error.
#[derive(Debug)]
pub enum Loadable<T> {
    /// No result yet in this cache window.
    Pending,
    Ready(Arc<T>),
    Failed(CoreError),
}

impl<T> Loadable<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Join two loadables: ready only when both are ready.
    ///
    /// A failure on either side wins over pending, `self` first.
    pub fn zip_with<U, R>(&self, other: &Loadable<U>, f: impl FnOnce(&T, &U) -> R) -> Loadable<R> {
        match (self, other) {
            (Self::Failed(e), _) | (_, Loadable::Failed(e)) => Loadable::Failed(e.clone()),
            (Self::Ready(a), Loadable::Ready(b)) => Loadable::Ready(Arc::new(f(a, b))),
            _ => Loadable::Pending,
        }
    }
}

impl<T> Clone for Loadable<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(v) => Self::Ready(Arc::clone(v)),
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Pending
    }
}
