//! Diagnostic stream abstraction.
//!
//! Every notice reaches the stream as three separate [`DiagnosticSink::write`]
//! calls, so a sink sees exactly the write events a consumer intercepting
//! the stream would.
//!
//! # Routing
//!
//! Wrappers write to [`StderrSink`] unless the current thread installed an
//! override with [`with_sink`].  The override is thread-local: concurrent
//! callers on other threads keep their own route.

use std::cell::RefCell;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::DeprecationError;

/// A destination for diagnostic chunks.
pub trait DiagnosticSink {
    /// Write one chunk, unmodified, as a single write event.
    fn write(&self, chunk: &str) -> Result<(), DeprecationError>;
}

/// The process standard error stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn write(&self, chunk: &str) -> Result<(), DeprecationError> {
        std::io::stderr().lock().write_all(chunk.as_bytes())?;
        Ok(())
    }
}

/// In-memory sink recording each write as its own entry.
#[derive(Debug, Default)]
pub struct CaptureSink {
    writes: Mutex<Vec<String>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every write seen so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    /// Drain the recorded writes.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.writes.lock())
    }

    pub fn len(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().is_empty()
    }
}

impl DiagnosticSink for CaptureSink {
    fn write(&self, chunk: &str) -> Result<(), DeprecationError> {
        self.writes.lock().push(chunk.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Thread-scoped routing
// ---------------------------------------------------------------------------

thread_local! {
    static ROUTE: RefCell<Option<Arc<dyn DiagnosticSink>>> = const { RefCell::new(None) };
}

/// Restores the previous route on drop, including during unwinding.
struct RouteGuard {
    previous: Option<Arc<dyn DiagnosticSink>>,
}

impl Drop for RouteGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ROUTE.with(|route| *route.borrow_mut() = previous);
    }
}

/// Run `f` with this thread's diagnostics routed to `sink`.
///
/// Nested calls stack: the innermost sink wins, and the outer one is back
/// in place once the inner call returns.
pub fn with_sink<S, R>(sink: Arc<S>, f: impl FnOnce() -> R) -> R
where
    S: DiagnosticSink + 'static,
{
    let sink: Arc<dyn DiagnosticSink> = sink;
    let previous = ROUTE.with(|route| route.borrow_mut().replace(sink));
    let _guard = RouteGuard { previous };
    f()
}

/// The sink wrappers on this thread currently write to.
pub fn current_sink() -> Arc<dyn DiagnosticSink> {
    ROUTE
        .with(|route| route.borrow().clone())
        .unwrap_or_else(|| Arc::new(StderrSink))
}
