//! `depwarn_core` -- Pure Rust core library for depwarn.
//!
//! Marks functions, methods and types as deprecated.  Every call (or
//! construction) writes a notice naming the item and the caller to the
//! diagnostic stream, then runs the original code unchanged.
//!
//! This crate has **no PyO3 dependency**.  It can be consumed by:
//! - Rust code directly, through [`mark_deprecated!`] and [`Deprecated`]
//! - `depwarn-pyo3` (the `depwarn.deprecated` Python decorator)
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `DeprecationError` enum via `thiserror` |
//! | [`target`] | `Target` -- what was deprecated and where it is declared |
//! | [`caller`] | `CallSite` resolution via `#[track_caller]` + `backtrace` |
//! | [`notice`] | Message formatting and the three-write emission |
//! | [`sink`] | Diagnostic stream trait, stderr/capture sinks, thread-scoped routing |
//! | [`wrap`] | `Deprecated<F>` run-time wrapper over closures and fn values |
//! | `macros` | `mark_deprecated!` definition-time wrapper |

mod macros;

pub mod caller;
pub mod errors;
pub mod notice;
pub mod sink;
pub mod target;
pub mod wrap;

pub use caller::CallSite;
pub use errors::DeprecationError;
pub use notice::{emit, Notice};
pub use sink::{with_sink, CaptureSink, DiagnosticSink, StderrSink};
pub use target::{Target, TargetKind};
pub use wrap::{Deprecated, Invoke};
