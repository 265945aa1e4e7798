//! Deprecation notice formatting and emission.
//!
//! A notice is the pairing of a [`Target`] with the [`CallSite`] of one
//! invocation.  It reaches the stream as three writes, in this order:
//!
//! 1. the headline, e.g.
//!    `[WARNING] deprecated function vibrate, defined in src/facades.rs, line 40. Called from src/main.rs, line 9, by main().\n`
//! 2. the target's documentation (`""` when it has none)
//! 3. `"\n"`

use std::panic::Location;

use serde::Serialize;

use crate::caller::CallSite;
use crate::sink::{current_sink, DiagnosticSink};
use crate::target::{Target, TargetKind};

/// Prefix of every headline.
pub const WARNING_TAG: &str = "[WARNING] ";

/// Trailing write separating one notice from the next.
pub const NOTICE_TERMINATOR: &str = "\n";

/// The invocation context of one deprecated call.
#[derive(Debug, Clone, Serialize)]
pub struct Notice<'a> {
    pub target: &'a Target,
    pub caller: CallSite,
}

impl<'a> Notice<'a> {
    pub fn new(target: &'a Target, caller: CallSite) -> Self {
        Self { target, caller }
    }

    /// First write of the notice, newline-terminated.
    pub fn headline(&self) -> String {
        let t = self.target;
        let c = &self.caller;
        let caller_line = display_line(c.line);
        match t.kind() {
            TargetKind::Function => format!(
                "{WARNING_TAG}deprecated function {}, defined in {}, line {}. \
                 Called from {}, line {caller_line}, by {}().\n",
                t.name(),
                t.file(),
                display_line(t.line()),
                c.file,
                c.function,
            ),
            TargetKind::Class => format!(
                "{WARNING_TAG}Creating an instance of a deprecated class {} in {}. \
                 Called from {}, line {caller_line}, by {}().\n",
                t.name(),
                t.file(),
                c.file,
                c.function,
            ),
        }
    }

    /// Write the three parts of the notice to `sink`.
    ///
    /// A failed write is logged and the remaining parts are still attempted;
    /// nothing is reported back to the caller.
    pub fn write_to(&self, sink: &dyn DiagnosticSink) {
        let parts = [
            self.headline(),
            self.target.documentation(),
            NOTICE_TERMINATOR.to_owned(),
        ];
        for part in &parts {
            if let Err(e) = sink.write(part) {
                log::warn!(
                    "could not write deprecation notice for {}: {e}",
                    self.target.name()
                );
            }
        }
    }
}

fn display_line(line: Option<u32>) -> String {
    line.map_or_else(|| "?".to_owned(), |l| l.to_string())
}

/// Emit the notice for `target` on behalf of the tracked caller.
///
/// Writes go to this thread's current sink (standard error by default).
#[track_caller]
pub fn emit(target: &Target) {
    let notice = Notice::new(target, CallSite::from_location(Location::caller()));
    notice.write_to(&*current_sink());
}
