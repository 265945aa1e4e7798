//! Caller identification for a single invocation.
//!
//! File and line come from `#[track_caller]`, which follows the chain of
//! tracked frames up to the first untracked caller.  The enclosing function
//! name is not part of [`Location`], so it is recovered by walking the
//! current thread's backtrace and picking the frame whose debug info points
//! at that exact file and line.
//!
//! Without debug info (stripped release builds) the lookup finds nothing
//! and the name degrades to [`UNKNOWN`].

use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;

use serde::Serialize;

/// Placeholder for fields that could not be determined.
pub const UNKNOWN: &str = "<unknown>";

/// Where a deprecated item was invoked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub line: Option<u32>,
    pub function: Cow<'static, str>,
}

impl CallSite {
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: Option<u32>,
        function: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Every field set to the placeholder.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, None, UNKNOWN)
    }

    /// Build the call site for a tracked `location`, resolving the name of
    /// the function that contains it.
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::resolved(location.file(), location.line(), enclosing_function(location))
    }

    /// A tracked site whose name lookup may have failed.  File and line
    /// are kept either way.
    fn resolved(file: &'static str, line: u32, function: Option<String>) -> Self {
        let function = match function {
            Some(name) => Cow::Owned(name),
            None => {
                log::debug!("no frame resolved for {file}:{line}; caller name unavailable");
                Cow::Borrowed(UNKNOWN)
            }
        };
        Self::new(file, Some(line), function)
    }
}

/// Name of the function whose code sits at `location`, if a frame on the
/// current stack can be matched to it.
fn enclosing_function(location: &Location<'_>) -> Option<String> {
    let wanted = Path::new(location.file());
    let line = location.line();
    let mut found: Option<String> = None;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let (Some(file), Some(lineno)) = (symbol.filename(), symbol.lineno()) else {
                return;
            };
            if lineno == line && file.ends_with(wanted) {
                // `{:#}` drops the trailing `::h<hash>`.
                found = symbol.name().map(|name| format!("{name:#}"));
            }
        });
        found.is_none()
    });

    found.as_deref().map(simple_name)
}

/// Last meaningful path segment of a demangled symbol.
///
/// Closure and shim segments (`{{closure}}`, `{{vtable.shim}}`) are skipped
/// so a call from inside a closure reports the function defining it.
fn simple_name(path: &str) -> String {
    path.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .unwrap_or(path)
        .to_owned()
}
