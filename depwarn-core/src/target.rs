//! Static description of a deprecated item.
//!
//! A [`Target`] is built once, when the item is decorated, and lives as
//! long as the wrapper holding it.  Rust items get a `static` built by the
//! [`mark_deprecated!`](crate::mark_deprecated) macro from `file!()`, `line!()` and
//! the item's doc comments; bindings for other languages build one at run
//! time with [`Target::dynamic`].

use std::borrow::Cow;

use serde::{Serialize, Serializer};

/// What kind of item the warning is about.  Selects the message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Free function, method, associated function or trait method.
    Function,
    /// A type whose construction is deprecated.
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DocText {
    /// Raw `#[doc = "..."]` lines as collected from `///` comments.
    Lines(&'static [&'static str]),
    /// Documentation already in its final form (e.g. a Python `__doc__`).
    Verbatim(Cow<'static, str>),
}

impl DocText {
    fn render(&self) -> String {
        match self {
            DocText::Lines(lines) => lines
                .iter()
                .copied()
                .map(|line| line.strip_prefix(' ').unwrap_or(line))
                .collect::<Vec<_>>()
                .join("\n"),
            DocText::Verbatim(text) => text.clone().into_owned(),
        }
    }
}

fn serialize_doc<S: Serializer>(doc: &DocText, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&doc.render())
}

/// The wrapped item: kind, simple name, declaration site and documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    kind: TargetKind,
    name: Cow<'static, str>,
    file: Cow<'static, str>,
    line: Option<u32>,
    #[serde(serialize_with = "serialize_doc")]
    doc: DocText,
}

impl Target {
    /// Describe a deprecated function declared at `file:line`.
    ///
    /// `docs` holds one entry per `///` line, leading space included.
    pub const fn function(
        name: &'static str,
        file: &'static str,
        line: u32,
        docs: &'static [&'static str],
    ) -> Self {
        Self {
            kind: TargetKind::Function,
            name: Cow::Borrowed(name),
            file: Cow::Borrowed(file),
            line: Some(line),
            doc: DocText::Lines(docs),
        }
    }

    /// Describe a deprecated type whose constructors live at `file:line`.
    pub const fn class(
        name: &'static str,
        file: &'static str,
        line: u32,
        docs: &'static [&'static str],
    ) -> Self {
        Self {
            kind: TargetKind::Class,
            name: Cow::Borrowed(name),
            file: Cow::Borrowed(file),
            line: Some(line),
            doc: DocText::Lines(docs),
        }
    }

    /// Build a target from metadata only known at run time.
    ///
    /// `doc` is emitted verbatim; `None` means the item has no documentation.
    pub fn dynamic(
        kind: TargetKind,
        name: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        line: Option<u32>,
        doc: Option<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            file: file.into(),
            line,
            doc: DocText::Verbatim(doc.map(Cow::Owned).unwrap_or(Cow::Borrowed(""))),
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration file.  For targets coming from Python classes this is
    /// the defining module.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Documentation text as written to the stream; empty when absent.
    pub fn documentation(&self) -> String {
        self.doc.render()
    }
}
