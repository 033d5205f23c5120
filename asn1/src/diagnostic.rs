use std::{error::Error, fmt::Display, ops::Range};

use crate::compiler::SourceId;

/// Any kind of error reported while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Unique error code reference
    pub error_code: String,

    /// Severity of the error
    pub level: Level,

    /// Which stage of parsing found the problem
    pub kind: DiagnosticKind,

    /// Name of the diagnostic
    pub name: String,

    /// The source unit, only set for diagnostics produced by an `AsnCompiler`
    pub source: Option<SourceId>,

    /// Primary byte range of the diagnostic.  An empty range is a single
    /// position rather than a range of characters.
    pub location: Range<usize>,

    /// Line and column of the start of `location`
    pub start: Position,

    /// Line and column of the end of `location`
    pub end: Position,

    /// Descriptions of what would have been accepted at `location`
    pub expected: Vec<String>,

    /// All further labels with information about this diagnostic
    pub labels: Vec<Label>,
}

/// A secondary location attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Byte range of the label within the source text, if any
    pub location: Option<Range<usize>>,

    /// The message to display to the user.
    pub message: String,
}

/// 1-based line and column, columns count characters not bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Severity of a given diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A fatal error
    Error,

    /// Should be fixed but parsing can still continue.
    Warning,

    /// Notice about some code
    Note,
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// Invalid character, unterminated string or comment
    Lexical,

    /// A token that the current production does not accept
    Structural,

    /// The case of a name does not match any production valid in context
    Disambiguation,

    /// An object does not match the `WITH SYNTAX` of its class
    SyntaxMatch,

    /// The nesting guard was tripped
    DepthExceeded,

    /// The source text is not in Unicode normalization form C
    Normalization,
}

impl DiagnosticKind {
    /// Stable error code for each kind of diagnostic
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "E001",
            DiagnosticKind::Structural => "E002",
            DiagnosticKind::Disambiguation => "E003",
            DiagnosticKind::SyntaxMatch => "E004",
            DiagnosticKind::DepthExceeded => "E005",
            DiagnosticKind::Normalization => "W001",
        }
    }
}

impl Diagnostic {
    /// Create a new diagnostic
    fn new(level: Level, kind: DiagnosticKind) -> Self {
        Diagnostic {
            error_code: kind.code().to_string(),
            level,
            kind,
            name: String::new(),
            source: None,
            location: 0..0,
            start: Position::default(),
            end: Position::default(),
            expected: vec![],
            labels: vec![],
        }
    }

    /// Create an error diagnostic
    pub(crate) fn error(kind: DiagnosticKind) -> Self {
        Self::new(Level::Error, kind)
    }

    /// Create a warning diagnostic
    pub(crate) fn warning(kind: DiagnosticKind) -> Self {
        Self::new(Level::Warning, kind)
    }

    /// Set the descriptive name of an error
    pub(crate) fn name(self, value: impl Into<String>) -> Self {
        Self {
            name: value.into(),
            ..self
        }
    }

    /// Set the primary location of the diagnostic
    pub(crate) fn at(self, location: Range<usize>) -> Self {
        Self { location, ..self }
    }

    /// Set the list of accepted tokens
    pub(crate) fn expected(self, expected: Vec<String>) -> Self {
        Self { expected, ..self }
    }

    /// Add a label to the diagnostic
    pub(crate) fn label(mut self, label: impl Into<Label>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Fill in line and column information from the source text
    pub(crate) fn locate(&mut self, lines: &LineIndex) {
        self.start = lines.position(self.location.start);
        self.end = lines.position(self.location.end);
    }

    /// Is this diagnostic an error
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl Label {
    /// Create a new source label
    pub(crate) fn new() -> Label {
        Label {
            location: None,
            message: String::new(),
        }
    }

    /// Set the message for this label
    pub(crate) fn message(self, value: impl Into<String>) -> Self {
        Self {
            message: value.into(),
            ..self
        }
    }

    /// Set the location within the source file for this label
    pub fn loc(self, loc: Range<usize>) -> Self {
        Self {
            location: Some(loc),
            ..self
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {}: {} at {}:{}",
            self.level, self.error_code, self.name, self.start.line, self.start.column
        )?;

        if !self.expected.is_empty() {
            writeln!(f)?;
            write!(f, "\texpected one of {}", self.expected.join(", "))?;
        }

        for label in &self.labels {
            writeln!(f)?;
            write!(f, "\t{:?}", self.level)?;
            if let Some(location) = &label.location {
                write!(f, " [{}..{}]", location.start, location.end)?;
            }
            write!(f, ": {}", label.message)?;
        }

        Ok(())
    }
}

impl Error for Diagnostic {}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::new().message(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::new().message(value)
    }
}

/// Byte offsets of the start of every line in a source text
#[derive(Debug, Clone)]
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { source, starts }
    }

    /// Line and column of a byte offset, offsets past the end are clamped
    pub(crate) fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = self.starts.partition_point(|&s| s <= offset) - 1;
        let column = self.source[self.starts[line]..offset].chars().count();

        Position {
            line: line + 1,
            column: column + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions() {
        let lines = LineIndex::new("ab\ncdé\nf");
        assert_eq!(lines.position(0), Position { line: 1, column: 1 });
        assert_eq!(lines.position(2), Position { line: 1, column: 3 });
        assert_eq!(lines.position(3), Position { line: 2, column: 1 });
        assert_eq!(lines.position(8), Position { line: 3, column: 1 });
        assert_eq!(lines.position(100), Position { line: 3, column: 2 });
    }

    #[test]
    fn builder() {
        let mut diag = Diagnostic::error(DiagnosticKind::Structural)
            .name("unexpected token")
            .at(3..4)
            .expected(vec!["`,`".into()])
            .label(Label::new().message("skipped").loc(3..10));
        diag.locate(&LineIndex::new("ab\ncd"));

        assert_eq!(diag.error_code, "E002");
        assert_eq!(diag.start, Position { line: 2, column: 1 });
        assert!(diag.is_error());
        assert_eq!(
            diag.to_string(),
            "Error E002: unexpected token at 2:1\n\texpected one of `,`\n\tError [3..10]: skipped"
        );
    }
}
