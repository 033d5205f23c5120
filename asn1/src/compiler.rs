//! The primary interface to ASN.1 parsing.

use std::ops::{Deref, DerefMut};

use tracing::debug;
use unicode_normalization::is_nfc;

use crate::{
    ast::Asn1,
    diagnostic::{Diagnostic, DiagnosticKind, LineIndex},
    parser::Parser,
};

/// Parse a source unit with the default features
pub fn parse(source: &str) -> (Asn1, Vec<Diagnostic>) {
    parse_with(source, &Features::default())
}

/// Parse a source unit containing any number of module definitions.  Never
/// fails, all problems are reported as diagnostics sorted by position.
pub fn parse_with(source: &str, features: &Features) -> (Asn1, Vec<Diagnostic>) {
    let (ast, mut diagnostics) = Parser::new(source, *features).run();

    if let Some(diag) = normalization_warning(source) {
        diagnostics.push(diag);
    }

    let lines = LineIndex::new(source);
    for diag in &mut diagnostics {
        diag.locate(&lines);
    }
    diagnostics.sort_by_key(|d| (d.location.start, d.location.end));

    (ast, diagnostics)
}

/// Identifiers compare code points, so text that is not normalised might
/// not compare equal to names that look the same.
fn normalization_warning(source: &str) -> Option<Diagnostic> {
    if is_nfc(source) {
        return None;
    }

    let mut offset = 0;
    let line = source
        .split_inclusive('\n')
        .find(|line| {
            let found = !is_nfc(line);
            if !found {
                offset += line.len();
            }
            found
        })
        .unwrap_or(source);

    Some(
        Diagnostic::warning(DiagnosticKind::Normalization)
            .name("source text is not in Unicode normalization form C")
            .at(offset..offset + line.trim_end().len())
            .label("names that look identical may be treated as different"),
    )
}

/// Store of all information relating to a whole ASN.1 specification,
/// including multiple source files.
#[derive(Debug, Clone, Default)]
pub struct AsnCompiler {
    /// List of all included source files.
    sources: Vec<Source>,

    /// The enabled features.
    features: Features,
}

/// All features that can be enabled when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Features {
    /// How a `--` comment is terminated
    pub line_comments: LineCommentEnd,

    /// Maximum nesting of types, values, constraints and objects before
    /// parsing is abandoned
    pub max_depth: usize,

    /// Allow non-ascii characters in identifiers
    pub unicode_identifiers: bool,

    /// Allow further whitespace characters
    pub unicode_whitespace: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            line_comments: LineCommentEnd::default(),
            max_depth: 32,
            unicode_identifiers: false,
            unicode_whitespace: false,
        }
    }
}

/// Termination rule of `--` comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LineCommentEnd {
    /// The comment runs to the end of the line
    #[default]
    EndOfLine,

    /// A second `--` also ends the comment (X.680 12.6.3)
    EndOfLineOrHyphens,
}

/// Information relating to a single source file
#[derive(Debug, Clone)]
struct Source {
    /// File name and path.
    file_name: String,

    /// Source text of the file
    source: String,

    /// The syntax tree of the file.
    ast: Asn1,

    /// Everything reported while parsing the file
    diagnostics: Vec<Diagnostic>,
}

/// Reference to a single source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(usize);

impl AsnCompiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a new file to the compiler and parse it.  Problems in the file are
    /// available from [`AsnCompiler::diagnostics`].
    pub fn add_file(&mut self, file_name: String, source: String) -> SourceId {
        let id = SourceId(self.sources.len());
        debug!(file = %file_name, "parsing source");

        let (ast, mut diagnostics) = parse_with(&source, &self.features);
        for diag in &mut diagnostics {
            diag.source = Some(id);
        }

        self.sources.push(Source {
            file_name,
            source,
            ast,
            diagnostics,
        });

        id
    }

    /// Get an iterator over all source IDs
    pub fn sources(&self) -> impl Iterator<Item = SourceId> {
        (0..self.sources.len()).map(SourceId)
    }

    /// The syntax tree of a source file
    pub fn ast(&self, file: SourceId) -> &Asn1 {
        &self.sources[file.0].ast
    }

    /// All diagnostics of every source file, in the order the files were added
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.sources.iter().flat_map(|s| s.diagnostics.iter())
    }

    /// Does any source file contain an error
    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(Diagnostic::is_error)
    }

    /// The text of a source file
    pub fn source_text(&self, file: SourceId) -> &str {
        &self.sources[file.0].source
    }

    /// The name a source file was added with
    pub fn source_name(&self, file: SourceId) -> &str {
        &self.sources[file.0].file_name
    }

    /// Convert the syntax tree of a file back into ASN.1 notation
    pub fn print_ast(&self, file: SourceId) -> String {
        self.sources[file.0].ast.to_string()
    }
}

impl Deref for AsnCompiler {
    type Target = Features;

    fn deref(&self) -> &Self::Target {
        &self.features
    }
}

impl DerefMut for AsnCompiler {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_keeps_sources() {
        let mut compiler = AsnCompiler::new();
        compiler.max_depth = 50;
        let a = compiler.add_file("a.asn".into(), "A DEFINITIONS ::= BEGIN END".into());
        let b = compiler.add_file("b.asn".into(), "B DEFINITIONS ::= BEGIN T ::= END".into());

        assert_eq!(compiler.source_name(a), "a.asn");
        assert_eq!(compiler.ast(a).modules[0].identifier.name, "A");
        assert_eq!(compiler.sources().count(), 2);
        assert!(compiler.has_errors());
        assert!(compiler.diagnostics().all(|d| d.source == Some(b)));
    }

    #[test]
    fn non_normalized_source_warns() {
        let source = "A DEFINITIONS ::= BEGIN\n-- cafe\u{301}\nEND";
        let (_, diagnostics) = parse(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Normalization);
        assert_eq!(diagnostics[0].start.line, 2);
    }
}
