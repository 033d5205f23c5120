use std::{collections::HashMap, error::Error, ops::Range};

use ariadne::{Config, IndexType, ReportKind};
use asn1::{AsnCompiler, Diagnostic, Level, SourceId};

type Report = ariadne::Report<'static, (SourceId, Range<usize>)>;

/// Convert a parser diagnostic into a report that can be printed with the
/// source text around it
pub fn to_report(diag: &Diagnostic) -> Result<Report, Box<dyn Error>> {
    let kind = match diag.level {
        Level::Error => ReportKind::Error,
        Level::Warning => ReportKind::Warning,
        Level::Note => ReportKind::Advice,
    };

    let Some(source) = diag.source else {
        return Err("diagnostic is not attached to a source file".into());
    };

    let mut report = Report::build(kind, source, diag.location.start)
        .with_code(&diag.error_code)
        .with_message(&diag.name)
        .with_config(Config::default().with_index_type(IndexType::Byte));

    let primary = ariadne::Label::new((source, diag.location.clone()));
    report.add_label(if diag.expected.is_empty() {
        primary
    } else {
        primary.with_message(format!("expected one of {}", diag.expected.join(", ")))
    });

    let mut note: Option<String> = None;
    for label in &diag.labels {
        let Some(location) = &label.location else {
            note = Some(match note {
                Some(note) => note + "\n" + &label.message,
                None => label.message.clone(),
            });
            continue;
        };
        report.add_label(ariadne::Label::new((source, location.clone())).with_message(&label.message))
    }

    if let Some(note) = note {
        report.set_note(note);
    }

    Ok(report.finish())
}

/// Source file cache provider for the Asn compiler
pub struct AsnCompilerCache<'a> {
    cache: HashMap<SourceId, ariadne::Source<&'a str>>,
    compiler: &'a AsnCompiler,
}

impl<'a> ariadne::Cache<SourceId> for AsnCompilerCache<'a> {
    type Storage = &'a str;

    fn fetch(
        &mut self,
        id: &SourceId,
    ) -> Result<&ariadne::Source<Self::Storage>, Box<dyn std::fmt::Debug + '_>> {
        Ok(self
            .cache
            .entry(*id)
            .or_insert_with(|| ariadne::Source::from(self.compiler.source_text(*id))))
    }

    fn display<'b>(&self, id: &'b SourceId) -> Option<Box<dyn std::fmt::Display + 'b>> {
        Some(Box::new(self.compiler.source_name(*id).to_string()))
    }
}

impl<'a> AsnCompilerCache<'a> {
    pub fn new(compiler: &'a AsnCompiler) -> Self {
        AsnCompilerCache {
            cache: HashMap::new(),
            compiler,
        }
    }
}
