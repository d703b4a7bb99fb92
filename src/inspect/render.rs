//! Output side of an inspection run.
//!
//! The batch driver reports everything through [`Renderer`]; the binary picks
//! an implementation. Renderers only format, they never decide control flow.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use serde_json::json;

use crate::error::{FetchFailure, LookupError};
use crate::lookup::LookupKey;
use crate::models::Document;
use crate::segment::Ordinal;
use crate::snapshot::SnapshotStats;

/// How a rendered document was reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocLabel<'a> {
    /// Range mode: identified by ordinal
    Ordinal(Ordinal),
    /// Id mode: identified by the looked-up value
    Id { key: &'a LookupKey, ordinal: Ordinal },
}

impl DocLabel<'_> {
    pub fn ordinal(&self) -> Ordinal {
        match self {
            DocLabel::Ordinal(ordinal) => *ordinal,
            DocLabel::Id { ordinal, .. } => *ordinal,
        }
    }
}

impl fmt::Display for DocLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocLabel::Ordinal(ordinal) => write!(f, "{}", ordinal),
            DocLabel::Id { key, ordinal } => {
                write!(f, "{}={} (ordinal {})", key.field, key.value, ordinal)
            }
        }
    }
}

/// Sink for the events of an inspection run
pub trait Renderer {
    /// Called once after the snapshot opened, before any document
    fn header(&mut self, path: &Path, stats: &SnapshotStats, displayed: usize) -> io::Result<()>;

    fn document(&mut self, label: &DocLabel<'_>, doc: &Document) -> io::Result<()>;

    fn not_found(&mut self, key: &LookupKey) -> io::Result<()>;

    fn lookup_failed(&mut self, key: &LookupKey, error: &LookupError) -> io::Result<()>;

    fn fetch_failed(&mut self, label: &DocLabel<'_>, failure: &FetchFailure) -> io::Result<()>;
}

/// Human-readable report, one `name: value` line per field
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn header(&mut self, path: &Path, stats: &SnapshotStats, displayed: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Index directory opened successfully at: {}",
            path.display()
        )?;
        writeln!(self.out, "Index contains {} documents", stats.live_docs)?;
        writeln!(
            self.out,
            "Total docs (including deleted): {}",
            stats.total_docs
        )?;
        writeln!(self.out, "Displaying {} documents:", displayed)
    }

    fn document(&mut self, label: &DocLabel<'_>, doc: &Document) -> io::Result<()> {
        match label {
            DocLabel::Ordinal(ordinal) => writeln!(self.out, "\nDocument {}:", ordinal)?,
            DocLabel::Id { key, ordinal } => writeln!(
                self.out,
                "\nDocument {}={} (ordinal {}):",
                key.field, key.value, ordinal
            )?,
        }
        for field in doc.iter() {
            writeln!(self.out, "{}: {}", field.name, field.value)?;
        }
        Ok(())
    }

    fn not_found(&mut self, key: &LookupKey) -> io::Result<()> {
        writeln!(
            self.out,
            "\nNo document found with {}: {}",
            key.field, key.value
        )
    }

    fn lookup_failed(&mut self, key: &LookupKey, error: &LookupError) -> io::Result<()> {
        writeln!(
            self.out,
            "\nLookup failed for {}: {}: {}",
            key.field, key.value, error
        )
    }

    fn fetch_failed(&mut self, label: &DocLabel<'_>, failure: &FetchFailure) -> io::Result<()> {
        writeln!(
            self.out,
            "\nFailed to read document {}: {}",
            label, failure.cause
        )
    }
}

/// Newline-delimited JSON, one object per event
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &value)?;
        writeln!(self.out)
    }
}

fn label_json(label: &DocLabel<'_>) -> serde_json::Value {
    match label {
        DocLabel::Ordinal(ordinal) => json!({ "ordinal": ordinal.as_u32() }),
        DocLabel::Id { key, ordinal } => json!({
            "ordinal": ordinal.as_u32(),
            "field": key.field,
            "value": key.value,
        }),
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn header(&mut self, path: &Path, stats: &SnapshotStats, displayed: usize) -> io::Result<()> {
        self.emit(json!({
            "event": "opened",
            "path": path.display().to_string(),
            "stats": stats,
            "displayed": displayed,
        }))
    }

    fn document(&mut self, label: &DocLabel<'_>, doc: &Document) -> io::Result<()> {
        self.emit(json!({
            "event": "document",
            "label": label_json(label),
            "fields": doc.fields,
        }))
    }

    fn not_found(&mut self, key: &LookupKey) -> io::Result<()> {
        self.emit(json!({
            "event": "not_found",
            "field": key.field,
            "value": key.value,
        }))
    }

    fn lookup_failed(&mut self, key: &LookupKey, error: &LookupError) -> io::Result<()> {
        self.emit(json!({
            "event": "lookup_failed",
            "field": key.field,
            "value": key.value,
            "error": error.to_string(),
        }))
    }

    fn fetch_failed(&mut self, label: &DocLabel<'_>, failure: &FetchFailure) -> io::Result<()> {
        self.emit(json!({
            "event": "fetch_failed",
            "label": label_json(label),
            "error": failure.cause.to_string(),
        }))
    }
}
