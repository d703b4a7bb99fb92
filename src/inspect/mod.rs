//! Batch driver for an inspection run.
//!
//! Phases: `Init -> Opening -> Open -> (Enumerating | LookingUp) ->
//! Fetching -> Rendering -> ... -> Closing -> Closed`. Fetching and Rendering
//! repeat per resolved ordinal; a per-item failure moves on to the next item.
//! Closing is reached from every phase, including a failed open.

mod render;

pub use render::{DocLabel, JsonRenderer, Renderer, TextRenderer};

use std::fmt;

use tracing::{debug, warn};

use crate::config::{InspectConfig, InspectMode};
use crate::enumerate::enumerate;
use crate::error::Result;
use crate::fetch::fetch;
use crate::lookup::{lookup_key, LookupKey, LookupOutcome};
use crate::segment::Ordinal;
use crate::snapshot::IndexSnapshot;

/// Phase of the batch state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    Opening,
    Open,
    Enumerating,
    LookingUp,
    Fetching,
    Rendering,
    Closing,
    Closed,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchPhase::Init => "init",
            BatchPhase::Opening => "opening",
            BatchPhase::Open => "open",
            BatchPhase::Enumerating => "enumerating",
            BatchPhase::LookingUp => "looking_up",
            BatchPhase::Fetching => "fetching",
            BatchPhase::Rendering => "rendering",
            BatchPhase::Closing => "closing",
            BatchPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Counters for a finished run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items announced in the header
    pub displayed: usize,
    pub rendered: usize,
    pub not_found: usize,
    pub lookup_errors: usize,
    pub fetch_failures: usize,
    /// Id-mode hits that resolved to a deleted document
    pub deleted_hits: usize,
}

impl BatchSummary {
    /// Whether any item failed or was missing
    pub fn has_problems(&self) -> bool {
        self.not_found + self.lookup_errors + self.fetch_failures > 0
    }
}

/// Drives one inspection run against a renderer
pub struct Inspector<'r, R: Renderer> {
    renderer: &'r mut R,
    phases: Vec<BatchPhase>,
    summary: BatchSummary,
}

impl<'r, R: Renderer> Inspector<'r, R> {
    pub fn new(renderer: &'r mut R) -> Self {
        Self {
            renderer,
            phases: vec![BatchPhase::Init],
            summary: BatchSummary::default(),
        }
    }

    /// Every phase entered so far, in order
    pub fn phases(&self) -> &[BatchPhase] {
        &self.phases
    }

    pub fn phase(&self) -> BatchPhase {
        self.phases.last().copied().unwrap_or(BatchPhase::Init)
    }

    fn enter(&mut self, phase: BatchPhase) {
        debug!(from = %self.phase(), to = %phase, "batch phase");
        self.phases.push(phase);
    }

    /// Open the configured index, render every selected document and close.
    ///
    /// Only an open failure or a renderer I/O error is returned as `Err`;
    /// per-item problems are rendered and counted in the summary.
    pub fn run(&mut self, config: &InspectConfig) -> Result<BatchSummary> {
        self.enter(BatchPhase::Opening);
        let mut snapshot = match IndexSnapshot::open(&config.index_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.enter(BatchPhase::Closing);
                self.enter(BatchPhase::Closed);
                return Err(e);
            }
        };
        self.enter(BatchPhase::Open);

        let result = self.drive(&snapshot, config.mode());

        self.enter(BatchPhase::Closing);
        snapshot.close();
        self.enter(BatchPhase::Closed);

        result.map(|()| self.summary.clone())
    }

    fn drive(&mut self, snapshot: &IndexSnapshot, mode: InspectMode) -> Result<()> {
        let stats = snapshot.stats()?;
        match mode {
            InspectMode::Range { offset, limit } => {
                self.enter(BatchPhase::Enumerating);
                let range = enumerate(snapshot, offset, limit)?;
                self.summary.displayed = range.restart().count();
                self.renderer
                    .header(snapshot.path(), &stats, self.summary.displayed)?;

                for ordinal in range {
                    self.fetch_and_render(snapshot, DocLabel::Ordinal(ordinal))?;
                }
            }
            InspectMode::Ids(keys) => {
                self.summary.displayed = keys.len();
                self.renderer
                    .header(snapshot.path(), &stats, self.summary.displayed)?;

                for key in &keys {
                    self.enter(BatchPhase::LookingUp);
                    if let Some(ordinal) = self.resolve(snapshot, key)? {
                        self.fetch_and_render(snapshot, DocLabel::Id { key, ordinal })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve(&mut self, snapshot: &IndexSnapshot, key: &LookupKey) -> Result<Option<Ordinal>> {
        match lookup_key(snapshot, key) {
            Ok(LookupOutcome::Found(ordinal)) => {
                // Lookup skips deleted postings, so a deleted hit means inconsistent live docs
                if snapshot.is_deleted(ordinal)? {
                    warn!(%key, %ordinal, "lookup hit is a deleted document");
                    self.summary.deleted_hits += 1;
                }
                Ok(Some(ordinal))
            }
            Ok(LookupOutcome::NotFound) => {
                self.summary.not_found += 1;
                self.renderer.not_found(key)?;
                Ok(None)
            }
            Err(e) => {
                warn!(%key, error = %e, "lookup failed");
                self.summary.lookup_errors += 1;
                self.renderer.lookup_failed(key, &e)?;
                Ok(None)
            }
        }
    }

    fn fetch_and_render(&mut self, snapshot: &IndexSnapshot, label: DocLabel<'_>) -> Result<()> {
        self.enter(BatchPhase::Fetching);
        match fetch(snapshot, label.ordinal()) {
            Ok(doc) => {
                self.enter(BatchPhase::Rendering);
                self.renderer.document(&label, &doc)?;
                self.summary.rendered += 1;
            }
            Err(failure) => {
                warn!(label = %label, error = %failure.cause, "document fetch failed");
                self.summary.fetch_failures += 1;
                self.renderer.fetch_failed(&label, &failure)?;
            }
        }
        Ok(())
    }
}

/// Run one inspection with a fresh [`Inspector`]
pub fn run_inspection<R: Renderer>(config: &InspectConfig, renderer: &mut R) -> Result<BatchSummary> {
    Inspector::new(renderer).run(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegscopeError;
    use crate::models::Document;
    use crate::segment::IndexWriter;
    use tempfile::TempDir;

    fn build(dir: &TempDir) {
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        for id in ["a", "b", "c"] {
            writer
                .add_document(&Document::new().with_field("id", id))
                .unwrap();
        }
        writer.delete_term("id", "b");
        writer.commit().unwrap();
    }

    fn text_run(config: &InspectConfig) -> (Result<BatchSummary>, String, Vec<BatchPhase>) {
        let mut renderer = TextRenderer::new(Vec::new());
        let mut inspector = Inspector::new(&mut renderer);
        let result = inspector.run(config);
        let phases = inspector.phases().to_vec();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        (result, out, phases)
    }

    #[test]
    fn test_range_phases() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        let (result, _, phases) = text_run(&InspectConfig::new(dir.path()));
        let summary = result.unwrap();
        assert_eq!(summary.displayed, 2);
        assert_eq!(summary.rendered, 2);

        use BatchPhase::*;
        assert_eq!(
            phases,
            vec![
                Init, Opening, Open, Enumerating, Fetching, Rendering, Fetching, Rendering,
                Closing, Closed
            ]
        );
    }

    #[test]
    fn test_open_failure_still_closes() {
        let dir = TempDir::new().unwrap();
        let (result, out, phases) = text_run(&InspectConfig::new(dir.path().join("missing")));

        assert!(matches!(result, Err(SegscopeError::Open { .. })));
        assert!(out.is_empty());
        assert_eq!(
            phases,
            vec![
                BatchPhase::Init,
                BatchPhase::Opening,
                BatchPhase::Closing,
                BatchPhase::Closed
            ]
        );
    }

    #[test]
    fn test_id_mode_resolves_live_documents_only() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        let config = InspectConfig::new(dir.path()).with_doc_ids("c,b,zz");
        let (result, out, phases) = text_run(&config);
        let summary = result.unwrap();

        assert_eq!(summary.deleted_hits, 0);
        assert_eq!(summary.rendered, 1);
        assert_eq!(summary.not_found, 2);
        assert!(summary.has_problems());
        assert!(out.contains("Document id=c (ordinal 2):"));
        assert!(out.contains("No document found with id: b"));
        assert!(out.contains("No document found with id: zz"));
        assert_eq!(
            phases.iter().filter(|p| **p == BatchPhase::LookingUp).count(),
            3
        );
    }

    #[test]
    fn test_lookup_error_is_isolated() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        let config = InspectConfig::new(dir.path())
            .with_id_field("")
            .with_doc_ids("a,c");
        let (result, out, _) = text_run(&config);
        let summary = result.unwrap();

        assert_eq!(summary.lookup_errors, 2);
        assert_eq!(summary.rendered, 0);
        assert_eq!(out.matches("Lookup failed").count(), 2);
    }
}
