//! Stored-document fetching with per-document failure isolation.
//!
//! A failed fetch is returned as a [`FetchFailure`] value carrying the
//! ordinal, so a batch keeps going past corrupt or unreadable documents.

use tracing::warn;

use crate::error::FetchFailure;
use crate::models::Document;
use crate::segment::Ordinal;
use crate::snapshot::IndexSnapshot;

/// A successfully materialized document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedDocument {
    pub ordinal: Ordinal,
    pub document: Document,
}

/// Fetch the stored fields of the document at `ordinal`
pub fn fetch(snapshot: &IndexSnapshot, ordinal: Ordinal) -> Result<Document, FetchFailure> {
    snapshot
        .state()
        .and_then(|state| state.document(ordinal))
        .map_err(|cause| FetchFailure::new(ordinal, cause))
}

/// Fetch many ordinals lazily, one outcome per ordinal in issued order
pub fn fetch_many<'a, I>(
    snapshot: &'a IndexSnapshot,
    ordinals: I,
) -> impl Iterator<Item = Result<FetchedDocument, FetchFailure>> + 'a
where
    I: IntoIterator<Item = Ordinal>,
    I::IntoIter: 'a,
{
    ordinals.into_iter().map(move |ordinal| {
        fetch(snapshot, ordinal)
            .map(|document| FetchedDocument { ordinal, document })
            .inspect_err(|failure| {
                warn!(
                    ordinal = %failure.ordinal,
                    error = %failure.cause,
                    "document fetch failed"
                )
            })
    })
}
