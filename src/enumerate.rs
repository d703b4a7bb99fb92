//! Ordinal-range enumeration with tombstone skipping.
//!
//! The window is clamped once up front and never widened: deleted ordinals
//! inside it are skipped, not replaced by live ordinals beyond its end.

use crate::error::Result;
use crate::segment::{DocNo, Ordinal};
use crate::snapshot::{IndexSnapshot, SnapshotState};

/// Half-open ordinal window `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: u32,
    pub end: u32,
}

impl RangeWindow {
    /// Clamp a caller-supplied offset/limit to a snapshot of `total` documents.
    ///
    /// `start = max(0, min(offset, total - 1))`, `end = min(start + limit, total)`.
    /// Empty when `total == 0` or `limit <= 0`.
    pub fn clamp(total: u32, offset: i64, limit: i64) -> Self {
        if total == 0 || limit <= 0 {
            return Self { start: 0, end: 0 };
        }
        let total = total as i64;
        let start = offset.min(total - 1).max(0);
        let end = start.saturating_add(limit).min(total);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Lazy ascending sequence of live ordinals inside a [`RangeWindow`].
///
/// Borrowing the snapshot keeps it open for as long as the sequence lives.
/// Cloning yields an independent cursor.
#[derive(Clone)]
pub struct OrdinalRange<'a> {
    state: &'a SnapshotState,
    window: RangeWindow,
    next: u32,
    segment: usize,
}

impl<'a> OrdinalRange<'a> {
    fn new(state: &'a SnapshotState, window: RangeWindow) -> Self {
        Self {
            state,
            window,
            next: window.start,
            segment: 0,
        }
    }

    pub fn window(&self) -> RangeWindow {
        self.window
    }

    /// A fresh cursor over the same window
    pub fn restart(&self) -> Self {
        Self::new(self.state, self.window)
    }
}

impl Iterator for OrdinalRange<'_> {
    type Item = Ordinal;

    fn next(&mut self) -> Option<Ordinal> {
        let segments = self.state.segments();
        while self.next < self.window.end {
            let ordinal = self.next;
            self.next += 1;

            while self.segment + 1 < segments.len() && segments[self.segment + 1].doc_base <= ordinal
            {
                self.segment += 1;
            }
            let segment = &segments[self.segment];
            if !segment
                .reader
                .is_deleted(DocNo::new(ordinal - segment.doc_base))
            {
                return Some(Ordinal::new(ordinal));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.window.end.saturating_sub(self.next) as usize;
        (0, Some(remaining))
    }
}

/// Enumerate the live ordinals of `snapshot` in the clamped offset/limit window.
///
/// Fails only when the snapshot is closed.
pub fn enumerate(snapshot: &IndexSnapshot, offset: i64, limit: i64) -> Result<OrdinalRange<'_>> {
    let state = snapshot.state()?;
    let window = RangeWindow::clamp(state.total_docs(), offset, limit);
    Ok(OrdinalRange::new(state, window))
}
