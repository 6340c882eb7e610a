//! Cheap change detection between consecutive screen snapshots.
//!
//! Not a structural diff: two snapshots are "the same" only when they are
//! byte-identical. The comparison exits at the first differing byte.

/// Holds the last snapshot that was reported as changed.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: Option<Vec<u8>>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot the next candidate is compared against.
    pub fn previous(&self) -> Option<&[u8]> {
        self.previous.as_deref()
    }

    /// Report whether `candidate` differs from the held snapshot.
    ///
    /// On `true` the held snapshot is replaced by `candidate`; on `false` it is
    /// left untouched. An absent candidate (failed capture) never differs. An
    /// absent, empty or different-length held snapshot always does.
    pub fn differs(&mut self, candidate: Option<&[u8]>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };

        let changed = match self.previous.as_deref() {
            None => true,
            Some(prev) if prev.is_empty() || prev.len() != candidate.len() => true,
            Some(prev) => prev.iter().zip(candidate).any(|(a, b)| a != b),
        };

        if changed {
            self.replace(candidate);
        }
        changed
    }

    fn replace(&mut self, candidate: &[u8]) {
        // Reuse the allocation; frames of one session are usually the same size.
        let buf = self.previous.get_or_insert_with(Vec::new);
        buf.clear();
        buf.extend_from_slice(candidate);
    }
}
