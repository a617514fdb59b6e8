//! Conversion diagnostics.

use serde::Serialize;
use std::collections::BTreeMap;

/// Which extraction pipeline an entity went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    DirectFace,
    BlockFace,
    Polyface,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::DirectFace => "3DFACE",
            SourceKind::BlockFace => "block 3DFACE",
            SourceKind::Polyface => "polyface POLYLINE",
        }
    }
}

/// Valid/invalid counters of one counter family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub valid: usize,
    pub invalid: usize,
}

impl KindStats {
    pub fn processed(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Per-file conversion counters.
///
/// Direct and block-nested faces share the `faces` family.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionStats {
    /// Model space entity counts by DXF type name.
    pub entity_counts: BTreeMap<String, usize>,
    pub faces: KindStats,
    pub polyfaces: KindStats,
    /// Block instances whose definition was found.
    pub resolved_inserts: usize,
    /// Block instances naming an undefined block.
    pub unresolved_inserts: usize,
    /// Block instances skipped after the block face budget ran out.
    pub skipped_inserts: usize,
    /// Polyface face records with fewer than three usable corners.
    pub dropped_face_records: usize,
}

impl ConversionStats {
    pub fn count_entity(&mut self, kind: &str) {
        *self.entity_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub fn entity_count(&self, kind: &str) -> usize {
        self.entity_counts.get(kind).copied().unwrap_or(0)
    }

    /// The `n` most frequent entity kinds, most frequent first.
    pub fn top_kinds(&self, n: usize) -> Vec<(&str, usize)> {
        let mut kinds: Vec<_> = self
            .entity_counts
            .iter()
            .map(|(kind, count)| (kind.as_str(), *count))
            .collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        kinds.truncate(n);
        kinds
    }

    fn family_mut(&mut self, kind: SourceKind) -> &mut KindStats {
        match kind {
            SourceKind::DirectFace | SourceKind::BlockFace => &mut self.faces,
            SourceKind::Polyface => &mut self.polyfaces,
        }
    }

    pub fn record_valid(&mut self, kind: SourceKind) {
        self.family_mut(kind).valid += 1;
    }

    /// Count an invalid entity; returns the family's new invalid total.
    pub fn record_invalid(&mut self, kind: SourceKind) -> usize {
        let family = self.family_mut(kind);
        family.invalid += 1;
        family.invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_faces_share_face_family() {
        let mut stats = ConversionStats::default();
        stats.record_valid(SourceKind::DirectFace);
        stats.record_valid(SourceKind::BlockFace);
        assert_eq!(stats.record_invalid(SourceKind::BlockFace), 1);
        assert_eq!(stats.record_invalid(SourceKind::DirectFace), 2);

        assert_eq!(stats.faces, KindStats { valid: 2, invalid: 2 });
        assert_eq!(stats.polyfaces, KindStats::default());
    }

    #[test]
    fn test_top_kinds() {
        let mut stats = ConversionStats::default();
        for kind in ["LINE", "3DFACE", "3DFACE", "INSERT", "3DFACE", "LINE"] {
            stats.count_entity(kind);
        }

        assert_eq!(stats.top_kinds(2), vec![("3DFACE", 3), ("LINE", 2)]);
        assert_eq!(stats.entity_count("CIRCLE"), 0);
    }
}
