//! Reciprocal-rank fusion of local and live result lists.

use std::collections::HashMap;

use crate::types::SearchHit;

/// RRF constant; larger values flatten the contribution of top ranks.
pub const RRF_K: f32 = 60.0;

/// Fuses ranked lists into one ordering by accumulated `1 / (k + rank)`.
///
/// Each input list is assumed ranked best-first. A hit appearing in several
/// lists accumulates a contribution per appearance; the first occurrence's
/// metadata (title, URL, provenance) is kept. Ranks are 1-based.
#[must_use]
pub fn reciprocal_rank_fusion(lists: Vec<Vec<SearchHit>>) -> Vec<SearchHit> {
    let mut fused: Vec<SearchHit> = Vec::new();
    let mut scores: HashMap<String, f32> = HashMap::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for list in lists {
        for (rank, hit) in list.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let contribution = 1.0 / (RRF_K + rank as f32 + 1.0);
            *scores.entry(hit.id.clone()).or_insert(0.0) += contribution;
            if !positions.contains_key(&hit.id) {
                positions.insert(hit.id.clone(), fused.len());
                fused.push(hit);
            }
        }
    }

    for hit in &mut fused {
        if let Some(score) = scores.get(&hit.id) {
            hit.score = *score;
        }
    }

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.breakdown
                    .title_prefix_len
                    .cmp(&a.breakdown.title_prefix_len)
            })
            .then_with(|| a.id.cmp(&b.id))
    });
    fused
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::types::{DocKind, ScoreBreakdown};

    fn hit(id: &str, source: &str) -> SearchHit {
        SearchHit {
            id: id.into(),
            title: id.into(),
            library: "/sapui5".into(),
            kind: DocKind::Guide,
            score: 0.0,
            breakdown: ScoreBreakdown::default(),
            excerpt: None,
            url: None,
            source: source.into(),
        }
    }

    #[test]
    fn shared_hits_rank_above_singletons() {
        let local = vec![hit("a", "local"), hit("b", "local")];
        let live = vec![hit("c", "community"), hit("a", "community")];
        let fused = reciprocal_rank_fusion(vec![local, live]);

        assert_eq!(fused[0].id, "a");
        // Provenance of the first occurrence is preserved.
        assert_eq!(fused[0].source, "local");
        assert_eq!(fused.len(), 3);
    }

    #[test]
    fn scores_are_non_increasing() {
        let fused = reciprocal_rank_fusion(vec![
            vec![hit("a", "local"), hit("b", "local"), hit("c", "local")],
            vec![hit("b", "help")],
        ]);
        for pair in fused.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn equal_scores_tie_break_on_prefix_then_id() {
        // One hit per list at rank 1 each: identical RRF contributions.
        let mut shallow = hit("z-hit", "local");
        shallow.breakdown.title_prefix_len = 2;
        let mut deep = hit("a-hit", "community");
        deep.breakdown.title_prefix_len = 9;
        let fused = reciprocal_rank_fusion(vec![vec![shallow], vec![deep]]);
        // The longer title-match prefix wins despite the later id.
        assert_eq!(fused[0].id, "a-hit");

        // With equal prefixes the lexicographic id decides.
        let a = hit("b-hit", "local");
        let b = hit("c-hit", "community");
        let fused = reciprocal_rank_fusion(vec![vec![a], vec![b]]);
        assert_eq!(fused[0].id, "b-hit");
    }

    #[test]
    fn empty_input_fuses_to_empty() {
        assert!(reciprocal_rank_fusion(vec![]).is_empty());
        assert!(reciprocal_rank_fusion(vec![vec![], vec![]]).is_empty());
    }
}
