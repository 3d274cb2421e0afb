use std::collections::HashMap;

use crate::model::CatalogItem;
use crate::roles::normalize_key;

/// Minimum similarity required before a match is surfaced at all.
pub const DEFAULT_MIN_SCORE: f64 = 0.55;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// The confidence floor; candidates scoring below it are reported as
    /// unmatched rather than shown with a low score.
    pub min_score: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Best catalog candidate for one procurement item name. Transient; scores
/// are recomputed on every comparison view.
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

/// Find the single highest-scoring catalog item for `query`, or None when
/// nothing reaches the confidence floor.
///
/// Both sides are normalized with the same token stripping the column
/// classifier uses, so case and punctuation noise cannot depress scores.
/// Ties break toward catalog order: the first seen candidate keeps the top
/// spot.
pub fn best_match<'a>(
    query: &str,
    candidates: &'a [CatalogItem],
    config: &MatchConfig,
) -> Option<Match<'a>> {
    let normalized_query = normalize_key(query);
    if normalized_query.is_empty() {
        return None;
    }

    let mut best: Option<Match<'a>> = None;
    for item in candidates {
        let score = sequence_ratio(&normalized_query, &normalize_key(&item.item_name));
        let better = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if better {
            best = Some(Match { item, score });
        }
    }

    best.filter(|m| m.score >= config.min_score)
}

/// Character-sequence similarity in [0, 1]: twice the total length of the
/// longest matching blocks over the combined length (Ratcliff/Obershelp).
/// Equal strings score 1.0; two empty strings also score 1.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = total_matching_len(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Sum of matching-block lengths: find the longest common block, then
/// recurse into the pieces left and right of it.
fn total_matching_len(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, k) = longest_block(a, a_lo, a_hi, b, b_lo, b_hi);
        if k == 0 {
            continue;
        }
        total += k;
        pending.push((a_lo, i, b_lo, j));
        pending.push((i + k, a_hi, j + k, b_hi));
    }

    total
}

/// Longest common contiguous block within the given windows, earliest
/// position winning ties.
fn longest_block(
    a: &[char],
    a_lo: usize,
    a_hi: usize,
    b: &[char],
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best = (a_lo, b_lo, 0);
    // Length of the common run ending at each position of b, for the
    // previous row of a.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for i in a_lo..a_hi {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        for j in b_lo..b_hi {
            if a[i] == b[j] {
                let k = if j > b_lo {
                    run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next_runs.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        run_lengths = next_runs;
    }

    best
}
