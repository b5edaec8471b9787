use std::cmp::Reverse;

use log::debug;

use crate::roster::CandidateId;
use crate::tally::PreferenceMatrix;

/// A pairwise victory: more ballots ranked `winner` above `loser` than the opposite.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Pair {
    pub winner: CandidateId,
    pub loser: CandidateId,
    // Invariant: strictly positive.
    pub margin: u64,
}

/// The pairs, from the strongest victory to the weakest.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedPairs(Vec<Pair>);

impl RankedPairs {
    pub fn as_slice(&self) -> &[Pair] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All the pairs with a strict majority.
///
/// The matrix is scanned row by row in candidate order, so the output order
/// only depends on the matrix.
pub fn generate_pairs(matrix: &PreferenceMatrix) -> Vec<Pair> {
    let n = matrix.num_candidates();
    let mut pairs: Vec<Pair> = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (CandidateId(i), CandidateId(j));
            let (for_a, for_b) = (matrix.preference(a, b), matrix.preference(b, a));
            if for_a > for_b {
                pairs.push(Pair {
                    winner: a,
                    loser: b,
                    margin: for_a - for_b,
                });
            }
        }
    }
    debug!("generate_pairs: {} pairs: {:?}", pairs.len(), pairs);
    pairs
}

/// Sorts the pairs by decreasing margin.
///
/// Pairs with the same margin keep the order in which they were generated.
pub fn rank_pairs(pairs: Vec<Pair>) -> RankedPairs {
    let mut pairs = pairs;
    // sort_by_key is stable.
    pairs.sort_by_key(|p| Reverse(p.margin));
    debug!("rank_pairs: {:?}", pairs);
    RankedPairs(pairs)
}
