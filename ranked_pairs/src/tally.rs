use log::debug;

use crate::config::BallotDefect;
use crate::roster::CandidateId;

/// Pairwise preference counts, while the ballots are being recorded.
///
/// Once all the ballots are in, [`PreferenceTally::finish`] freezes the counts
/// into a [`PreferenceMatrix`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceTally {
    counts: Matrix,
}

/// Frozen pairwise preference counts.
///
/// `preference(a, b)` is the number of ballots that ranked `a` strictly above `b`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceMatrix {
    counts: Matrix,
}

// Row-major, size x size. The diagonal stays at zero.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Matrix {
    size: usize,
    cells: Vec<u64>,
    ballot_count: u64,
}

impl Matrix {
    fn get(&self, a: CandidateId, b: CandidateId) -> u64 {
        self.cells[a.0 * self.size + b.0]
    }
}

impl PreferenceTally {
    pub fn new(num_candidates: usize) -> PreferenceTally {
        PreferenceTally {
            counts: Matrix {
                size: num_candidates,
                cells: vec![0; num_candidates * num_candidates],
                ballot_count: 0,
            },
        }
    }

    /// Records one ballot, given as candidate ids from the most to the least preferred.
    ///
    /// The ballot must rank every candidate exactly once. A ballot that does not
    /// is refused as a whole and the counts are left untouched.
    pub fn record(&mut self, ranks: &[CandidateId]) -> Result<(), BallotDefect> {
        check_full_ranking(ranks, self.counts.size)?;
        let size = self.counts.size;
        for (pos, above) in ranks.iter().enumerate() {
            for below in ranks[pos + 1..].iter() {
                self.counts.cells[above.0 * size + below.0] += 1;
            }
        }
        self.counts.ballot_count += 1;
        Ok(())
    }

    pub fn ballot_count(&self) -> u64 {
        self.counts.ballot_count
    }

    pub fn finish(self) -> PreferenceMatrix {
        debug!(
            "PreferenceTally::finish: {} ballots, {} candidates",
            self.counts.ballot_count, self.counts.size
        );
        PreferenceMatrix {
            counts: self.counts,
        }
    }
}

impl PreferenceMatrix {
    pub fn num_candidates(&self) -> usize {
        self.counts.size
    }

    pub fn ballot_count(&self) -> u64 {
        self.counts.ballot_count
    }

    pub fn preference(&self, a: CandidateId, b: CandidateId) -> u64 {
        self.counts.get(a, b)
    }

    /// True if neither candidate is strictly preferred to the other.
    pub fn is_tied(&self, a: CandidateId, b: CandidateId) -> bool {
        self.counts.get(a, b) == self.counts.get(b, a)
    }
}

fn check_full_ranking(ranks: &[CandidateId], size: usize) -> Result<(), BallotDefect> {
    if ranks.len() != size {
        return Err(BallotDefect::WrongLength {
            expected: size,
            found: ranks.len(),
        });
    }
    let mut seen = vec![false; size];
    for cid in ranks.iter() {
        match seen.get_mut(cid.0) {
            None => return Err(BallotDefect::CandidateOutOfRange(cid.0)),
            Some(true) => return Err(BallotDefect::DuplicateChoice(cid.0)),
            Some(s) => *s = true,
        }
    }
    Ok(())
}
