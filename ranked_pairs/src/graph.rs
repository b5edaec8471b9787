use std::collections::VecDeque;

use log::debug;

use crate::pairs::{Pair, RankedPairs};
use crate::roster::CandidateId;

/// The directed graph of locked victories.
///
/// An edge `a -> b` means that `a` is locked in over `b`. Edges are only ever
/// added, and only when they keep the graph acyclic.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LockedGraph {
    size: usize,
    // Row-major adjacency matrix.
    edges: Vec<bool>,
}

/// What happened to a pair during locking.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum LockDecision {
    Locked,
    /// The loser already reached the winner: the edge would have closed a cycle.
    Skipped,
}

/// The locked graph does not have exactly one source.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolutionAnomaly {
    /// The candidates without incoming edges. Empty if every candidate has one.
    pub sources: Vec<CandidateId>,
}

impl LockedGraph {
    pub fn new(num_candidates: usize) -> LockedGraph {
        LockedGraph {
            size: num_candidates,
            edges: vec![false; num_candidates * num_candidates],
        }
    }

    pub fn num_candidates(&self) -> usize {
        self.size
    }

    pub fn is_locked(&self, from: CandidateId, to: CandidateId) -> bool {
        self.edges[from.0 * self.size + to.0]
    }

    // Callers are responsible for checking that the edge does not close a cycle.
    fn add_edge(&mut self, from: CandidateId, to: CandidateId) {
        self.edges[from.0 * self.size + to.0] = true;
    }

    fn successors(&self, from: CandidateId) -> impl Iterator<Item = CandidateId> + '_ {
        let row = &self.edges[from.0 * self.size..(from.0 + 1) * self.size];
        row.iter()
            .enumerate()
            .filter_map(|(idx, locked)| if *locked { Some(CandidateId(idx)) } else { None })
    }

    /// The locked edges, in row-major order.
    pub fn edges(&self) -> Vec<(CandidateId, CandidateId)> {
        (0..self.size)
            .flat_map(|i| self.successors(CandidateId(i)).map(move |j| (CandidateId(i), j)))
            .collect()
    }

    /// True if there is a directed path from `from` to `to`.
    /// Every candidate reaches itself.
    pub fn reaches(&self, from: CandidateId, to: CandidateId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.size];
        let mut queue: VecDeque<CandidateId> = VecDeque::new();
        visited[from.0] = true;
        queue.push_back(from);
        while let Some(cur) = queue.pop_front() {
            for next in self.successors(cur) {
                if next == to {
                    return true;
                }
                if !visited[next.0] {
                    visited[next.0] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// True if some candidate can reach itself through at least one edge.
    pub fn has_cycle(&self) -> bool {
        (0..self.size).any(|i| {
            let cid = CandidateId(i);
            self.successors(cid).any(|next| self.reaches(next, cid))
        })
    }

    pub fn in_degree(&self, cid: CandidateId) -> usize {
        (0..self.size)
            .filter(|i| self.is_locked(CandidateId(*i), cid))
            .count()
    }

    /// The candidates without any incoming edge, in candidate order.
    pub fn sources(&self) -> Vec<CandidateId> {
        (0..self.size)
            .map(CandidateId)
            .filter(|cid| self.in_degree(*cid) == 0)
            .collect()
    }

    /// Locks one pair, unless the loser already reaches the winner.
    fn try_lock(&mut self, pair: &Pair) -> LockDecision {
        if self.reaches(pair.loser, pair.winner) {
            debug!(
                "try_lock: skipping {:?} -> {:?} (margin {}): would create a cycle",
                pair.winner, pair.loser, pair.margin
            );
            LockDecision::Skipped
        } else {
            debug!(
                "try_lock: locking {:?} -> {:?} (margin {})",
                pair.winner, pair.loser, pair.margin
            );
            self.add_edge(pair.winner, pair.loser);
            debug_assert!(!self.has_cycle(), "cycle after locking {:?}", pair);
            LockDecision::Locked
        }
    }
}

/// Builds the locked graph from the ranked pairs.
///
/// Pairs are considered strictly in order, each one against the graph locked so
/// far. A skipped pair is never reconsidered. The decisions are returned in the
/// same order as the pairs.
pub fn lock_pairs(num_candidates: usize, pairs: &RankedPairs) -> (LockedGraph, Vec<LockDecision>) {
    let mut graph = LockedGraph::new(num_candidates);
    let decisions: Vec<LockDecision> = pairs.iter().map(|p| graph.try_lock(p)).collect();
    (graph, decisions)
}

/// The unique candidate with no incoming locked edge.
pub fn resolve_winner(graph: &LockedGraph) -> Result<CandidateId, ResolutionAnomaly> {
    match graph.sources().as_slice() {
        [winner] => Ok(*winner),
        sources => Err(ResolutionAnomaly {
            sources: sources.to_vec(),
        }),
    }
}
