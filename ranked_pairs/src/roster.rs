use std::collections::HashMap;

use log::debug;

use crate::config::*;

/// The position of a candidate in the roster.
///
/// Candidates are numbered densely from 0, in the order they were registered.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub usize);

impl CandidateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The fixed list of candidates of one election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Roster {
    candidates: Vec<Candidate>,
    by_name: HashMap<String, CandidateId>,
}

impl Roster {
    /// Registers the candidates, in order.
    ///
    /// The size of the roster is checked against the rules before anything else happens.
    pub fn new(candidates: &[Candidate], rules: &VoteRules) -> Result<Roster, VotingErrors> {
        if candidates.is_empty() {
            return Err(VotingErrors::EmptyElection);
        }
        if candidates.len() > rules.max_candidates {
            return Err(VotingErrors::CandidateLimitExceeded {
                count: candidates.len(),
                max: rules.max_candidates,
            });
        }
        let mut by_name: HashMap<String, CandidateId> = HashMap::new();
        for (idx, c) in candidates.iter().enumerate() {
            if by_name.insert(c.name.clone(), CandidateId(idx)).is_some() {
                return Err(VotingErrors::DuplicateCandidate(c.name.clone()));
            }
        }
        debug!("Roster::new: {:?}", by_name);
        Ok(Roster {
            candidates: candidates.to_vec(),
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn lookup(&self, name: &str) -> Option<CandidateId> {
        self.by_name.get(name).cloned()
    }

    /// The name of a registered candidate.
    ///
    /// Panics if the id does not come from this roster.
    pub fn name(&self, cid: CandidateId) -> &str {
        &self.candidates[cid.0].name
    }

    pub fn names(&self, cids: &[CandidateId]) -> Vec<String> {
        cids.iter().map(|cid| self.name(*cid).to_string()).collect()
    }

    /// Translates a ranking by names into a ranking by ids.
    ///
    /// Only the names are checked here. Whether the ranking is complete is
    /// checked when the ballot is tallied.
    pub fn ballot_from_names(&self, names: &[String]) -> Result<Vec<CandidateId>, BallotDefect> {
        names
            .iter()
            .map(|name| {
                self.lookup(name)
                    .ok_or_else(|| BallotDefect::UnknownCandidate(name.clone()))
            })
            .collect()
    }
}
