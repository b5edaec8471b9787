// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A registered candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    /// Optional short label, carried over to the summaries.
    pub code: Option<String>,
}

impl Candidate {
    pub fn new(name: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            code: None,
        }
    }
}

/// A ballot, as provided by a voter.
///
/// The candidates are listed from the most preferred to the least preferred.
/// Every registered candidate must appear exactly once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
}

// ******** Output data structures *********

/// The outcome of one pairwise contest, in the order it was considered for locking.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairStats {
    pub winner: String,
    pub loser: String,
    pub margin: u64,
    /// False when locking this pair would have created a cycle.
    pub locked: bool,
}

/// Number of ballots preferring `preferred` over `other`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceStats {
    pub preferred: String,
    pub other: String,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub winner: String,
    pub ballot_count: u64,
    /// Off-diagonal entries of the preference matrix, in candidate order.
    pub tally: Vec<PreferenceStats>,
    /// All the pairs with a strict majority, sorted by decreasing margin.
    pub pair_stats: Vec<PairStats>,
}

/// The reason a ballot was refused.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotDefect {
    /// The ballot does not rank every candidate, or ranks too many.
    WrongLength { expected: usize, found: usize },
    /// The name is not on the roster.
    UnknownCandidate(String),
    /// The index does not refer to a candidate of this election.
    CandidateOutOfRange(usize),
    /// The candidate at this roster index is ranked more than once.
    DuplicateChoice(usize),
}

impl Display for BallotDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotDefect::WrongLength { expected, found } => write!(
                f,
                "expected {} ranked candidates, found {}",
                expected, found
            ),
            BallotDefect::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
            BallotDefect::CandidateOutOfRange(idx) => {
                write!(f, "candidate index {} is out of range", idx)
            }
            BallotDefect::DuplicateChoice(idx) => {
                write!(f, "candidate #{} is ranked more than once", idx + 1)
            }
        }
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    EmptyElection,
    DuplicateCandidate(String),
    CandidateLimitExceeded {
        count: usize,
        max: usize,
    },
    /// The ballot at position `ballot` (0-based) is not a full ranking.
    /// Nothing from this ballot was counted.
    InvalidBallot {
        ballot: usize,
        defect: BallotDefect,
    },
    /// Several candidates are undefeated and tied with each other.
    UnresolvedTie(Vec<String>),
    /// The locked graph does not have exactly one source.
    /// This is a bug in the locking procedure, not a property of the votes.
    ResolutionInvariantViolated(Vec<String>),
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyElection => write!(f, "no candidates in this election"),
            VotingErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is registered more than once", name)
            }
            VotingErrors::CandidateLimitExceeded { count, max } => write!(
                f,
                "{} candidates registered, the maximum number of candidates is {}",
                count, max
            ),
            VotingErrors::InvalidBallot { ballot, defect } => {
                write!(f, "invalid ballot #{}: {}", ballot + 1, defect)
            }
            VotingErrors::UnresolvedTie(names) => {
                write!(f, "no unique winner, tied candidates: {}", names.join(", "))
            }
            VotingErrors::ResolutionInvariantViolated(names) => write!(
                f,
                "internal error: the locked graph has {} sources: [{}]",
                names.len(),
                names.join(", ")
            ),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    /// Upper bound on the size of the roster. Checked before any ballot is tallied.
    pub max_candidates: usize,
}

impl VoteRules {
    pub const DEFAULT_MAX_CANDIDATES: usize = 9;

    pub const DEFAULT_RULES: VoteRules = VoteRules {
        max_candidates: VoteRules::DEFAULT_MAX_CANDIDATES,
    };
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        assert_eq!(VoteRules::default().max_candidates, 9);
    }

    #[test]
    fn error_messages() {
        let e = VotingErrors::CandidateLimitExceeded { count: 10, max: 9 };
        assert_eq!(
            e.to_string(),
            "10 candidates registered, the maximum number of candidates is 9"
        );
        let e = VotingErrors::InvalidBallot {
            ballot: 2,
            defect: BallotDefect::WrongLength {
                expected: 3,
                found: 2,
            },
        };
        assert_eq!(
            e.to_string(),
            "invalid ballot #3: expected 3 ranked candidates, found 2"
        );
    }
}
