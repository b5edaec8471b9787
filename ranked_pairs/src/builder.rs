pub use crate::config::*;
use crate::roster::Roster;
use crate::tally::PreferenceTally;
use log::debug;

/// A builder for adding votes one at a time.
///
/// Each vote is checked and tallied as soon as it is added. A vote that does not
/// rank every candidate exactly once is refused and leaves the tally untouched,
/// so that the caller can decide what to do with it.
///
/// ```
/// pub use ranked_pairs::builder::Builder;
/// pub use ranked_pairs::VoteRules;
/// # use ranked_pairs::VotingErrors;
///
/// let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Bob".to_string()])?;
/// assert!(builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string()]).is_err());
///
/// let result = builder.run()?;
/// assert_eq!(result.winner, "Anna");
/// assert_eq!(result.ballot_count, 1);
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _election: Option<(Roster, PreferenceTally)>,
    // Number of votes submitted so far, refused ones included.
    pub(crate) _submitted: usize,
}

impl Builder {
    pub fn new(rules: &VoteRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _election: None,
            _submitted: 0,
        })
    }

    /// Registers the candidates. Any vote added before is discarded.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        let candidates: Vec<Candidate> = cands.iter().map(|name| Candidate::new(name)).collect();
        self.candidates_2(&candidates)
    }

    pub fn candidates_2(self, cands: &[Candidate]) -> Result<Builder, VotingErrors> {
        let roster = Roster::new(cands, &self._rules)?;
        let tally = PreferenceTally::new(roster.len());
        Ok(Builder {
            _rules: self._rules,
            _election: Some((roster, tally)),
            _submitted: 0,
        })
    }

    /// True if the name is one of the registered candidates.
    pub fn is_candidate(&self, name: &str) -> bool {
        match &self._election {
            Some((roster, _)) => roster.lookup(name).is_some(),
            None => false,
        }
    }

    pub fn num_candidates(&self) -> usize {
        self._election
            .as_ref()
            .map(|(roster, _)| roster.len())
            .unwrap_or(0)
    }

    /// Adds a vote: the names of all the candidates, from the most preferred
    /// to the least preferred.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        self.add_vote_2(&Vote {
            candidates: candidates.to_vec(),
        })
    }

    pub fn add_vote_2(&mut self, vote: &Vote) -> Result<(), VotingErrors> {
        let ballot = self._submitted;
        self._submitted += 1;
        let (roster, tally) = self
            ._election
            .as_mut()
            .ok_or(VotingErrors::EmptyElection)?;
        roster
            .ballot_from_names(&vote.candidates)
            .and_then(|ranks| tally.record(&ranks))
            .map_err(|defect| {
                debug!("add_vote_2: refusing vote {:?}: {}", vote, defect);
                VotingErrors::InvalidBallot { ballot, defect }
            })
    }

    /// Number of votes counted so far.
    pub fn ballot_count(&self) -> u64 {
        self._election
            .as_ref()
            .map(|(_, tally)| tally.ballot_count())
            .unwrap_or(0)
    }

    /// Runs the election on the votes accepted so far.
    pub fn run(&self) -> Result<VotingResult, VotingErrors> {
        let (roster, tally) = self._election.as_ref().ok_or(VotingErrors::EmptyElection)?;
        crate::tabulate(roster, tally.clone().finish())
    }
}
