/*!
An implementation of the Ranked Pairs method (also known as the Tideman method).

Every ballot ranks all the candidates. The ballots are turned into pairwise
preference counts, the pairwise victories are sorted from the strongest to the
weakest, and each victory is locked into a graph of candidates unless it would
create a cycle with the victories already locked. The winner is the candidate
that nobody is locked in over.

```
use ranked_pairs::{run_election, Candidate, Vote, VoteRules};
# use ranked_pairs::VotingErrors;

let candidates: Vec<Candidate> = ["A", "B", "C"].iter().map(|n| Candidate::new(n)).collect();
let mut votes: Vec<Vote> = Vec::new();
for (count, ranks) in [(3, ["A", "B", "C"]), (2, ["B", "C", "A"]), (2, ["C", "A", "B"])] {
    for _ in 0..count {
        votes.push(Vote {
            candidates: ranks.iter().map(|s| s.to_string()).collect(),
        });
    }
}
let result = run_election(&votes, &VoteRules::DEFAULT_RULES, &candidates)?;
assert_eq!(result.winner, "A");
# Ok::<(), VotingErrors>(())
```

The stages are also available on their own, working on candidate ids: see
[`PreferenceTally`], [`generate_pairs`], [`rank_pairs`], [`lock_pairs`] and
[`resolve_winner`].
*/

pub mod builder;
mod config;
mod graph;
pub mod manual;
mod pairs;
mod roster;
mod tally;

use log::{debug, error, info};

pub use crate::config::*;
pub use crate::graph::{lock_pairs, resolve_winner, LockDecision, LockedGraph, ResolutionAnomaly};
pub use crate::pairs::{generate_pairs, rank_pairs, Pair, RankedPairs};
pub use crate::roster::{CandidateId, Roster};
pub use crate::tally::{PreferenceMatrix, PreferenceTally};

/// Runs the Ranked Pairs method on the given votes.
///
/// Arguments:
/// * `coll` the ballots. Each of them must rank every candidate exactly once.
/// The first ballot that does not stops the election.
/// * `rules` the rules that govern this election
/// * `candidates` the registered candidates, in order. The order is used to
/// break ties between pairs with the same margin.
pub fn run_election(
    coll: &[Vote],
    rules: &VoteRules,
    candidates: &[Candidate],
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} votes, candidates: {:?}, rules: {:?}",
        coll.len(),
        candidates,
        rules
    );
    let roster = Roster::new(candidates, rules)?;
    for (idx, c) in roster.candidates().iter().enumerate() {
        info!("Candidate: {}: {}", idx, c.name);
    }

    let mut tally = PreferenceTally::new(roster.len());
    for (idx, v) in coll.iter().enumerate() {
        let recorded = roster
            .ballot_from_names(&v.candidates)
            .and_then(|ranks| tally.record(&ranks))
            .map_err(|defect| VotingErrors::InvalidBallot {
                ballot: idx,
                defect,
            });
        if let Err(e) = recorded {
            debug!("run_election: rejecting vote {:?}: {}", v, e);
            return Err(e);
        }
    }
    tabulate(&roster, tally.finish())
}

/// Runs the pairing, ranking, locking and resolution stages on a frozen tally.
pub(crate) fn tabulate(
    roster: &Roster,
    matrix: PreferenceMatrix,
) -> Result<VotingResult, VotingErrors> {
    info!("Tabulating {} ballots", matrix.ballot_count());
    let ranked = rank_pairs(generate_pairs(&matrix));
    let (graph, decisions) = lock_pairs(roster.len(), &ranked);
    for (p, d) in ranked.iter().zip(decisions.iter()) {
        info!(
            "{} -> {} margin: {} {}",
            roster.name(p.winner),
            roster.name(p.loser),
            p.margin,
            match d {
                LockDecision::Locked => "locked",
                LockDecision::Skipped => "skipped",
            }
        );
    }

    let winner = resolve_winner(&graph)
        .map_err(|anomaly| classify_anomaly(&anomaly, &matrix, roster))?;
    info!("Winner: {}", roster.name(winner));

    let n = roster.len();
    let mut tally: Vec<PreferenceStats> = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i != j {
                tally.push(PreferenceStats {
                    preferred: roster.name(CandidateId(i)).to_string(),
                    other: roster.name(CandidateId(j)).to_string(),
                    count: matrix.preference(CandidateId(i), CandidateId(j)),
                });
            }
        }
    }

    let pair_stats: Vec<PairStats> = ranked
        .iter()
        .zip(decisions.iter())
        .map(|(p, d)| PairStats {
            winner: roster.name(p.winner).to_string(),
            loser: roster.name(p.loser).to_string(),
            margin: p.margin,
            locked: *d == LockDecision::Locked,
        })
        .collect();

    Ok(VotingResult {
        winner: roster.name(winner).to_string(),
        ballot_count: matrix.ballot_count(),
        tally,
        pair_stats,
    })
}

// Several sources can only all be undefeated if none of them beats another one.
// Anything else means the locking went wrong.
fn classify_anomaly(
    anomaly: &ResolutionAnomaly,
    matrix: &PreferenceMatrix,
    roster: &Roster,
) -> VotingErrors {
    let sources = &anomaly.sources;
    let names = roster.names(sources);
    let all_tied = sources.len() > 1
        && sources
            .iter()
            .all(|a| sources.iter().all(|b| matrix.is_tied(*a, *b)));
    if all_tied {
        info!("No unique winner, tied candidates: {:?}", names);
        VotingErrors::UnresolvedTie(names)
    } else {
        error!("Locked graph has an invalid set of sources: {:?}", names);
        VotingErrors::ResolutionInvariantViolated(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names.iter().map(|n| Candidate::new(n)).collect()
    }

    fn votes<const N: usize>(ballots: &[(usize, [&str; N])]) -> Vec<Vote> {
        let mut res: Vec<Vote> = Vec::new();
        for (count, ranks) in ballots {
            for _ in 0..*count {
                res.push(Vote {
                    candidates: ranks.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        res
    }

    fn condorcet_cycle() -> Vec<Vote> {
        votes(&[
            (3, ["A", "B", "C"]),
            (2, ["B", "C", "A"]),
            (2, ["C", "A", "B"]),
        ])
    }

    #[test]
    fn condorcet_cycle_scenario() {
        init();
        let res = run_election(
            &condorcet_cycle(),
            &VoteRules::DEFAULT_RULES,
            &candidates(&["A", "B", "C"]),
        )
        .unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.ballot_count, 7);
        let pairs: Vec<(&str, &str, u64, bool)> = res
            .pair_stats
            .iter()
            .map(|p| (p.winner.as_str(), p.loser.as_str(), p.margin, p.locked))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A", "B", 3, true),
                ("B", "C", 3, true),
                ("C", "A", 1, false)
            ]
        );
        let count = |a: &str, b: &str| {
            res.tally
                .iter()
                .find(|t| t.preferred == a && t.other == b)
                .map(|t| t.count)
        };
        assert_eq!(count("A", "B"), Some(5));
        assert_eq!(count("B", "A"), Some(2));
        assert_eq!(count("B", "C"), Some(5));
        assert_eq!(count("C", "B"), Some(2));
        assert_eq!(count("C", "A"), Some(4));
        assert_eq!(count("A", "C"), Some(3));
        assert_eq!(res.tally.len(), 6);
    }

    #[test]
    fn condorcet_winner() {
        init();
        let res = run_election(
            &votes(&[
                (4, ["B", "A", "C"]),
                (3, ["A", "B", "C"]),
                (2, ["C", "B", "A"]),
            ]),
            &VoteRules::DEFAULT_RULES,
            &candidates(&["A", "B", "C"]),
        )
        .unwrap();
        assert_eq!(res.winner, "B");
        assert!(res.pair_stats.iter().all(|p| p.locked));
    }

    #[test]
    fn same_result_on_every_run() {
        init();
        let cands = candidates(&["A", "B", "C"]);
        let first = run_election(&condorcet_cycle(), &VoteRules::DEFAULT_RULES, &cands);
        let second = run_election(&condorcet_cycle(), &VoteRules::DEFAULT_RULES, &cands);
        assert_eq!(first, second);
    }

    #[test]
    fn ballot_missing_a_candidate() {
        init();
        let mut coll = condorcet_cycle();
        coll.insert(
            1,
            Vote {
                candidates: vec!["A".to_string(), "B".to_string()],
            },
        );
        assert_eq!(
            run_election(
                &coll,
                &VoteRules::DEFAULT_RULES,
                &candidates(&["A", "B", "C"])
            ),
            Err(VotingErrors::InvalidBallot {
                ballot: 1,
                defect: BallotDefect::WrongLength {
                    expected: 3,
                    found: 2
                }
            })
        );
    }

    #[test]
    fn ballot_with_unknown_candidate() {
        init();
        let coll = votes(&[(1, ["A", "B", "Zed"])]);
        assert_eq!(
            run_election(
                &coll,
                &VoteRules::DEFAULT_RULES,
                &candidates(&["A", "B", "C"])
            ),
            Err(VotingErrors::InvalidBallot {
                ballot: 0,
                defect: BallotDefect::UnknownCandidate("Zed".to_string())
            })
        );
    }

    #[test]
    fn too_many_candidates() {
        init();
        let rules = VoteRules { max_candidates: 2 };
        assert_eq!(
            run_election(&condorcet_cycle(), &rules, &candidates(&["A", "B", "C"])),
            Err(VotingErrors::CandidateLimitExceeded { count: 3, max: 2 })
        );
    }

    #[test]
    fn tie_between_two_candidates() {
        init();
        let res = run_election(
            &votes(&[(1, ["A", "B"]), (1, ["B", "A"])]),
            &VoteRules::DEFAULT_RULES,
            &candidates(&["A", "B"]),
        );
        assert_eq!(
            res,
            Err(VotingErrors::UnresolvedTie(vec![
                "A".to_string(),
                "B".to_string()
            ]))
        );
    }

    #[test]
    fn no_ballots() {
        init();
        let res = run_election(&[], &VoteRules::DEFAULT_RULES, &candidates(&["A", "B"]));
        assert!(matches!(res, Err(VotingErrors::UnresolvedTie(_))));

        let res = run_election(&[], &VoteRules::DEFAULT_RULES, &candidates(&["A"])).unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.ballot_count, 0);
    }

    #[test]
    fn broken_graph_is_an_internal_error() {
        init();
        let roster = Roster::new(&candidates(&["A", "B"]), &VoteRules::DEFAULT_RULES).unwrap();
        let mut t = PreferenceTally::new(2);
        t.record(&[CandidateId(0), CandidateId(1)]).unwrap();
        let matrix = t.finish();
        // A beats B, so both being undefeated is not a tie.
        let anomaly = ResolutionAnomaly {
            sources: vec![CandidateId(0), CandidateId(1)],
        };
        assert_eq!(
            classify_anomaly(&anomaly, &matrix, &roster),
            VotingErrors::ResolutionInvariantViolated(vec!["A".to_string(), "B".to_string()])
        );
        let anomaly = ResolutionAnomaly { sources: vec![] };
        assert_eq!(
            classify_anomaly(&anomaly, &matrix, &roster),
            VotingErrors::ResolutionInvariantViolated(vec![])
        );
    }
}
