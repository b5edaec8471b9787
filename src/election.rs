pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_prompt;

use log::{debug, info, warn};

use ranked_pairs::builder::Builder;
use ranked_pairs::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;

pub const EXIT_USAGE: i32 = 1;
pub const EXIT_CANDIDATE_LIMIT: i32 = 2;
pub const EXIT_INVALID_BALLOT: i32 = 3;
pub const EXIT_NO_UNIQUE_WINNER: i32 = 4;
pub const EXIT_INTERNAL: i32 = 5;
pub const EXIT_IO: i32 = 6;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TidemanError {
    #[snafu(display("{message}"))]
    Usage { message: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Could not understand cell {content} in {path}, line {lineno}"))]
    ExcelWrongCellType {
        path: String,
        lineno: usize,
        content: String,
    },

    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing file {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Line {lineno} of {path} has no column {column}"))]
    LineTooShort {
        path: String,
        lineno: usize,
        column: usize,
    },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: std::io::Error, path: String },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a column index or a positive number"))]
    ParsingJsonNumber {},
    #[snafu(display("Cannot read the working directory"))]
    WorkingDir { source: std::io::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Unknown ballot provider {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary { source: std::io::Error, path: String },

    #[snafu(display("Error while asking for the votes"))]
    Prompt { source: std::io::Error },
    #[snafu(display("Unexpected end of input while asking for the votes"))]
    EndOfInput {},
    #[snafu(display("Invalid vote: {name:?} is not a candidate"))]
    InvalidVote { name: String },
    #[snafu(display("Invalid vote in ballot {id}: {source}"))]
    InvalidBallot { id: String, source: VotingErrors },

    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl TidemanError {
    /// The status the process exits with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TidemanError::Usage { .. } => EXIT_USAGE,
            TidemanError::InvalidVote { .. } | TidemanError::InvalidBallot { .. } => {
                EXIT_INVALID_BALLOT
            }
            TidemanError::Voting { source } => voting_exit_code(source),
            _ => EXIT_IO,
        }
    }
}

fn voting_exit_code(err: &VotingErrors) -> i32 {
    match err {
        VotingErrors::EmptyElection | VotingErrors::DuplicateCandidate(_) => EXIT_USAGE,
        VotingErrors::CandidateLimitExceeded { .. } => EXIT_CANDIDATE_LIMIT,
        VotingErrors::InvalidBallot { .. } => EXIT_INVALID_BALLOT,
        VotingErrors::UnresolvedTie(_) => EXIT_NO_UNIQUE_WINNER,
        VotingErrors::ResolutionInvariantViolated(_) => EXIT_INTERNAL,
    }
}

pub type TResult<T> = Result<T, TidemanError>;

/// A ballot, as read from a file.
/// This is before checking the names against the candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub choices: Vec<String>,
}

fn result_stats_to_json(rs: &VotingResult) -> JSValue {
    let mut tally: JSMap<String, JSValue> = JSMap::new();
    for ps in rs.tally.iter() {
        let row = tally
            .entry(ps.preferred.clone())
            .or_insert_with(|| JSValue::Object(JSMap::new()));
        if let JSValue::Object(m) = row {
            m.insert(ps.other.clone(), json!(ps.count.to_string()));
        }
    }

    let pairs: Vec<JSValue> = rs
        .pair_stats
        .iter()
        .map(|p| {
            json!({
                "winner": p.winner,
                "loser": p.loser,
                "margin": p.margin.to_string(),
                "locked": p.locked
            })
        })
        .collect();

    json!({"winner": rs.winner, "tally": tally, "pairs": pairs})
}

fn build_summary_js(config: &ElectionConfig, rv: &VotingResult) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_juridiction.clone(),
        office: config.output_settings.contest_office.clone(),
        ballots: Some(rv.ballot_count.to_string()),
        candidates: config.candidates.clone(),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(rv) })
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> TResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(p2, cfs),
        "xlsx" => io_excel::read_excel_ranking(p2, cfs),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn validate_rules(config_rules: &ConfigRules) -> TResult<VoteRules> {
    let max_candidates = config_rules
        .max_candidates()?
        .unwrap_or(VoteRules::DEFAULT_MAX_CANDIDATES);
    Ok(VoteRules { max_candidates })
}

/// Runs an election described by a configuration.
///
/// The ballot sources are resolved relative to `root_path`. If the configuration
/// has no ballot source, the votes are asked on `input`, with the prompts written
/// to `output`.
pub fn run_election<R: BufRead, W: Write>(
    config: &ElectionConfig,
    root_path: &Path,
    input: &mut R,
    output: &mut W,
) -> TResult<VotingResult> {
    // The rules are checked before any ballot is read.
    let rules = validate_rules(&config.rules)?;
    let candidates: Vec<Candidate> = config
        .candidates
        .iter()
        .map(|c| Candidate {
            name: c.name.clone(),
            code: match c.code.clone() {
                Some(x) if x.is_empty() => None,
                x => x,
            },
        })
        .collect();

    let mut builder = Builder::new(&rules)
        .and_then(|b| b.candidates_2(&candidates))
        .context(VotingSnafu {})?;

    if config.ballot_sources.is_empty() {
        io_prompt::prompt_votes(input, output, &mut builder)?;
    } else {
        for cfs in config.ballot_sources.iter() {
            let ballots = read_ranking_data(root_path, cfs)?;
            debug!("run_election: {} ballots in {:?}", ballots.len(), cfs.file_path);
            for (idx, pb) in ballots.iter().enumerate() {
                let id = pb.id.clone().unwrap_or_else(|| format!("#{}", idx + 1));
                builder
                    .add_vote_simple(&pb.choices)
                    .context(InvalidBallotSnafu { id })?;
            }
        }
    }
    info!("Counted {} ballots", builder.ballot_count());

    let res = builder.run();
    info!("res {:?}", res);
    res.context(VotingSnafu {})
}

fn write_summary(summary: &JSValue, out: &str) -> TResult<()> {
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js_stats);
        Ok(())
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js_stats).context(WritingSummarySnafu { path: out })
    }
}

fn check_reference(summary: &JSValue, summary_path: &str) -> TResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

fn load_config(args: &Args) -> TResult<(ElectionConfig, PathBuf)> {
    let (mut config, root_path) = match args.config.as_deref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?;
            (config, root_p.to_path_buf())
        }
        None => {
            ensure!(
                !args.candidates.is_empty(),
                UsageSnafu {
                    message: "Usage: tideman [candidate ...]"
                }
            );
            (
                ElectionConfig::from_candidates(&args.candidates),
                PathBuf::new(),
            )
        }
    };

    if let Some(input) = args.input.as_deref() {
        // A file given on the command line is relative to the working directory.
        let cwd = std::env::current_dir().context(WorkingDirSnafu {})?;
        config.ballot_sources = vec![FileSource::from_path(
            &cwd.join(input).display().to_string(),
            args.input_type.as_deref().unwrap_or("csv"),
            args.excel_worksheet_name.clone(),
        )];
    }
    if let Some(max) = args.max_candidates {
        config.rules.max_candidates = Some(json!(max));
    }
    info!("config: {:?}", config);
    Ok((config, root_path))
}

/// Runs the program and returns the name of the winner.
pub fn run(args: &Args) -> TResult<String> {
    let (config, root_path) = load_config(args)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let result = run_election(&config, &root_path, &mut input, &mut output)?;

    let summary = build_summary_js(&config, &result);
    if let Some(out) = args.out.as_deref() {
        write_summary(&summary, out)?;
    }
    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_deref() {
        check_reference(&summary, summary_p)?;
    }
    Ok(result.winner)
}

#[cfg(test)]
fn run_election_test(test_name: &str) -> TResult<String> {
    let test_dir = format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), test_name);
    info!("Running test {}", test_name);
    let config = read_config(&format!("{}/{}_config.json", test_dir, test_name))?;
    let mut input: &[u8] = b"";
    let mut output: Vec<u8> = Vec::new();
    let result = run_election(&config, Path::new(&test_dir), &mut input, &mut output)?;
    let summary = build_summary_js(&config, &result);
    check_reference(
        &summary,
        &format!("{}/{}_expected_summary.json", test_dir, test_name),
    )?;
    Ok(result.winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_wrapper(test_name: &str) -> String {
        let _ = env_logger::builder().is_test(true).try_init();
        match run_election_test(test_name) {
            Ok(winner) => winner,
            Err(e) => panic!("test {} failed: {}", test_name, e),
        }
    }

    fn config_with_candidates(names: &[&str]) -> ElectionConfig {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        ElectionConfig::from_candidates(&names)
    }

    #[test]
    fn condorcet_cycle() {
        assert_eq!(test_wrapper("condorcet_cycle"), "A");
    }

    #[test]
    fn four_candidates_chain() {
        assert_eq!(test_wrapper("four_candidates_chain"), "A");
    }

    #[test]
    fn spreadsheet_ballots() {
        assert_eq!(test_wrapper("spreadsheet_ballots"), "Bob");
    }

    fn parse_args(args: &[&str]) -> Args {
        use clap::Parser;
        let mut argv = vec!["tideman"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    fn fixture_config(test_name: &str) -> String {
        format!(
            "{}/tests/data/{}/{}_config.json",
            env!("CARGO_MANIFEST_DIR"),
            test_name,
            test_name
        )
    }

    #[test]
    fn command_line_cap_wins_over_config() {
        let config_path = fixture_config("condorcet_cycle");
        let (config, _) = load_config(&parse_args(&[
            "--max-candidates",
            "5",
            "-c",
            config_path.as_str(),
        ]))
        .unwrap();
        assert_eq!(validate_rules(&config.rules).unwrap().max_candidates, 5);

        let (config, _) = load_config(&parse_args(&["-c", config_path.as_str()])).unwrap();
        assert_eq!(validate_rules(&config.rules).unwrap().max_candidates, 3);
    }

    #[test]
    fn input_replaces_configured_sources() {
        let config_path = fixture_config("condorcet_cycle");
        let (config, root_path) =
            load_config(&parse_args(&["-c", config_path.as_str(), "-i", "other_ballots.csv"]))
                .unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.ballot_sources.len(), 1);
        let cfs = &config.ballot_sources[0];
        assert_eq!(cfs.provider, "csv");
        assert_eq!(cfs.file_path, cwd.join("other_ballots.csv").display().to_string());
        // Absolute, so the directory of the configuration does not apply.
        assert_eq!(
            root_path.join(&cfs.file_path),
            cwd.join("other_ballots.csv")
        );
    }

    #[test]
    fn input_type_selects_excel() {
        let (config, _) = load_config(&parse_args(&[
            "-i",
            "votes.xlsx",
            "--input-type",
            "xlsx",
            "--excel-worksheet-name",
            "Sheet2",
            "A",
            "B",
        ]))
        .unwrap();
        let cfs = &config.ballot_sources[0];
        assert_eq!(cfs.provider, "xlsx");
        assert_eq!(cfs.excel_worksheet_name, Some("Sheet2".to_string()));
        assert_eq!(config.candidates.len(), 2);

        // The xlsx provider goes to the Excel reader.
        let mut input: &[u8] = b"";
        let mut output: Vec<u8> = Vec::new();
        let err = run_election(&config, Path::new(""), &mut input, &mut output).unwrap_err();
        assert!(matches!(err, TidemanError::OpeningExcel { .. }));
    }

    #[test]
    fn candidates_are_required() {
        let err = load_config(&parse_args(&[])).unwrap_err();
        assert!(matches!(err, TidemanError::Usage { .. }));
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let (config, root_path) = load_config(&parse_args(&["Alice", "Bob"])).unwrap();
        assert!(config.ballot_sources.is_empty());
        assert_eq!(root_path, PathBuf::new());
    }

    #[test]
    fn prompted_votes() {
        let config = config_with_candidates(&["Alice", "Bob", "Charlie"]);
        let mut input: &[u8] = b"2\nAlice\nCharlie\nBob\nAlice\nBob\nCharlie\n";
        let mut output: Vec<u8> = Vec::new();
        let res = run_election(&config, Path::new(""), &mut input, &mut output).unwrap();
        assert_eq!(res.winner, "Alice");
        assert_eq!(res.ballot_count, 2);
    }

    #[test]
    fn candidate_limit_is_checked_first() {
        let mut config = config_with_candidates(&["A", "B", "C"]);
        config.rules.max_candidates = Some(json!(2));
        // Nothing to read: the error must come before the prompt.
        let mut input: &[u8] = b"";
        let mut output: Vec<u8> = Vec::new();
        let err = run_election(&config, Path::new(""), &mut input, &mut output).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CANDIDATE_LIMIT);
        assert!(output.is_empty());
    }

    #[test]
    fn unknown_provider() {
        let mut config = config_with_candidates(&["A", "B"]);
        config.ballot_sources = vec![FileSource::from_path("votes.txt", "txt", None)];
        let mut input: &[u8] = b"";
        let mut output: Vec<u8> = Vec::new();
        let err = run_election(&config, Path::new(""), &mut input, &mut output).unwrap_err();
        assert!(matches!(err, TidemanError::UnknownProvider { .. }));
        assert_eq!(err.exit_code(), EXIT_IO);
    }

    #[test]
    fn exit_codes() {
        let tie = TidemanError::Voting {
            source: VotingErrors::UnresolvedTie(vec!["A".to_string(), "B".to_string()]),
        };
        assert_eq!(tie.exit_code(), EXIT_NO_UNIQUE_WINNER);
        let internal = TidemanError::Voting {
            source: VotingErrors::ResolutionInvariantViolated(vec![]),
        };
        assert_eq!(internal.exit_code(), EXIT_INTERNAL);
        let usage = TidemanError::Voting {
            source: VotingErrors::EmptyElection,
        };
        assert_eq!(usage.exit_code(), EXIT_USAGE);
        let ballot = TidemanError::InvalidVote {
            name: "Zed".to_string(),
        };
        assert_eq!(ballot.exit_code(), EXIT_INVALID_BALLOT);
        let cwd = TidemanError::WorkingDir {
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(cwd.to_string(), "Cannot read the working directory");
        assert_eq!(cwd.exit_code(), EXIT_IO);
    }

    #[test]
    fn summary_layout() {
        let config = config_with_candidates(&["A", "B"]);
        let rv = VotingResult {
            winner: "A".to_string(),
            ballot_count: 1,
            tally: vec![
                PreferenceStats {
                    preferred: "A".to_string(),
                    other: "B".to_string(),
                    count: 1,
                },
                PreferenceStats {
                    preferred: "B".to_string(),
                    other: "A".to_string(),
                    count: 0,
                },
            ],
            pair_stats: vec![PairStats {
                winner: "A".to_string(),
                loser: "B".to_string(),
                margin: 1,
                locked: true,
            }],
        };
        let js = build_summary_js(&config, &rv);
        assert_eq!(js["config"]["ballots"], json!("1"));
        assert_eq!(js["results"]["winner"], json!("A"));
        assert_eq!(js["results"]["tally"]["A"]["B"], json!("1"));
        assert_eq!(js["results"]["tally"]["B"]["A"], json!("0"));
        assert_eq!(
            js["results"]["pairs"],
            json!([{"winner": "A", "loser": "B", "margin": "1", "locked": true}])
        );
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let test_dir = format!("{}/tests/data/condorcet_cycle", env!("CARGO_MANIFEST_DIR"));
        let summary = json!({"results": {"winner": "B"}});
        let res = check_reference(
            &summary,
            &format!("{}/condorcet_cycle_expected_summary.json", test_dir),
        );
        assert!(matches!(res, Err(TidemanError::ReferenceMismatch {})));
    }
}
