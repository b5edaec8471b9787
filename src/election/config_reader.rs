use crate::election::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_juridiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The description of the contest, as written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    pub ballots: Option<String>,
    pub candidates: Vec<ConfigCandidate>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn from_path(path: &str, provider: &str, worksheet: Option<String>) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
            excel_worksheet_name: worksheet,
        }
    }

    /// The first column with a choice, starting at 0.
    pub fn first_vote_column_index(&self) -> TResult<usize> {
        read_index(&self._first_vote_column_index, "firstVoteColumnIndex").map(|x| x.unwrap_or(0))
    }

    /// The first row with a ballot, starting at 0.
    pub fn first_vote_row_index(&self) -> TResult<usize> {
        read_index(&self._first_vote_row_index, "firstVoteRowIndex").map(|x| x.unwrap_or(0))
    }

    /// The column with the ballot ids, starting at 0.
    pub fn id_column_index_int(&self) -> TResult<Option<usize>> {
        read_index(&self.id_column_index, "idColumnIndex")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    pub name: String,
    pub code: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigRules {
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<JSValue>,
}

impl ConfigRules {
    pub fn max_candidates(&self) -> TResult<Option<usize>> {
        read_js_count(&self.max_candidates)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "ballotSources", default)]
    pub ballot_sources: Vec<FileSource>,
    pub candidates: Vec<ConfigCandidate>,
    #[serde(default)]
    pub rules: ConfigRules,
}

impl ElectionConfig {
    /// A configuration with only the names of the candidates.
    /// The votes are then asked interactively.
    pub fn from_candidates(names: &[String]) -> ElectionConfig {
        ElectionConfig {
            output_settings: OutputSettings {
                contest_name: "tideman".to_string(),
                contest_date: None,
                contest_juridiction: None,
                contest_office: None,
            },
            ballot_sources: vec![],
            candidates: names
                .iter()
                .map(|name| ConfigCandidate {
                    name: name.clone(),
                    code: None,
                })
                .collect(),
            rules: ConfigRules::default(),
        }
    }
}

pub fn read_config(path: &str) -> TResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> TResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// 1-based index in the configuration, 0-based in the code.
fn read_index(x: &Option<JSValue>, field: &str) -> TResult<Option<usize>> {
    match read_js_int(x)? {
        Some(0) => whatever!("{} starts at 1, got 0", field),
        Some(i) => Ok(Some(i - 1)),
        None => Ok(None),
    }
}

// A number, or a string holding a number.
fn read_js_count(x: &Option<JSValue>) -> TResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .and_then(|x| usize::try_from(x).ok())
            .map(Some)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

// Same as read_js_count, with Excel-style columns as well: A is 1, Z is 26, AA is 27.
fn read_js_int(x: &Option<JSValue>) -> TResult<Option<usize>> {
    match x {
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            let col = s
                .to_ascii_lowercase()
                .chars()
                .try_fold(0usize, |acc, c| {
                    acc.checked_mul(26)?
                        .checked_add(c as usize - 'a' as usize + 1)
                })
                .context(ParsingJsonNumberSnafu {})?;
            Ok(Some(col))
        }
        _ => read_js_count(x),
    }
}
