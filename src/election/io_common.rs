use std::path::Path;

use crate::election::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// The id of the ballot on line `lineno`.
///
/// A row without the id column is an error. A blank id is replaced by the default
/// one, built from the file name and the line.
pub fn read_ballot_id(
    cells: &[String],
    id_idx_o: Option<usize>,
    path: &str,
    lineno: usize,
    default_id: impl Fn(usize) -> String,
) -> TResult<String> {
    match id_idx_o {
        Some(id_idx) => {
            let s = cells.get(id_idx).context(LineTooShortSnafu {
                path,
                lineno,
                column: id_idx + 1,
            })?;
            match s.trim() {
                "" => Ok(default_id(lineno)),
                s => Ok(s.to_string()),
            }
        }
        None => Ok(default_id(lineno)),
    }
}

/// Builds a ballot from the cells of a row.
///
/// The choices are the non-blank cells from `first_col` onwards, skipping the id
/// column. Blank cells are dropped: the ballot is then too short and gets refused
/// when it is counted.
pub fn assemble_ballot(
    id: String,
    cells: &[String],
    first_col: usize,
    id_col: Option<usize>,
) -> ParsedBallot {
    let choices: Vec<String> = cells
        .iter()
        .enumerate()
        .skip(first_col)
        .filter(|(idx, _)| Some(*idx) != id_col)
        .map(|(_, s)| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    ParsedBallot {
        id: Some(id),
        choices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_ids() {
        assert_eq!(simplify_file_name("/tmp/data/ballots.csv"), "ballots.csv");
        let f = make_default_id("/tmp/data/ballots.csv");
        assert_eq!(f(12), "ballots.csv-00000012");
    }

    #[test]
    fn choices_skip_id_and_blanks() {
        let pb = assemble_ballot(
            "b1".to_string(),
            &cells(&["b1", " A ", "", "C"]),
            0,
            Some(0),
        );
        assert_eq!(pb.id, Some("b1".to_string()));
        assert_eq!(pb.choices, cells(&["A", "C"]));

        let pb = assemble_ballot("x".to_string(), &cells(&["7", "B", "A"]), 1, None);
        assert_eq!(pb.choices, cells(&["B", "A"]));
    }

    #[test]
    fn ballot_ids() {
        let default_id = make_default_id("votes.csv");
        let row = cells(&["v1", "A", "B"]);
        assert_eq!(
            read_ballot_id(&row, Some(0), "votes.csv", 3, &default_id).unwrap(),
            "v1"
        );
        assert_eq!(
            read_ballot_id(&row, None, "votes.csv", 3, &default_id).unwrap(),
            "votes.csv-00000003"
        );
        let blank = cells(&[" ", "A", "B"]);
        assert_eq!(
            read_ballot_id(&blank, Some(0), "votes.csv", 4, &default_id).unwrap(),
            "votes.csv-00000004"
        );
        let err = read_ballot_id(&row, Some(5), "votes.csv", 5, &default_id).unwrap_err();
        assert!(matches!(
            err,
            TidemanError::LineTooShort {
                lineno: 5,
                column: 6,
                ..
            }
        ));
    }
}
