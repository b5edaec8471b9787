// Primitives for reading CSV files.

use std::io::Read;

use crate::election::{
    io_common::{assemble_ballot, make_default_id, read_ballot_id},
    *,
};

pub fn read_csv_ranking(path: String, cfs: &FileSource) -> TResult<Vec<ParsedBallot>> {
    let rdr = csv_builder()
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    read_records(rdr, &path, cfs)
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Rows of different lengths are refused later, as invalid ballots.
    builder.has_headers(false).flexible(true);
    builder
}

fn read_records<R: Read>(
    rdr: csv::Reader<R>,
    path: &str,
    cfs: &FileSource,
) -> TResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let first_row = cfs.first_vote_row_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        let id = read_ballot_id(&cells, id_idx_o, path, lineno, &default_id)?;

        let pb = assemble_ballot(id, &cells, choices_start_col, id_idx_o);
        debug!("read_csv_ranking: lineno: {:?} ballot: {:?}", lineno, &pb);
        res.push(pb);
    }
    Ok(res)
}
