// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::election::{
    io_common::{assemble_ballot, make_default_id, read_ballot_id},
    *,
};

pub fn read_excel_ranking(path: String, cfs: &FileSource) -> TResult<Vec<ParsedBallot>> {
    let wrange = get_range(&path, cfs)?;
    let default_id = make_default_id(&path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let first_row = cfs.first_vote_row_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let cells = row
            .iter()
            .map(|cell| read_cell(cell).context(ExcelWrongCellTypeSnafu {
                path: path.clone(),
                lineno,
                content: format!("{:?}", cell),
            }))
            .collect::<TResult<Vec<String>>>()?;
        let id = read_ballot_id(&cells, id_idx_o, &path, lineno, &default_id)?;
        let pb = assemble_ballot(id, &cells, choices_start_col, id_idx_o);
        debug!("read_excel_ranking: lineno: {:?} ballot: {:?}", lineno, &pb);
        res.push(pb);
    }
    Ok(res)
}

// Names can be typed as numbers in a spreadsheet.
fn read_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Empty => Some("".to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        _ => None,
    }
}

fn get_range(path: &str, cfs: &FileSource) -> TResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    match worksheet_name_o {
        // A worksheet name was provided, use it.
        Some(worksheet_name) => workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path }),
    }
}
