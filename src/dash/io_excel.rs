// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::dash::{
    io_common::{parse_number, simplify_file_name, ColumnIndexes},
    *,
};

pub fn read_excel_sites(path: &str, worksheet: Option<&str>) -> DashResult<Vec<RawSiteRecord>> {
    let wrange = get_range(path, worksheet)?;

    // Line of the header in the worksheet, starting at 1.
    let header_lineno = wrange.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_excel_sites: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<RawSiteRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = header_lineno + idx + 1;
        if row.iter().all(|c| *c == DataType::Empty) {
            debug!("read_excel_sites: lineno: {:?}: skipping empty row", lineno);
            continue;
        }
        debug!("read_excel_sites: lineno: {:?} row: {:?}", lineno, row);
        let id = match row.get(cols.campus) {
            Some(DataType::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(DataType::Empty) | Some(DataType::String(_)) | None => {
                return MissingValueSnafu {
                    lineno,
                    column: COL_CAMPUS,
                }
                .fail();
            }
            Some(c) => cell_to_string(c),
        };
        res.push(RawSiteRecord {
            lineno,
            id,
            total_users: cell_count(lineno, COL_TOTAL_USERS, row.get(cols.total_users))?,
            active_users: cell_count(lineno, COL_ACTIVE_USERS, row.get(cols.active_users))?,
            adoption_pct: cell_pct(row.get(cols.adoption_pct)),
            latitude: cell_number(lineno, COL_LATITUDE, row.get(cols.latitude))?,
            longitude: cell_number(lineno, COL_LONGITUDE, row.get(cols.longitude))?,
        });
    }
    info!(
        "read_excel_sites: read {} sites from {}",
        res.len(),
        simplify_file_name(path)
    );
    Ok(res)
}

fn get_range(path: &str, worksheet: Option<&str>) -> DashResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Empty => "".to_string(),
        c => format!("{:?}", c),
    }
}

fn cell_number(lineno: usize, column: &'static str, cell: Option<&DataType>) -> DashResult<f64> {
    match cell {
        Some(DataType::Float(f)) => Ok(*f),
        Some(DataType::Int(i)) => Ok(*i as f64),
        Some(DataType::String(s)) if !s.trim().is_empty() => parse_number(lineno, column, s),
        Some(DataType::Empty) | Some(DataType::String(_)) | None => {
            MissingValueSnafu { lineno, column }.fail()
        }
        Some(c) => ExcelWrongCellTypeSnafu {
            lineno,
            column,
            content: format!("{:?}", c),
        }
        .fail(),
    }
}

// Integer cells and text are passed as text, so that the model reads them
// without rounding.
fn cell_count(lineno: usize, column: &'static str, cell: Option<&DataType>) -> DashResult<CountField> {
    match cell {
        Some(DataType::Float(f)) => Ok(CountField::Number(*f)),
        Some(DataType::Int(i)) => Ok(CountField::Text(i.to_string())),
        Some(DataType::String(s)) if !s.trim().is_empty() => Ok(CountField::Text(s.clone())),
        Some(DataType::Empty) | Some(DataType::String(_)) | None => {
            MissingValueSnafu { lineno, column }.fail()
        }
        Some(c) => ExcelWrongCellTypeSnafu {
            lineno,
            column,
            content: format!("{:?}", c),
        }
        .fail(),
    }
}

fn cell_pct(cell: Option<&DataType>) -> PctField {
    match cell {
        Some(DataType::Float(f)) => PctField::Number(*f),
        Some(DataType::Int(i)) => PctField::Number(*i as f64),
        Some(DataType::String(s)) => PctField::Text(s.clone()),
        Some(DataType::Empty) | None => PctField::Text("".to_string()),
        Some(c) => PctField::Other(format!("{:?}", c)),
    }
}
