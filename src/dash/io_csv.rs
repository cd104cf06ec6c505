// Primitives for reading CSV files.

use csv::StringRecord;

use crate::dash::{
    io_common::{parse_number, simplify_file_name, ColumnIndexes},
    *,
};

pub fn read_csv_sites(path: &str) -> DashResult<Vec<RawSiteRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_sites: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<RawSiteRecord> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let fallback_lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {
            lineno: fallback_lineno,
        })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_lineno);
        debug!("read_csv_sites: lineno: {:?} row: {:?}", lineno, line);
        res.push(read_record(&line, lineno, &cols)?);
    }
    info!(
        "read_csv_sites: read {} sites from {}",
        res.len(),
        simplify_file_name(path)
    );
    Ok(res)
}

fn read_record(line: &StringRecord, lineno: usize, cols: &ColumnIndexes) -> DashResult<RawSiteRecord> {
    let get = |idx: usize, column: &'static str| -> DashResult<&str> {
        line.get(idx)
            .filter(|s| !s.is_empty())
            .context(MissingValueSnafu { lineno, column })
    };
    Ok(RawSiteRecord {
        lineno,
        id: get(cols.campus, COL_CAMPUS)?.to_string(),
        // Counts are checked by the model, without going through a float.
        total_users: CountField::Text(get(cols.total_users, COL_TOTAL_USERS)?.to_string()),
        active_users: CountField::Text(get(cols.active_users, COL_ACTIVE_USERS)?.to_string()),
        adoption_pct: PctField::Text(
            line.get(cols.adoption_pct).unwrap_or_default().to_string(),
        ),
        latitude: parse_number(lineno, COL_LATITUDE, get(cols.latitude, COL_LATITUDE)?)?,
        longitude: parse_number(lineno, COL_LONGITUDE, get(cols.longitude, COL_LONGITUDE)?)?,
    })
}
