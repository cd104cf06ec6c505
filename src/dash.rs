use log::{debug, info, warn};

use adoption_model::*;
use snafu::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_common::*;
use crate::dash::render::{build_summary_js, make_renderer};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod render;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("The worksheet {name:?} does not exist in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Line {lineno}: unexpected cell in column {column:?}: {content}"))]
    ExcelWrongCellType {
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Line {lineno}: could not read the CSV record"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Missing column {column:?} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno}: missing value in column {column:?}"))]
    MissingValue { lineno: usize, column: String },
    #[snafu(display("Line {lineno}: {content:?} is not a number (column {column:?})"))]
    ParsingNumber {
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading or writing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid dataset"))]
    InvalidDataset { source: ModelError },
    #[snafu(display("Invalid what-if action"))]
    InvalidAction { source: ModelError },
    #[snafu(display("Cannot understand {value:?}: expected SITE=VALUE"))]
    InvalidSetFlag { value: String },
    #[snafu(display("Unknown view {view:?}: expected cards or json"))]
    UnknownView { view: String },
    #[snafu(display("No input file: use --input or a data source in --config"))]
    MissingInput {},
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("Difference detected between the dashboard summary and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// Where the sites come from, after merging the command line and the configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
struct ResolvedSource {
    path: String,
    provider: String,
    worksheet: Option<String>,
}

fn resolve_source(
    args: &Args,
    config: Option<&DashConfig>,
    root_p: Option<&Path>,
) -> DashResult<ResolvedSource> {
    if let Some(input) = args.input.clone() {
        let provider = args
            .input_type
            .clone()
            .unwrap_or_else(|| infer_provider(&input).to_string());
        return Ok(ResolvedSource {
            path: input,
            provider,
            worksheet: args.excel_worksheet_name.clone(),
        });
    }
    let ds = config
        .and_then(|c| c.data_source.clone())
        .context(MissingInputSnafu {})?;
    let root = root_p.context(MissingParentDirSnafu {})?;
    let p: PathBuf = [root, Path::new(&ds.file_path)].iter().collect();
    let path = p.as_path().display().to_string();
    let provider = args
        .input_type
        .clone()
        .or(ds.provider)
        .unwrap_or_else(|| infer_provider(&path).to_string());
    Ok(ResolvedSource {
        path,
        provider,
        worksheet: args.excel_worksheet_name.clone().or(ds.excel_worksheet_name),
    })
}

fn read_sites(source: &ResolvedSource) -> DashResult<Vec<RawSiteRecord>> {
    info!("Attempting to read site file {:?}", source.path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_sites(&source.path),
        "xlsx" => io_excel::read_excel_sites(&source.path, source.worksheet.as_deref()),
        x => {
            whatever!("Input type {:?} not implemented: expected csv or xlsx", x)
        }
    }
}

/// The actions of the configuration, then the ones of the command line.
fn collect_actions(args: &Args, config: Option<&DashConfig>) -> DashResult<Vec<SessionAction>> {
    let mut res: Vec<SessionAction> = config.map(|c| c.actions.clone()).unwrap_or_default();
    if args.what_if {
        res.push(SessionAction::SetMode {
            mode: ConfigMode::WhatIf,
        });
    }
    for flag in args.set.iter() {
        res.push(parse_set_flag(flag)?);
    }
    if args.reset {
        res.push(SessionAction::Reset);
    }
    Ok(res)
}

pub fn apply_actions(session: &mut Session, actions: &[SessionAction]) -> DashResult<()> {
    for action in actions.iter() {
        debug!("apply_actions: {:?}", action);
        match action {
            SessionAction::Toggle => {
                let mode = session.toggle_mode();
                info!("What-if mode toggled: now {:?}", mode);
            }
            SessionAction::SetMode { mode } => session.set_mode((*mode).into()),
            SessionAction::Set { site, active_users } => {
                let stored = session
                    .set_active(site, *active_users)
                    .context(InvalidActionSnafu {})?;
                info!("Active users of {:?} set to {}", site, stored);
            }
            SessionAction::Reset => {
                session.reset();
                info!("Active users restored to the source values");
            }
        }
    }
    Ok(())
}

/// Whether the reported rate agrees with the computed one, within 0.1.
/// Spreadsheets often store percent cells as fractions (0.25 for 25%), so
/// a reported value of at most 1 is also compared after scaling.
fn reported_pct_matches(reported: f64, computed: f64) -> bool {
    let close = |x: f64| (computed - x).abs() <= 0.1 + 1e-9;
    close(reported) || (reported.abs() <= 1.0 && close(100.0 * reported))
}

fn check_reported_pcts(dataset: &Dataset) {
    for s in dataset.sites() {
        let computed = round_pct(100.0 * s.baseline_active_users as f64 / s.total_users as f64);
        if !reported_pct_matches(s.reported_adoption_pct, computed) {
            warn!(
                "Site {:?}: reported adoption {}% differs from the computed {}%",
                s.id, s.reported_adoption_pct, computed
            );
        }
    }
}

/// Where the JSON summary goes: the command line first, then the
/// configuration (relative to its directory). Nothing is written when the
/// json view already printed the summary on the standard output.
fn summary_output_path(
    cli_out: Option<&str>,
    config_out: Option<&str>,
    root_p: Option<&Path>,
    view_name: &str,
) -> Option<String> {
    let p = match (cli_out, config_out) {
        (Some(p), _) => p.to_string(),
        (None, Some("stdout")) => "stdout".to_string(),
        (None, Some(p)) => match root_p {
            Some(root) => root.join(p).display().to_string(),
            None => p.to_string(),
        },
        (None, None) => return None,
    };
    if p == "stdout" && view_name == "json" {
        debug!("summary_output_path: summary already printed by the json view");
        return None;
    }
    Some(p)
}

fn write_output(path: &str, contents: &str) -> DashResult<()> {
    if path == "stdout" {
        println!("{}", contents);
    } else {
        info!("Writing summary to {:?}", path);
        fs::write(path, contents).context(WritingOutputSnafu { path })?;
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let config = match &args.config {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    let root_p: Option<PathBuf> = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p).parent().map(|d| d.to_path_buf()));

    let source = resolve_source(args, config.as_ref(), root_p.as_deref())?;
    let records = read_sites(&source)?;
    let dataset = Dataset::from_records(&records).context(InvalidDatasetSnafu {})?;
    info!("Loaded {} sites from {:?}", dataset.len(), source.path);
    check_reported_pcts(&dataset);

    let actions = collect_actions(args, config.as_ref())?;
    let mut session = dataset.session();
    apply_actions(&mut session, &actions)?;

    let output = config.as_ref().and_then(|c| c.output.clone());
    let mut view = session.view();
    if let Some(title) = output.as_ref().and_then(|o| o.title.clone()) {
        view.title = title;
    }
    let source_name = simplify_file_name(&source.path);

    let view_name = args
        .view
        .clone()
        .or_else(|| output.as_ref().and_then(|o| o.view.clone()))
        .unwrap_or_else(|| "cards".to_string());
    let renderer = make_renderer(&view_name, &source_name)?;
    println!("{}", renderer.render(&view)?);

    let summary_js = build_summary_js(&view, &source_name);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    let config_out = output.and_then(|o| o.output_path);
    let out_path = summary_output_path(
        args.out.as_deref(),
        config_out.as_deref(),
        root_p.as_deref(),
        &view_name,
    );
    if let Some(p) = out_path {
        write_output(&p, &pretty_js_summary)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        debug!("reference summary: {:?}", summary_ref);
        if summary_ref != summary_js {
            let pretty_js_summary_ref =
                serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            return ReferenceMismatchSnafu { path: summary_p }.fail();
        }
        info!("The summary matches the reference {:?}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_dir(test_name: &str) -> String {
        format!("{}/tests/{}", env!("CARGO_MANIFEST_DIR"), test_name)
    }

    fn run_with(flags: &[&str]) -> DashResult<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut argv: Vec<&str> = vec!["adoptiondash"];
        argv.extend_from_slice(flags);
        let args = Args::parse_from(argv);
        run_dashboard(&args)
    }

    fn test_wrapper(test_name: &str) -> DashResult<()> {
        let dir = test_dir(test_name);
        run_with(&[
            "--config",
            &format!("{}/{}_config.json", dir, test_name),
            "--reference",
            &format!("{}/{}_expected_summary.json", dir, test_name),
        ])
    }

    #[test]
    fn two_sites() {
        test_wrapper("two_sites").unwrap();
    }

    #[test]
    fn reset_test() {
        test_wrapper("reset_test").unwrap();
    }

    #[test]
    fn two_sites_from_flags() {
        let dir = test_dir("two_sites");
        run_with(&[
            "--input",
            &format!("{}/two_sites.csv", dir),
            "--what-if",
            "--set",
            "A=100",
            "--view",
            "cards",
            "--reference",
            &format!("{}/two_sites_flags_expected_summary.json", dir),
        ])
        .unwrap();
    }

    #[test]
    fn flags_reset_after_config_actions() {
        // The reset of the command line undoes the edit of the configuration.
        let dir = test_dir("two_sites");
        let res = run_with(&[
            "--config",
            &format!("{}/two_sites_config.json", dir),
            "--reset",
            "--reference",
            &format!("{}/two_sites_expected_summary.json", dir),
        ]);
        assert!(matches!(res, Err(DashError::ReferenceMismatch { .. })));
    }

    #[test]
    fn excel_test() {
        test_wrapper("excel_test").unwrap();
    }

    #[test]
    fn excel_missing_worksheet() {
        let dir = test_dir("excel_test");
        let res = run_with(&[
            "--config",
            &format!("{}/excel_test_config.json", dir),
            "--excel-worksheet-name",
            "Nope",
        ]);
        assert!(matches!(
            res,
            Err(DashError::MissingWorksheet { name, .. }) if name == "Nope"
        ));
    }

    #[test]
    fn excel_counts_are_checked() {
        // Fractional counts in a spreadsheet are refused by the model.
        let records = vec![RawSiteRecord {
            lineno: 3,
            id: "A".to_string(),
            total_users: CountField::Number(100.5),
            active_users: CountField::Number(1.0),
            adoption_pct: PctField::Number(0.01),
            latitude: 36.0,
            longitude: -120.0,
        }];
        assert!(matches!(
            Dataset::from_records(&records),
            Err(ModelError::InvalidCount { lineno: 3, .. })
        ));
    }

    #[test]
    fn summary_printed_once_for_json_on_stdout() {
        assert_eq!(summary_output_path(Some("stdout"), None, None, "json"), None);
        assert_eq!(summary_output_path(None, Some("stdout"), None, "json"), None);
        assert_eq!(
            summary_output_path(Some("stdout"), None, None, "cards"),
            Some("stdout".to_string())
        );
        assert_eq!(
            summary_output_path(Some("out.json"), Some("stdout"), None, "json"),
            Some("out.json".to_string())
        );
        assert_eq!(
            summary_output_path(None, Some("out.json"), Some(Path::new("data")), "json"),
            Some(Path::new("data").join("out.json").display().to_string())
        );
        assert_eq!(summary_output_path(None, None, None, "json"), None);
    }

    #[test]
    fn reported_pct_as_fraction() {
        assert!(reported_pct_matches(25.0, 25.0));
        assert!(reported_pct_matches(33.3, 33.3));
        assert!(reported_pct_matches(0.25, 25.0));
        assert!(reported_pct_matches(0.333, 33.3));
        assert!(reported_pct_matches(1.0, 100.0));
        assert!(reported_pct_matches(0.5, 0.5));
        assert!(!reported_pct_matches(0.25, 30.0));
        assert!(!reported_pct_matches(40.0, 25.0));
    }

    #[test]
    fn bad_pct() {
        let res = run_with(&["--input", &format!("{}/bad_pct.csv", test_dir("bad_pct"))]);
        match res {
            Err(DashError::InvalidDataset {
                source: ModelError::ParsePct { lineno, value },
            }) => {
                assert_eq!(lineno, 3);
                assert_eq!(value, "abc");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn missing_column() {
        let res = run_with(&[
            "--input",
            &format!("{}/missing_column.csv", test_dir("missing_column")),
        ]);
        assert!(matches!(res, Err(DashError::MissingColumn { .. })));
    }

    #[test]
    fn unknown_site() {
        let res = run_with(&[
            "--input",
            &format!("{}/two_sites.csv", test_dir("two_sites")),
            "--set",
            "Z=3",
        ]);
        assert!(matches!(
            res,
            Err(DashError::InvalidAction {
                source: ModelError::UnknownSite { .. }
            })
        ));
    }

    #[test]
    fn missing_input() {
        let res = run_with(&["--what-if"]);
        assert!(matches!(res, Err(DashError::MissingInput {})));
    }

    #[test]
    fn unknown_input_type() {
        let res = run_with(&[
            "--input",
            &format!("{}/two_sites.csv", test_dir("two_sites")),
            "--input-type",
            "parquet",
        ]);
        assert!(matches!(res, Err(DashError::Whatever { .. })));
    }

    #[test]
    fn actions_from_flags() {
        let args = Args::parse_from([
            "adoptiondash",
            "--what-if",
            "--set",
            "A=1",
            "--set",
            "B=2",
            "--reset",
        ]);
        let config = DashConfig {
            data_source: None,
            actions: vec![SessionAction::Toggle],
            output: None,
        };
        let actions = collect_actions(&args, Some(&config)).unwrap();
        assert_eq!(
            actions,
            vec![
                SessionAction::Toggle,
                SessionAction::SetMode {
                    mode: ConfigMode::WhatIf
                },
                SessionAction::Set {
                    site: "A".to_string(),
                    active_users: 1
                },
                SessionAction::Set {
                    site: "B".to_string(),
                    active_users: 2
                },
                SessionAction::Reset,
            ]
        );
    }

    #[test]
    fn source_relative_to_config() {
        let args = Args::parse_from(["adoptiondash", "--config", "data/cfg.json"]);
        let config = DashConfig {
            data_source: Some(DataSource {
                provider: None,
                file_path: "sites.xlsx".to_string(),
                excel_worksheet_name: Some("2024".to_string()),
            }),
            actions: vec![],
            output: None,
        };
        let source = resolve_source(&args, Some(&config), Some(Path::new("data"))).unwrap();
        assert_eq!(
            source,
            ResolvedSource {
                path: Path::new("data").join("sites.xlsx").display().to_string(),
                provider: "xlsx".to_string(),
                worksheet: Some("2024".to_string()),
            }
        );
    }
}
