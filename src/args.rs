use clap::Parser;

/// This is an adoption dashboard, with a what-if simulation mode.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the data source, the what-if actions and the output.
    /// For more information about the file format, read the documentation of the manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the JSON summary of the dashboard. If provided, adoptiondash will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the JSON summary of the dashboard will be written to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file with the sites. Setting this option overrides the data source that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. If not specified, it is inferred from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Turns on the what-if mode before applying the --set values.
    #[clap(long, takes_value = false)]
    pub what_if: bool,

    /// (SITE=VALUE, repeated) Sets the simulated number of active users of a site.
    #[clap(long, value_parser)]
    pub set: Vec<String>,

    /// Restores the values of the file after all the other actions.
    #[clap(long, takes_value = false)]
    pub reset: bool,

    /// (cards or json, default cards) How the dashboard is printed on the standard output.
    #[clap(long, value_parser)]
    pub view: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
