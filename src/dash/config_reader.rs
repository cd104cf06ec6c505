use crate::dash::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// csv or xlsx. Inferred from the file name if missing.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ConfigMode {
    #[serde(rename = "actual")]
    Actual,
    #[serde(rename = "whatIf")]
    WhatIf,
}

impl From<ConfigMode> for Mode {
    fn from(m: ConfigMode) -> Mode {
        match m {
            ConfigMode::Actual => Mode::Actual,
            ConfigMode::WhatIf => Mode::WhatIf,
        }
    }
}

/// One interaction of the user with the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SessionAction {
    /// The what-if checkbox.
    Toggle,
    SetMode {
        mode: ConfigMode,
    },
    /// The input of a site card.
    Set {
        site: String,
        #[serde(rename = "activeUsers")]
        active_users: i64,
    },
    /// The reset button.
    Reset,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub title: Option<String>,
    pub view: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "dataSource")]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub actions: Vec<SessionAction>,
    pub output: Option<OutputSettings>,
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Parses a `SITE=VALUE` command line value.
/// The site name may itself contain `=`: the value is after the last one.
pub fn parse_set_flag(flag: &str) -> DashResult<SessionAction> {
    let (site, value) = flag
        .rsplit_once('=')
        .context(InvalidSetFlagSnafu { value: flag })?;
    let active_users = value
        .trim()
        .parse::<i64>()
        .ok()
        .context(InvalidSetFlagSnafu { value: flag })?;
    let site = site.trim();
    ensure!(!site.is_empty(), InvalidSetFlagSnafu { value: flag });
    Ok(SessionAction::Set {
        site: site.to_string(),
        active_users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_actions() {
        let js = r#"{
            "dataSource": { "filePath": "sites.xlsx", "excelWorksheetName": "Sheet2" },
            "actions": [
                { "action": "toggle" },
                { "action": "setMode", "mode": "whatIf" },
                { "action": "set", "site": "Chico", "activeUsers": -4 },
                { "action": "reset" }
            ]
        }"#;
        let config: DashConfig = serde_json::from_str(js).unwrap();
        assert_eq!(
            config.data_source,
            Some(DataSource {
                provider: None,
                file_path: "sites.xlsx".to_string(),
                excel_worksheet_name: Some("Sheet2".to_string()),
            })
        );
        assert_eq!(
            config.actions,
            vec![
                SessionAction::Toggle,
                SessionAction::SetMode {
                    mode: ConfigMode::WhatIf
                },
                SessionAction::Set {
                    site: "Chico".to_string(),
                    active_users: -4
                },
                SessionAction::Reset,
            ]
        );
        assert_eq!(config.output, None);
    }

    #[test]
    fn empty_config() {
        let config: DashConfig = serde_json::from_str("{}").unwrap();
        assert!(config.actions.is_empty());
        assert_eq!(config.data_source, None);
    }

    #[test]
    fn unknown_action() {
        let res = serde_json::from_str::<DashConfig>(r#"{"actions": [{"action": "undo"}]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn set_flags() {
        assert_eq!(
            parse_set_flag("San Luis Obispo=1200").unwrap(),
            SessionAction::Set {
                site: "San Luis Obispo".to_string(),
                active_users: 1200
            }
        );
        assert_eq!(
            parse_set_flag("A=B=-3").unwrap(),
            SessionAction::Set {
                site: "A=B".to_string(),
                active_users: -3
            }
        );
        assert!(parse_set_flag("Fresno").is_err());
        assert!(parse_set_flag("Fresno=many").is_err());
        assert!(parse_set_flag("=12").is_err());
    }
}
