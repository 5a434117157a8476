// src/sheet_loader.rs
use google_sheets4::api::Scope;
use google_sheets4::{hyper, hyper_rustls, Sheets};
use serde_json::Value;
use tokio::task;
use tracing::info;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

use crate::config::{AppConfig, CredentialSource};
use crate::data_types::Table;
use crate::error::DataSourceError;

type SheetsHub = Sheets<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>;

/// Read-only Google Sheets loader. Holds everything needed for a fetch so
/// the async load can run on the executor without touching app state.
#[derive(Debug, Clone)]
pub struct SheetLoader {
    credentials: CredentialSource,
    spreadsheet: String,
    worksheet: String,
}

impl SheetLoader {
    pub fn new(config: &AppConfig) -> Self {
        SheetLoader {
            credentials: config.credentials.clone(),
            spreadsheet: config.spreadsheet.clone(),
            worksheet: config.worksheet.clone(),
        }
    }

    /// Fetches the worksheet and converts it into a Table, using the first
    /// row as headers. An empty worksheet yields an empty Table.
    pub async fn load(&self) -> Result<Table, DataSourceError> {
        let spreadsheet_id = extract_spreadsheet_id(&self.spreadsheet)?.to_string();
        let hub = self.authenticate().await?;

        let range = format!("{}!A:Z", self.worksheet);
        info!(%spreadsheet_id, %range, "fetching worksheet values");

        let (_, value_range) = hub
            .spreadsheets()
            .values_get(&spreadsheet_id, &range)
            .add_scope(Scope::SpreadsheetReadonly)
            .doit()
            .await?;

        let values = value_range.values.unwrap_or_default();
        let table = task::spawn_blocking(move || table_from_values(values))
            .await
            .unwrap_or_else(|_| Table::empty());
        info!(rows = table.row_count(), "worksheet loaded");
        Ok(table)
    }

    async fn authenticate(&self) -> Result<SheetsHub, DataSourceError> {
        let json = match &self.credentials {
            CredentialSource::Inline(json) => json.clone(),
            CredentialSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                DataSourceError::CredentialRead {
                    path: path.display().to_string(),
                    source: e,
                }
            })?,
        };

        let key: ServiceAccountKey = serde_json::from_str(&json)?;
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(DataSourceError::Auth)?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Sheets::new(hyper::Client::builder().build(connector), auth))
    }
}

/// Accepts a full spreadsheet URL or a bare spreadsheet id.
/// URLs look like https://docs.google.com/spreadsheets/d/[ID]/edit
fn extract_spreadsheet_id(input: &str) -> Result<&str, DataSourceError> {
    if !input.contains('/') {
        return Ok(input);
    }

    let parts: Vec<&str> = input.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() && !parts[i + 1].is_empty() {
            return Ok(parts[i + 1]);
        }
    }

    Err(DataSourceError::InvalidSpreadsheet(input.to_string()))
}

/// First row becomes the header row; remaining rows are padded or truncated
/// to the header width. Rows whose cells are all blank are dropped.
fn table_from_values(values: Vec<Vec<Value>>) -> Table {
    let mut rows = values.into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Table::empty(),
    };

    let data_rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
        .filter(|row: &Vec<String>| !row.iter().all(|cell| cell.trim().is_empty()))
        .collect();

    Table::from_rows(headers, data_rows)
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_id_from_url() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC_dEf-123/edit#gid=0";
        assert_eq!(extract_spreadsheet_id(url).unwrap(), "1AbC_dEf-123");
    }

    #[test]
    fn bare_id_passes_through() {
        assert_eq!(extract_spreadsheet_id("1AbC_dEf-123").unwrap(), "1AbC_dEf-123");
    }

    #[test]
    fn url_without_id_segment_is_rejected() {
        let result = extract_spreadsheet_id("https://docs.google.com/spreadsheets/");
        assert!(matches!(result, Err(DataSourceError::InvalidSpreadsheet(_))));
    }

    #[test]
    fn header_row_becomes_headers() {
        let table = table_from_values(vec![
            vec![json!("campaign"), json!("clicks")],
            vec![json!("Brand"), json!(10)],
            vec![json!("Generic"), json!(5)],
        ]);
        assert_eq!(table.headers, vec!["campaign", "clicks"]);
        assert_eq!(table.rows, vec![vec!["Brand", "10"], vec!["Generic", "5"]]);
    }

    #[test]
    fn short_rows_are_backfilled() {
        let table = table_from_values(vec![
            vec![json!("campaign"), json!("clicks"), json!("cost")],
            vec![json!("Brand"), json!(10)],
        ]);
        assert_eq!(table.rows, vec![vec!["Brand", "10", ""]]);
    }

    #[test]
    fn blank_rows_are_dropped() {
        let table = table_from_values(vec![
            vec![json!("campaign")],
            vec![json!("")],
            vec![json!("Brand")],
        ]);
        assert_eq!(table.rows, vec![vec!["Brand"]]);
    }

    #[test]
    fn no_values_is_an_empty_table() {
        let table = table_from_values(Vec::new());
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn header_only_worksheet_is_an_empty_table() {
        let table = table_from_values(vec![vec![json!("campaign"), json!("clicks")]]);
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn numbers_and_nulls_convert_to_strings() {
        assert_eq!(cell_to_string(&json!(10)), "10");
        assert_eq!(cell_to_string(&json!(2.5)), "2.5");
        assert_eq!(cell_to_string(&json!(true)), "true");
        assert_eq!(cell_to_string(&Value::Null), "");
        assert_eq!(cell_to_string(&json!("Search")), "Search");
    }
}
