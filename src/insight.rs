// src/insight.rs
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::data_types::Table;
use crate::error::ServiceError;

/// How many leading rows of the current table go into the prompt.
pub const SAMPLE_ROWS: usize = 15;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const SYSTEM_PROMPT: &str = "You are a world-class PPC strategist.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Chat-completion client for campaign analysis. One outbound request per
/// Analyze click, no retries, no streaming; the reply text is returned
/// verbatim for display.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl InsightClient {
    pub fn new(config: &AppConfig) -> Self {
        InsightClient {
            http: reqwest::Client::new(),
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub async fn request_insight(&self, table: &Table) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(table),
                },
            ],
        };

        info!(model = %self.model, rows = table.row_count(), "requesting campaign insight");

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(%status, "text generation request rejected");
            return Err(ServiceError::Api { status, message });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ServiceError::EmptyResponse)
    }
}

/// Fixed instruction template around a plain-text sample of the table.
pub fn build_prompt(table: &Table) -> String {
    format!(
        "You are a senior PPC expert. Based on this Google Ads campaign data, \
         give smart recommendations.\n\n\
         Please cover:\n\
         - Underperforming campaigns\n\
         - Which ones should get more budget\n\
         - Suggested bid/keyword/ad copy improvements\n\
         - Any unusual patterns or red flags\n\n\
         Here is the data (first {SAMPLE_ROWS} rows):\n\n{}",
        render_table_text(table, SAMPLE_ROWS)
    )
}

/// Fixed-width rendering of the header row and up to `limit` data rows,
/// columns padded to their widest sampled value.
fn render_table_text(table: &Table, limit: usize) -> String {
    let sample: Vec<&Vec<String>> = table.rows.iter().take(limit).collect();

    let mut widths: Vec<usize> = table.headers.iter().map(String::len).collect();
    for row in &sample {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let render_row = |cells: &[String]| -> String {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<String>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut lines = vec![render_row(&table.headers)];
    lines.extend(sample.iter().map(|row| render_row(row)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn prompt_contains_the_instruction_lines() {
        let prompt = build_prompt(&table(&["campaign"], &[&["Brand"]]));
        assert!(prompt.contains("Underperforming campaigns"));
        assert!(prompt.contains("more budget"));
        assert!(prompt.contains("bid/keyword/ad copy improvements"));
        assert!(prompt.contains("unusual patterns or red flags"));
        assert!(prompt.contains("first 15 rows"));
    }

    #[test]
    fn prompt_samples_at_most_fifteen_rows() {
        let rows: Vec<Vec<String>> = (0..20).map(|i| vec![format!("campaign-{i}")]).collect();
        let t = Table::from_rows(vec!["campaign".to_string()], rows);
        let prompt = build_prompt(&t);
        assert!(prompt.contains("campaign-14"));
        assert!(!prompt.contains("campaign-15"));
    }

    #[test]
    fn rendering_pads_columns_to_the_widest_value() {
        let text = render_table_text(
            &table(&["campaign", "clicks"], &[&["Brand", "10"], &["Generic", "5"]]),
            SAMPLE_ROWS,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "campaign  clicks");
        assert_eq!(lines[1], "Brand     10");
        assert_eq!(lines[2], "Generic   5");
    }

    #[test]
    fn empty_table_renders_headers_only() {
        let text = render_table_text(&table(&["campaign", "clicks"], &[]), SAMPLE_ROWS);
        assert_eq!(text, "campaign  clicks");
    }

    #[test]
    fn response_text_is_extracted_from_the_first_choice() {
        let body = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Pause campaign B."}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Pause campaign B.");
    }

    #[test]
    fn empty_choice_list_parses_but_is_an_error_case() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
