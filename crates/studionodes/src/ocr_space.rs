use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use studiocore::{NodeError, TextRecognizer};

const OCR_SPACE_API_URL: &str = "https://api.ocr.space/parse/image";

pub const PLACEHOLDER_TEXT: &str = "OCR result (placeholder, no API key set)";
pub const NO_TEXT_FOUND: &str = "OCR failed or no text found.";

/// OCR.space client.
///
/// Unlike the generation adapters this one never fails for a missing key:
/// it answers with [`PLACEHOLDER_TEXT`] instead.
pub struct OcrSpaceRecognizer {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OcrSpaceRecognizer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            endpoint: OCR_SPACE_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

impl OcrResponse {
    fn into_text(self) -> String {
        self.parsed_results
            .and_then(|results| results.into_iter().next())
            .and_then(|r| r.parsed_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_TEXT_FOUND.to_string())
    }
}

#[async_trait]
impl TextRecognizer for OcrSpaceRecognizer {
    async fn recognize_text(&self, image: &str) -> Result<String, NodeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("OCR_SPACE_API_KEY not set, returning placeholder text");
            return Ok(PLACEHOLDER_TEXT.to_string());
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("apikey", api_key)
            .form(&[("base64Image", image)])
            .send()
            .await
            .map_err(|e| NodeError::Request(format!("OCR request failed: {}", e)))?;

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| NodeError::InvalidResponse(format!("OCR.space: {}", e)))?;

        Ok(parsed.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_returns_placeholder() {
        let text = OcrSpaceRecognizer::new(None)
            .recognize_text("data:image/png;base64,AAAA")
            .await
            .unwrap();

        assert_eq!(text, PLACEHOLDER_TEXT);
    }

    #[test]
    fn extracts_first_parsed_text() {
        let response: OcrResponse = serde_json::from_str(
            r#"{"ParsedResults": [{"ParsedText": "Invoice 42\r\n", "FileParseExitCode": 1}],
                "OCRExitCode": 1, "IsErroredOnProcessing": false}"#,
        )
        .unwrap();

        assert_eq!(response.into_text(), "Invoice 42\r\n");
    }

    #[test]
    fn describes_missing_results() {
        let errored: OcrResponse = serde_json::from_str(
            r#"{"ParsedResults": null, "IsErroredOnProcessing": true,
                "ErrorMessage": ["bad image"]}"#,
        )
        .unwrap();
        assert_eq!(errored.into_text(), NO_TEXT_FOUND);

        let blank: OcrResponse =
            serde_json::from_str(r#"{"ParsedResults": [{"ParsedText": ""}]}"#).unwrap();
        assert_eq!(blank.into_text(), NO_TEXT_FOUND);
    }
}
