use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api_client::ApiClient;
use crate::errors::{ClientError, IngestionError};
use crate::models::{CandidateData, Document};

const PARSE_CV_FALLBACK: &str = "Failed to parse CV";

/// Turns an uploaded résumé into structured candidate data.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn ingest(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<CandidateData, IngestionError>;
}

#[derive(Debug, Deserialize)]
struct ParseCvReply {
    data: CandidateData,
}

/// POST /api/parse-cv (multipart field `file`)
#[async_trait]
impl DocumentParser for ApiClient {
    async fn ingest(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<CandidateData, IngestionError> {
        // Advisory only: the parser decides what it accepts.
        if document.kind().is_none() {
            warn!(
                "Uploading '{}' which is not a PDF, DOC, or DOCX file",
                document.file_name
            );
        }

        let part = Part::bytes(document.bytes.to_vec())
            .file_name(document.file_name.clone())
            .mime_str(document.mime_type())
            .map_err(|e| IngestionError(ClientError::from(e)))?;
        let form = Form::new().part("file", part);

        debug!(
            "Sending '{}' ({} bytes) for parsing",
            document.file_name,
            document.bytes.len()
        );
        let request = self
            .http()
            .post(self.endpoint(&["api", "parse-cv"]))
            .multipart(form);
        let reply: ParseCvReply = self.exchange(request, PARSE_CV_FALLBACK, cancel).await?;

        debug!(
            "Parsed CV: {} skills, {} experience entries",
            reply.data.skills.len(),
            reply.data.experience.len()
        );
        Ok(reply.data)
    }
}
