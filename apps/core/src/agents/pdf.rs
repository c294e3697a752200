use crate::error::AppError;
use crate::models::{Intent, PdfExtraction};
use std::panic::{self, AssertUnwindSafe};
use tokio::task;
use tracing::{error, info};

/// Pulls the text layer out of PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfAgent;

impl PdfAgent {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the text of every page, in page order, joined with `\n`.
    ///
    /// Runs on the blocking pool. A malformed document, or a panic inside the
    /// parser, is returned as [`AppError::Extraction`].
    pub async fn extract_text(&self, bytes: &[u8]) -> Result<String, AppError> {
        let bytes = bytes.to_vec();
        let pages = task::spawn_blocking(move || {
            panic::catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
            }))
        })
        .await?;

        let pages = match pages {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                error!("PDF text extraction failed: {}", e);
                return Err(AppError::Extraction(e.to_string()));
            }
            Err(_) => {
                error!("PDF text extraction panicked");
                return Err(AppError::Extraction(
                    "PDF parser panicked on malformed input".to_string(),
                ));
            }
        };

        info!("Extracted {} pages of text.", pages.len());
        Ok(pages.join("\n"))
    }

    /// Extracts the text and tags it with the routed intent.
    pub async fn process(
        &self,
        bytes: &[u8],
        intent: Option<Intent>,
    ) -> Result<PdfExtraction, AppError> {
        let raw_text = self.extract_text(bytes).await?;
        Ok(PdfExtraction { raw_text, intent })
    }
}
