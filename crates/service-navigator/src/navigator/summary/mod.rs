//! Printable application summaries.
//!
//! [`SummaryLayout`] places every line; the PDF writer only draws what it is given.

mod layout;
mod pdf;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::info;

use super::domain::{EligibilityResult, FormAnswers, ServiceId};

pub use layout::{wrap_text, PlacedLine, SummaryLayout, TextStyle};

/// Everything the summary shows. The explanation is always the English one.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDocument {
    pub service: ServiceId,
    pub answers: FormAnswers,
    pub result: EligibilityResult,
    pub explanation: String,
}

/// A written summary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryArtifact {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("failed to write summary: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render summary: {0}")]
    Render(String),
}

pub trait SummaryEmitter: Send + Sync {
    fn emit(&self, document: &SummaryDocument) -> Result<SummaryArtifact, SummaryError>;

    /// Bytes of a previously emitted artifact, `None` when unknown.
    fn fetch(&self, file_name: &str) -> Result<Option<Vec<u8>>, SummaryError>;
}

/// `<serviceId>-<YYYYMMDD-HHMMSS>.pdf`
pub fn artifact_file_name<Tz: TimeZone>(service: ServiceId, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{service}-{}.pdf", at.format("%Y%m%d-%H%M%S"))
}

/// Writes PDF summaries into a forms directory.
#[derive(Debug, Clone)]
pub struct PdfSummaryEmitter {
    forms_dir: PathBuf,
}

impl PdfSummaryEmitter {
    pub fn new(forms_dir: impl Into<PathBuf>) -> Self {
        Self {
            forms_dir: forms_dir.into(),
        }
    }

    pub fn forms_dir(&self) -> &Path {
        &self.forms_dir
    }

    pub fn emit_at(
        &self,
        document: &SummaryDocument,
        at: &DateTime<Local>,
    ) -> Result<SummaryArtifact, SummaryError> {
        std::fs::create_dir_all(&self.forms_dir)?;

        let layout = SummaryLayout::build(document);
        let bytes = pdf::render(&layout)?;

        let file_name = artifact_file_name(document.service, at);
        let path = self.forms_dir.join(&file_name);
        std::fs::write(&path, bytes)?;

        info!(
            service = %document.service,
            pages = layout.pages,
            path = %path.display(),
            "application summary written"
        );
        Ok(SummaryArtifact { file_name, path })
    }
}

impl SummaryEmitter for PdfSummaryEmitter {
    fn emit(&self, document: &SummaryDocument) -> Result<SummaryArtifact, SummaryError> {
        self.emit_at(document, &Local::now())
    }

    fn fetch(&self, file_name: &str) -> Result<Option<Vec<u8>>, SummaryError> {
        if !is_artifact_name(file_name) {
            return Ok(None);
        }

        match std::fs::read(self.forms_dir.join(file_name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_artifact_name(file_name: &str) -> bool {
    file_name.ends_with(".pdf")
        && !file_name.starts_with('.')
        && file_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !file_name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document() -> SummaryDocument {
        SummaryDocument {
            service: ServiceId::TransportCard,
            answers: FormAnswers::new().with("age", 65).with("residency", "Lahore"),
            result: EligibilityResult {
                decision: true,
                reasons: vec!["Senior citizen in service area.".into()],
                required_documents: vec!["CNIC copy".into(), "Passport photo".into()],
            },
            explanation: "Eligible. Reason(s): Senior citizen in service area.".into(),
        }
    }

    #[test]
    fn names_artifacts_by_service_and_timestamp() {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 9, 14, 5, 7)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            artifact_file_name(ServiceId::Zakat, &at),
            "zakat-20250309-140507.pdf"
        );
    }

    #[test]
    fn writes_and_fetches_pdf_in_new_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let forms_dir = temp.path().join("forms");
        let emitter = PdfSummaryEmitter::new(&forms_dir);

        let artifact = emitter.emit(&document()).expect("summary emitted");

        assert!(artifact.file_name.starts_with("transport-card-"));
        assert!(artifact.path.starts_with(&forms_dir));
        let bytes = emitter
            .fetch(&artifact.file_name)
            .expect("fetch succeeds")
            .expect("artifact exists");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn fetch_rejects_paths_and_unknown_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let emitter = PdfSummaryEmitter::new(temp.path());

        assert_eq!(emitter.fetch("missing.pdf").expect("ok"), None);
        assert_eq!(emitter.fetch("../secret.pdf").expect("ok"), None);
        assert_eq!(emitter.fetch("notes.txt").expect("ok"), None);
    }
}
