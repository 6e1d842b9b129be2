//! Export of a finished lesson plan.
//!
//! The controller hands a complete [`ExportBundle`] to a [`DocumentExporter`].
//! [`DocxExporter`] lays the bundle out as the five-section RPP document and
//! packages it as WordprocessingML.

mod document;
mod docx;
mod layout;

pub use document::{Align, Block, Cell, Document, Paragraph, ParagraphStyle, Run, Table};
pub use docx::DocxExporter;
pub use layout::{build_document, signature_date};

use chrono::NaiveDate;
use std::sync::Arc;

use crate::errors::ExportError;
use crate::model::{AssessmentPackage, LessonInput, ObjectivesResult, ScenarioResult};

/// Everything needed to build the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// The lesson form.
    pub lesson: LessonInput,
    /// Stage 1 result.
    pub objectives: Arc<ObjectivesResult>,
    /// Stage 2 result.
    pub scenario: Arc<ScenarioResult>,
    /// Stage 3 result.
    pub assessment: Arc<AssessmentPackage>,
    /// Date printed in the signature block.
    pub date: NaiveDate,
}

impl ExportBundle {
    /// Creates a bundle dated today.
    #[must_use]
    pub fn new(
        lesson: LessonInput,
        objectives: Arc<ObjectivesResult>,
        scenario: Arc<ScenarioResult>,
        assessment: Arc<AssessmentPackage>,
    ) -> Self {
        Self {
            lesson,
            objectives,
            scenario,
            assessment,
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Sets the signature date.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// The download filename for this bundle.
    #[must_use]
    pub fn filename(&self) -> String {
        document_filename(&self.lesson.topik)
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Suggested filename.
    pub filename: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// Renders a bundle into a document.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentExporter: Send + Sync {
    /// Builds the document for `bundle`.
    fn export(&self, bundle: &ExportBundle) -> Result<ExportedDocument, ExportError>;
}

/// `RPP_<topik>.docx`, with whitespace, `/` and `:` replaced by `_`.
#[must_use]
pub fn document_filename(topik: &str) -> String {
    let name: String = topik
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == ':' { '_' } else { c })
        .collect();
    format!("RPP_{name}.docx")
}
