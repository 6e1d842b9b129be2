//! Stage 3 payload: the assessment package.

use serde::{Deserialize, Serialize};

/// A numbered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question id.
    pub id: String,
    /// Question text.
    pub pertanyaan: String,
}

/// Diagnostic rubric row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricItem {
    /// Category.
    pub kategori: String,
    /// Criteria.
    pub kriteria: String,
}

/// Formative rubric row, four score levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormativeRubricItem {
    /// Aspect.
    pub aspek: String,
    /// Very good.
    pub skor_4: String,
    /// Good.
    pub skor_3: String,
    /// Fair.
    pub skor_2: String,
    /// Poor.
    pub skor_1: String,
}

/// Summative essay rubric row, three score levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummativeEssayRubricItem {
    /// Aspect.
    pub aspek: String,
    /// Very good.
    pub skor_5: String,
    /// Fair.
    pub skor_3: String,
    /// Poor.
    pub skor_1: String,
}

/// Diagnostic assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticAssessment {
    /// Instrument.
    pub instrumen: String,
    /// Questions.
    pub pertanyaan: Vec<Question>,
    /// Rubric.
    pub rubrik: Vec<RubricItem>,
}

/// Formative assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormativeAssessment {
    /// Instrument.
    pub instrumen: String,
    /// Rubric.
    pub rubrik: Vec<FormativeRubricItem>,
}

/// Summative assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummativeAssessment {
    /// Instrument.
    pub instrumen: String,
    /// Questions.
    pub pertanyaan: Vec<Question>,
    /// Essay rubric.
    pub rubrik_esai: Vec<SummativeEssayRubricItem>,
}

/// Self-reported alignment of one assessment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentValidation {
    /// The assessment item.
    pub item_asesmen: String,
    /// Objective ids measured by the item.
    pub tp_terukur: Vec<String>,
    /// KBC/DPL tags measured by the item.
    pub kbc_dpl_terukur: Vec<String>,
    /// Notes.
    pub catatan_keselarasan: String,
}

/// The full stage 3 result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentPackage {
    /// Diagnostic assessment.
    pub asesmen_diagnostik: DiagnosticAssessment,
    /// Formative assessment.
    pub asesmen_formatif: FormativeAssessment,
    /// Summative assessment.
    pub asesmen_sumatif: SummativeAssessment,
    /// Alignment validation.
    pub validasi_keselarasan: Vec<AlignmentValidation>,
}
