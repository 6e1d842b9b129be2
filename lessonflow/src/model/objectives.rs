//! Stage 1 payloads: learning objectives and the learning framework.

use serde::{Deserialize, Serialize};

/// One learning objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningObjective {
    /// Stable identifier such as `tp_1`.
    pub id: String,
    /// Objective text.
    pub deskripsi: String,
}

/// Pedagogical practice: model and methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedagogicalPractice {
    /// Learning model name as generated.
    pub model_pembelajaran: String,
    /// Teaching methods.
    pub metode: Vec<String>,
}

/// Physical, virtual and cultural environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningEnvironment {
    /// Physical setting.
    pub lingkungan_fisik: String,
    /// Virtual space.
    pub ruang_virtual: String,
    /// Learning culture.
    pub budaya_belajar: String,
}

/// Use of digital tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalUse {
    /// Stimulus video or animation.
    pub stimulus: String,
    /// Information search.
    pub pencarian_informasi: String,
    /// Product creation.
    pub pembuatan_produk: String,
}

/// The learning framework produced alongside the objectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningFramework {
    /// Pedagogical practice.
    pub praktik_pedagogis: PedagogicalPractice,
    /// Learning partnerships.
    pub kemitraan_pembelajaran: Vec<String>,
    /// Learning environment.
    pub lingkungan_pembelajaran: LearningEnvironment,
    /// Digital use.
    pub pemanfaatan_digital: DigitalUse,
}

/// Objectives without the framework, as returned by the first call of the
/// sequential strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectivesDraft {
    /// Learning objectives.
    pub tujuan_pembelajaran: Vec<LearningObjective>,
    /// Cited curriculum reference (CP).
    pub ref_cp: String,
    /// Estimated time allocation.
    pub alokasi_waktu: String,
}

impl ObjectivesDraft {
    /// Joins the draft with a framework into a full stage 1 result.
    #[must_use]
    pub fn with_framework(self, kerangka: LearningFramework) -> ObjectivesResult {
        ObjectivesResult {
            tujuan_pembelajaran: self.tujuan_pembelajaran,
            ref_cp: self.ref_cp,
            alokasi_waktu: self.alokasi_waktu,
            kerangka,
        }
    }
}

/// The full stage 1 result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectivesResult {
    /// Learning objectives.
    pub tujuan_pembelajaran: Vec<LearningObjective>,
    /// Cited curriculum reference (CP).
    pub ref_cp: String,
    /// Estimated time allocation.
    pub alokasi_waktu: String,
    /// Learning framework.
    pub kerangka: LearningFramework,
}

impl ObjectivesResult {
    /// Looks up an objective by id.
    #[must_use]
    pub fn objective(&self, id: &str) -> Option<&LearningObjective> {
        self.tujuan_pembelajaran.iter().find(|o| o.id == id)
    }

    /// Ids of all objectives, in order.
    pub fn objective_ids(&self) -> impl Iterator<Item = &str> {
        self.tujuan_pembelajaran.iter().map(|o| o.id.as_str())
    }
}
