//! Stage 2 payload: the activity scenario.

use serde::{Deserialize, Serialize};

/// A trigger question and the value it connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerQuestion {
    /// The question.
    pub pertanyaan: String,
    /// Related KBC value.
    pub kaitan_kbc: String,
}

/// Opening activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningActivities {
    /// Apperception.
    pub apersepsi: String,
    /// Trigger questions.
    pub pertanyaan_pemantik: Vec<TriggerQuestion>,
}

/// One step of a core phase, tagged with the model syntax it realises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Syntax step of the learning model.
    pub sintaks: String,
    /// What happens.
    pub deskripsi: String,
}

/// One of the three core phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPhase {
    /// Phase summary.
    pub penjelasan: String,
    /// Activities in order.
    pub aktivitas: Vec<Activity>,
}

/// Core activities: understand, apply, reflect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreActivities {
    /// Understanding phase.
    pub memahami: LearningPhase,
    /// Application phase.
    pub mengaplikasi: LearningPhase,
    /// Reflection phase.
    pub merefleksi: LearningPhase,
}

impl CoreActivities {
    /// The phases in fixed order with their display titles.
    #[must_use]
    pub fn phases(&self) -> [(&'static str, &LearningPhase); 3] {
        [
            ("Memahami", &self.memahami),
            ("Mengaplikasi", &self.mengaplikasi),
            ("Merefleksi", &self.merefleksi),
        ]
    }
}

/// Closing activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingActivities {
    /// Reflection.
    pub refleksi: String,
    /// Follow-up.
    pub tindak_lanjut: String,
}

/// The full stage 2 result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Opening.
    pub kegiatan_awal: OpeningActivities,
    /// Core.
    pub kegiatan_inti: CoreActivities,
    /// Closing.
    pub kegiatan_penutup: ClosingActivities,
}

impl ScenarioResult {
    /// All core activities, memahami then mengaplikasi then merefleksi.
    #[must_use]
    pub fn flattened_activities(&self) -> Vec<Activity> {
        self.kegiatan_inti
            .phases()
            .into_iter()
            .flat_map(|(_, phase)| phase.aktivitas.iter().cloned())
            .collect()
    }
}
