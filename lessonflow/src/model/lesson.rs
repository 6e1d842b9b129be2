//! The lesson form filled in by the educator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Panca Cinta values (KBC) a lesson can integrate.
pub const KBC_OPTIONS: [&str; 5] = [
    "Cinta Allah dan Rasul-Nya",
    "Cinta Ilmu",
    "Cinta Lingkungan",
    "Cinta Diri dan Sesama Manusia",
    "Cinta Tanah Air",
];

/// Graduate profile dimensions (DPL) a lesson can target.
pub const DPL_OPTIONS: [&str; 8] = [
    "Keimanan dan Ketakwaan kepada Tuhan YME",
    "Kewargaan",
    "Penalaran Kritis",
    "Kreativitas",
    "Kolaborasi",
    "Kemandirian",
    "Kesehatan",
    "Komunikasi",
];

/// Which value-tag list a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    /// Panca Cinta values.
    Kbc,
    /// Graduate profile dimensions.
    Dpl,
}

impl TagCategory {
    /// The known options for this category.
    #[must_use]
    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::Kbc => &KBC_OPTIONS,
            Self::Dpl => &DPL_OPTIONS,
        }
    }
}

impl std::str::FromStr for TagCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kbc" => Ok(Self::Kbc),
            "dpl" => Ok(Self::Dpl),
            other => Err(format!("unknown tag category '{other}' (expected kbc or dpl)")),
        }
    }
}

/// The pedagogical model chosen for the core activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LearningModel {
    /// Small-group collaborative work.
    #[default]
    #[serde(rename = "Cooperative Learning")]
    CooperativeLearning,
    /// Learning driven by an authentic problem.
    #[serde(rename = "Problem-Based Learning")]
    ProblemBasedLearning,
    /// In-depth investigation ending in a product.
    #[serde(rename = "Project-Based Learning")]
    ProjectBasedLearning,
    /// Guided discovery of principles.
    #[serde(rename = "Discovery Learning")]
    DiscoveryLearning,
}

impl LearningModel {
    /// All models, in form order.
    pub const ALL: [Self; 4] = [
        Self::CooperativeLearning,
        Self::ProblemBasedLearning,
        Self::ProjectBasedLearning,
        Self::DiscoveryLearning,
    ];

    /// The display name, also used in the persisted draft.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CooperativeLearning => "Cooperative Learning",
            Self::ProblemBasedLearning => "Problem-Based Learning",
            Self::ProjectBasedLearning => "Project-Based Learning",
            Self::DiscoveryLearning => "Discovery Learning",
        }
    }

    /// Short description of the model's syntax.
    #[must_use]
    pub fn syntax(self) -> &'static str {
        match self {
            Self::CooperativeLearning => {
                "Siswa bekerja dalam kelompok kecil untuk mencapai tujuan bersama, menekankan \
                 pembelajaran kolaboratif dan tanggung jawab individu serta kelompok."
            }
            Self::ProblemBasedLearning => {
                "Pembelajaran dimulai dengan masalah otentik. Siswa mengidentifikasi apa yang \
                 perlu mereka ketahui untuk menyelesaikan masalah tersebut."
            }
            Self::ProjectBasedLearning => {
                "Siswa terlibat dalam investigasi mendalam terhadap topik dunia nyata, yang \
                 berpuncak pada produk atau presentasi publik."
            }
            Self::DiscoveryLearning => {
                "Siswa didorong untuk menemukan prinsip atau konsep sendiri melalui eksplorasi \
                 aktif dan penyelidikan yang dipandu guru."
            }
        }
    }
}

impl fmt::Display for LearningModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for LearningModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|m| m.name().to_ascii_lowercase().replace('-', " ") == wanted)
            .ok_or_else(|| format!("unknown learning model '{s}'"))
    }
}

/// Everything the educator enters about the lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonInput {
    /// Lesson topic.
    pub topik: String,
    /// Subject.
    pub mapel: String,
    /// Grade and semester, e.g. "IX / Gasal".
    pub kelas: String,
    /// School name.
    pub madrasah: String,
    /// Name of the guru mata pelajaran.
    #[serde(rename = "namaGuru")]
    pub nama_guru: String,
    /// Principal name.
    #[serde(rename = "namaKepalaMadrasah")]
    pub nama_kepala_madrasah: String,
    /// Place used in the signature block.
    pub tempat: String,
    /// Selected Panca Cinta values.
    pub list_kbc_terpilih: Vec<String>,
    /// Selected graduate profile dimensions.
    pub list_dpl_terpilih: Vec<String>,
    /// Chosen pedagogical model.
    pub model_pembelajaran: LearningModel,
    /// Optional stimulus material URL (empty when unset).
    pub stimulus_url: String,
}

impl Default for LessonInput {
    fn default() -> Self {
        Self {
            topik: "Kiamat Sudah Dekat: Siapkan Amal sebagai Bekal".to_string(),
            mapel: "Akidah Akhlak".to_string(),
            kelas: "IX / Gasal".to_string(),
            madrasah: "MTs Negeri 1 Contoh".to_string(),
            nama_guru: "Ahmad, S.Pd.".to_string(),
            nama_kepala_madrasah: "Dr. Siti, M.Pd.".to_string(),
            tempat: "Jakarta".to_string(),
            list_kbc_terpilih: vec![
                "Cinta Allah dan Rasul-Nya".to_string(),
                "Cinta Diri dan Sesama Manusia".to_string(),
            ],
            list_dpl_terpilih: vec![
                "Keimanan dan Ketakwaan kepada Tuhan YME".to_string(),
                "Penalaran Kritis".to_string(),
            ],
            model_pembelajaran: LearningModel::default(),
            stimulus_url: String::new(),
        }
    }
}

impl LessonInput {
    /// Returns the tag list for a category.
    #[must_use]
    pub fn tags(&self, category: TagCategory) -> &[String] {
        match category {
            TagCategory::Kbc => &self.list_kbc_terpilih,
            TagCategory::Dpl => &self.list_dpl_terpilih,
        }
    }

    /// Adds the tag if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle_tag(&mut self, category: TagCategory, tag: &str) -> bool {
        let list = match category {
            TagCategory::Kbc => &mut self.list_kbc_terpilih,
            TagCategory::Dpl => &mut self.list_dpl_terpilih,
        };
        if let Some(pos) = list.iter().position(|t| t == tag) {
            list.remove(pos);
            false
        } else {
            list.push(tag.to_string());
            true
        }
    }

    /// Returns true if the tag is selected in either category.
    #[must_use]
    pub fn has_value_tag(&self, tag: &str) -> bool {
        self.list_kbc_terpilih.iter().chain(&self.list_dpl_terpilih).any(|t| t == tag)
    }

    /// Sets a text field by its persisted name.
    ///
    /// Returns `false` if the field is unknown or not a text field.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = match field {
            "topik" => &mut self.topik,
            "mapel" => &mut self.mapel,
            "kelas" => &mut self.kelas,
            "madrasah" => &mut self.madrasah,
            "namaGuru" => &mut self.nama_guru,
            "namaKepalaMadrasah" => &mut self.nama_kepala_madrasah,
            "tempat" => &mut self.tempat,
            "stimulus_url" => &mut self.stimulus_url,
            "model_pembelajaran" => {
                return match value.parse() {
                    Ok(model) => {
                        self.model_pembelajaran = model;
                        true
                    }
                    Err(_) => false,
                };
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Checks that the lesson carries enough to start generation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("topik", &self.topik), ("mapel", &self.mapel), ("kelas", &self.kelas)] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidLesson {
                    field,
                    reason: "must not be empty",
                });
            }
        }

        let url = self.stimulus_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::InvalidLesson {
                field: "stimulus_url",
                reason: "must be an http(s) URL",
            });
        }
        Ok(())
    }
}
