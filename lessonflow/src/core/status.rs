//! Stage kind, stage status and save status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The generation stages, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Learning objectives plus the pedagogical framework.
    Objectives,
    /// The staged activity scenario.
    Scenario,
    /// The assessment package.
    Assessment,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [Self; 3] = [Self::Objectives, Self::Scenario, Self::Assessment];

    /// Zero-based position in the chain.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Objectives => 0,
            Self::Scenario => 1,
            Self::Assessment => 2,
        }
    }

    /// Stages that must have succeeded before this one may run.
    #[must_use]
    pub fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::Objectives => &[],
            Self::Scenario => &[Self::Objectives],
            Self::Assessment => &[Self::Objectives, Self::Scenario],
        }
    }

    /// Stages invalidated when this one is re-run.
    #[must_use]
    pub fn downstream(self) -> &'static [Self] {
        match self {
            Self::Objectives => &[Self::Scenario, Self::Assessment],
            Self::Scenario => &[Self::Assessment],
            Self::Assessment => &[],
        }
    }

    /// Human-readable (Indonesian) stage title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Objectives => "Tujuan & Kerangka Pembelajaran",
            Self::Scenario => "Skenario Kegiatan",
            Self::Assessment => "Paket Asesmen",
        }
    }

    /// Message shown when a run of this stage fails.
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Objectives => {
                "Gagal menghasilkan Tujuan & Kerangka Pembelajaran. Silakan coba lagi."
            }
            Self::Scenario => "Gagal menghasilkan Skenario Kegiatan. Silakan coba lagi.",
            Self::Assessment => "Gagal menghasilkan Paket Asesmen. Silakan coba lagi.",
        }
    }

    /// Message shown when this stage is triggered before its prerequisites.
    #[must_use]
    pub fn blocked_message(self) -> &'static str {
        match self {
            Self::Objectives => "Data pelajaran belum lengkap.",
            Self::Scenario => "Harap hasilkan Tujuan Pembelajaran terlebih dahulu.",
            Self::Assessment => {
                "Harap hasilkan Tujuan Pembelajaran dan Skenario Kegiatan terlebih dahulu."
            }
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Objectives => write!(f, "objectives"),
            Self::Scenario => write!(f, "scenario"),
            Self::Assessment => write!(f, "assessment"),
        }
    }
}

impl std::str::FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objectives" | "tujuan" | "1" => Ok(Self::Objectives),
            "scenario" | "skenario" | "2" => Ok(Self::Scenario),
            "assessment" | "asesmen" | "3" => Ok(Self::Assessment),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

/// The execution status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Never run, or invalidated by an upstream re-run.
    #[default]
    NotStarted,
    /// A generation call is in flight.
    Running,
    /// The stage holds a valid result.
    Succeeded,
    /// The last run failed.
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status represents a finished run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if the stage holds a usable result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the last run failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Persistence state of the lesson draft. Purely observational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// Changes exist that are not on disk (pending or failed write).
    #[default]
    Unsaved,
    /// A write is in progress.
    Saving,
    /// The persisted draft matches the in-memory lesson.
    Saved,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsaved => write!(f, "unsaved"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_display() {
        assert_eq!(StageKind::Objectives.to_string(), "objectives");
        assert_eq!(StageKind::Scenario.to_string(), "scenario");
        assert_eq!(StageKind::Assessment.to_string(), "assessment");
    }

    #[test]
    fn test_stage_kind_ordering() {
        assert!(StageKind::Objectives < StageKind::Scenario);
        assert!(StageKind::Scenario < StageKind::Assessment);
        for (i, kind) in StageKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_downstream_is_everything_after() {
        for kind in StageKind::ALL {
            let expected: Vec<_> = StageKind::ALL.into_iter().filter(|k| *k > kind).collect();
            assert_eq!(kind.downstream(), expected.as_slice());
        }
    }

    #[test]
    fn test_prerequisites_are_everything_before() {
        for kind in StageKind::ALL {
            let expected: Vec<_> = StageKind::ALL.into_iter().filter(|k| *k < kind).collect();
            assert_eq!(kind.prerequisites(), expected.as_slice());
        }
    }

    #[test]
    fn test_stage_kind_from_str() {
        assert_eq!("Scenario".parse::<StageKind>(), Ok(StageKind::Scenario));
        assert_eq!("asesmen".parse::<StageKind>(), Ok(StageKind::Assessment));
        assert!("rubric".parse::<StageKind>().is_err());
    }

    #[test]
    fn test_stage_status_is_terminal() {
        assert!(StageStatus::Succeeded.is_terminal());
        assert!(StageStatus::Failed.is_terminal());
        assert!(!StageStatus::NotStarted.is_terminal());
        assert!(!StageStatus::Running.is_terminal());
    }

    #[test]
    fn test_stage_status_serialize() {
        let json = serde_json::to_string(&StageStatus::NotStarted).unwrap();
        assert_eq!(json, r#""not_started""#);

        let deserialized: StageStatus = serde_json::from_str(r#""succeeded""#).unwrap();
        assert_eq!(deserialized, StageStatus::Succeeded);
    }

    #[test]
    fn test_save_status_display() {
        assert_eq!(SaveStatus::default().to_string(), "unsaved");
        assert_eq!(SaveStatus::Saving.to_string(), "saving");
        assert_eq!(SaveStatus::Saved.to_string(), "saved");
    }
}
