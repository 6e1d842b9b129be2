//! Local cross-check of the assessment's alignment claims.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::model::{AssessmentPackage, LessonInput, ObjectivesResult};

/// What to do when assessment items reference unknown objectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Store the report and log the dangling references.
    #[default]
    Flag,
    /// Fail the assessment stage.
    Reject,
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "flag"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flag" => Ok(Self::Flag),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown alignment policy '{other}'")),
        }
    }
}

/// A reference from an assessment item to something that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    /// The assessment item making the claim.
    pub item: String,
    /// The referenced objective id or tag.
    pub reference: String,
}

/// Result of checking `validasi_keselarasan` against the lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Objective ids that are not among the generated objectives.
    pub dangling_objectives: Vec<DanglingReference>,
    /// KBC/DPL tags that are not selected in the lesson.
    pub unselected_tags: Vec<DanglingReference>,
}

impl AlignmentReport {
    /// Checks every alignment entry of `assessment`.
    #[must_use]
    pub fn check(
        lesson: &LessonInput,
        objectives: &ObjectivesResult,
        assessment: &AssessmentPackage,
    ) -> Self {
        let known: BTreeSet<&str> = objectives.objective_ids().collect();
        let mut report = Self::default();

        for entry in &assessment.validasi_keselarasan {
            for id in &entry.tp_terukur {
                if !known.contains(id.trim()) {
                    report.dangling_objectives.push(DanglingReference {
                        item: entry.item_asesmen.clone(),
                        reference: id.clone(),
                    });
                }
            }
            for tag in &entry.kbc_dpl_terukur {
                if !lesson.has_value_tag(tag.trim()) {
                    report.unselected_tags.push(DanglingReference {
                        item: entry.item_asesmen.clone(),
                        reference: tag.clone(),
                    });
                }
            }
        }
        report
    }

    /// Returns true if nothing dangles.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling_objectives.is_empty() && self.unselected_tags.is_empty()
    }

    /// Distinct dangling objective ids, sorted.
    #[must_use]
    pub fn dangling_ids(&self) -> Vec<String> {
        self.dangling_objectives
            .iter()
            .map(|d| d.reference.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_assessment_is_clean() {
        let report = AlignmentReport::check(
            &fixtures::zakat_lesson(),
            &fixtures::sample_objectives(),
            &fixtures::sample_assessment(),
        );
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_dangling_objectives_and_tags() {
        let mut assessment = fixtures::sample_assessment();
        assessment.validasi_keselarasan[0].tp_terukur.push("tp_7".to_string());
        assessment.validasi_keselarasan[1].tp_terukur.push("tp_7".to_string());
        assessment.validasi_keselarasan[1]
            .kbc_dpl_terukur
            .push("Cinta Tanah Air".to_string());

        let report = AlignmentReport::check(
            &fixtures::zakat_lesson(),
            &fixtures::sample_objectives(),
            &assessment,
        );

        assert!(!report.is_clean());
        assert_eq!(report.dangling_objectives.len(), 2);
        assert_eq!(report.dangling_ids(), ["tp_7"]);
        assert_eq!(
            report.unselected_tags,
            [DanglingReference {
                item: assessment.validasi_keselarasan[1].item_asesmen.clone(),
                reference: "Cinta Tanah Air".to_string(),
            }]
        );
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Reject".parse::<AlignmentPolicy>(), Ok(AlignmentPolicy::Reject));
        assert_eq!(AlignmentPolicy::default().to_string(), "flag");
        assert!("ignore".parse::<AlignmentPolicy>().is_err());
    }
}
