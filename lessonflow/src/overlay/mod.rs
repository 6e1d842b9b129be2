//! Path-addressed edits of stage results.
//!
//! Edits never touch the value they are given: the result is copied through
//! its JSON form, the addressed leaf is replaced, and the copy is validated
//! again through [`TypedPayload`] so that it still satisfies the stage schema.

mod path;

pub use path::{FieldPath, PathStep};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::contracts::TypedPayload;
use crate::errors::EditPreconditionError;
use crate::model::ObjectivesResult;

/// Returns a copy of `result` with the text leaf at `path` replaced by `value`.
pub fn apply_edit<T>(result: &T, path: &FieldPath, value: &str) -> Result<T, EditPreconditionError>
where
    T: Serialize + DeserializeOwned,
{
    if path.is_empty() {
        return Err(EditPreconditionError::EmptyPath);
    }

    let mut root =
        serde_json::to_value(result).map_err(|e| EditPreconditionError::Invalid(e.to_string()))?;
    let not_found = || EditPreconditionError::PathNotFound {
        path: path.to_string(),
    };

    let mut cursor = &mut root;
    for step in path.steps() {
        cursor = match step {
            PathStep::Key(key) => cursor
                .as_object_mut()
                .and_then(|object| object.get_mut(key))
                .ok_or_else(not_found)?,
            PathStep::Index(index) => {
                let list = cursor.as_array_mut().ok_or_else(not_found)?;
                let len = list.len();
                list.get_mut(*index)
                    .ok_or_else(|| EditPreconditionError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len,
                    })?
            }
        };
    }

    if !cursor.is_string() {
        return Err(EditPreconditionError::NotAScalar {
            path: path.to_string(),
        });
    }
    *cursor = Value::String(value.to_string());

    TypedPayload::new("edited result")
        .from_json(root)
        .map_err(|e| EditPreconditionError::Invalid(e.to_string()))
}

/// Returns a copy of `objectives` with the description of objective `id` replaced.
pub fn replace_objective(
    objectives: &ObjectivesResult,
    id: &str,
    text: &str,
) -> Result<ObjectivesResult, EditPreconditionError> {
    let mut edited = objectives.clone();
    let objective = edited
        .tujuan_pembelajaran
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| EditPreconditionError::UnknownObjective(id.to_string()))?;
    objective.deskripsi = text.to_string();
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentPackage, ScenarioResult};
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_edit_changes_only_the_addressed_leaf() {
        let original = Arc::new(fixtures::sample_scenario());
        let shared = Arc::clone(&original);

        let path = FieldPath::from_keys(&["kegiatan_penutup", "refleksi"]);
        let edited: ScenarioResult = apply_edit(&*original, &path, "X").unwrap();

        assert_eq!(edited.kegiatan_penutup.refleksi, "X");
        assert_ne!(original.kegiatan_penutup.refleksi, "X");
        assert_eq!(*shared, fixtures::sample_scenario());

        let mut expected = fixtures::sample_scenario();
        expected.kegiatan_penutup.refleksi = "X".to_string();
        assert_eq!(edited, expected);
    }

    #[test]
    fn test_edit_inside_list() {
        let original = fixtures::sample_assessment();
        let path: FieldPath = "asesmen_formatif.rubrik.0.skor_4".parse().unwrap();
        let edited = apply_edit(&original, &path, "Sangat baik sekali").unwrap();
        assert_eq!(edited.asesmen_formatif.rubrik[0].skor_4, "Sangat baik sekali");
        assert_eq!(edited.asesmen_sumatif, original.asesmen_sumatif);
    }

    #[test]
    fn test_out_of_range_index() {
        let original = fixtures::sample_scenario();
        let len = original.kegiatan_inti.memahami.aktivitas.len();
        let path = FieldPath::root()
            .key("kegiatan_inti")
            .key("memahami")
            .key("aktivitas")
            .index(len)
            .key("deskripsi");

        let err = apply_edit(&original, &path, "X").unwrap_err();
        assert_eq!(
            err,
            EditPreconditionError::IndexOutOfRange {
                path: path.to_string(),
                index: len,
                len,
            }
        );
    }

    #[test]
    fn test_missing_key_and_non_scalar() {
        let original = fixtures::sample_scenario();

        let err = apply_edit(&original, &FieldPath::from_keys(&["kegiatan_akhir"]), "X").unwrap_err();
        assert!(matches!(err, EditPreconditionError::PathNotFound { .. }));

        let err = apply_edit(&original, &FieldPath::from_keys(&["kegiatan_inti"]), "X").unwrap_err();
        assert!(matches!(err, EditPreconditionError::NotAScalar { .. }));

        let err = apply_edit(&original, &FieldPath::root(), "X").unwrap_err();
        assert_eq!(err, EditPreconditionError::EmptyPath);

        // indexing into an object
        let path: FieldPath = "kegiatan_awal.0".parse().unwrap();
        assert!(matches!(
            apply_edit::<ScenarioResult>(&original, &path, "X"),
            Err(EditPreconditionError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_edit_through_string_list() {
        let original: AssessmentPackage = fixtures::sample_assessment();
        let path: FieldPath = "validasi_keselarasan.0.tp_terukur.0".parse().unwrap();
        let edited = apply_edit(&original, &path, "tp_2").unwrap();
        assert_eq!(edited.validasi_keselarasan[0].tp_terukur[0], "tp_2");
    }

    #[test]
    fn test_edit_is_revalidated() {
        #[derive(Debug, Serialize, serde::Deserialize)]
        enum Level {
            Low,
            High,
        }

        #[derive(Debug, Serialize, serde::Deserialize)]
        struct Graded {
            level: Level,
        }

        let original = Graded { level: Level::Low };
        let path = FieldPath::from_keys(&["level"]);
        assert!(matches!(
            apply_edit(&original, &path, "High").unwrap().level,
            Level::High
        ));

        let err = apply_edit(&original, &path, "Medium").unwrap_err();
        match err {
            EditPreconditionError::Invalid(message) => {
                assert!(message.contains("edited result"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(original.level, Level::Low));
    }

    #[test]
    fn test_replace_objective() {
        let original = fixtures::sample_objectives();
        let edited = replace_objective(&original, "tp_2", "Menghitung zakat mal").unwrap();

        assert_eq!(edited.objective("tp_2").unwrap().deskripsi, "Menghitung zakat mal");
        assert_eq!(edited.objective("tp_1"), original.objective("tp_1"));
        assert_ne!(original.objective("tp_2").unwrap().deskripsi, "Menghitung zakat mal");

        assert_eq!(
            replace_objective(&original, "tp_9", "x"),
            Err(EditPreconditionError::UnknownObjective("tp_9".to_string()))
        );
    }
}
