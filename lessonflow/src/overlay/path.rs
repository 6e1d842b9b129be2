//! Field paths into a stage result.

use std::fmt;
use std::str::FromStr;

use crate::errors::EditPreconditionError;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// An object key.
    Key(String),
    /// A list index.
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered list of keys and indices addressing one leaf.
///
/// Written `a.b.0.c`: all-digit segments are list indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    steps: Vec<PathStep>,
}

impl FieldPath {
    /// Creates an empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path of object keys only.
    #[must_use]
    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            steps: keys.iter().map(|k| PathStep::Key((*k).to_string())).collect(),
        }
    }

    /// Appends an object key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(PathStep::Key(key.into()));
        self
    }

    /// Appends a list index.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }

    /// The steps of the path.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Returns true if the path has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<PathStep>> for FieldPath {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = EditPreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EditPreconditionError::EmptyPath);
        }

        let mut steps = Vec::new();
        for segment in s.split('.') {
            if segment.is_empty() {
                return Err(EditPreconditionError::PathNotFound { path: s.to_string() });
            }
            let step = if segment.bytes().all(|b| b.is_ascii_digit()) {
                segment
                    .parse()
                    .map(PathStep::Index)
                    .map_err(|_| EditPreconditionError::PathNotFound { path: s.to_string() })?
            } else {
                PathStep::Key(segment.to_string())
            };
            steps.push(step);
        }
        Ok(Self { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_mixed_path() {
        let path: FieldPath = "kegiatan_inti.memahami.aktivitas.1.deskripsi".parse().unwrap();
        assert_eq!(
            path,
            FieldPath::root()
                .key("kegiatan_inti")
                .key("memahami")
                .key("aktivitas")
                .index(1)
                .key("deskripsi")
        );
        assert_eq!(path.to_string(), "kegiatan_inti.memahami.aktivitas.1.deskripsi");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert_eq!("".parse::<FieldPath>(), Err(EditPreconditionError::EmptyPath));
        assert!(matches!(
            "a..b".parse::<FieldPath>(),
            Err(EditPreconditionError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_from_keys() {
        let path = FieldPath::from_keys(&["kegiatan_penutup", "refleksi"]);
        assert_eq!(path.steps().len(), 2);
        assert_eq!(path.to_string(), "kegiatan_penutup.refleksi");
        assert!(FieldPath::root().is_empty());
    }
}
