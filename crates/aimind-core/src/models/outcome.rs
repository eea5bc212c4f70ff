use serde::Serialize;

use super::image::AnalysisSubject;

/// Why a best-effort analysis image was not attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachFailure {
    pub subject: AnalysisSubject,
    pub reason: String,
}

/// Result of attaching one analysis box image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached { key: String, url: String },
    /// No image was supplied for the subject.
    Skipped,
    Failed(AttachFailure),
}

impl AttachOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            AttachOutcome::Attached { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Result of a save whose side attachments are allowed to fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<T> {
    Saved(T),
    Partial {
        record: T,
        failures: Vec<AttachFailure>,
    },
}

impl<T> SaveOutcome<T> {
    pub fn from_parts(record: T, failures: Vec<AttachFailure>) -> Self {
        if failures.is_empty() {
            SaveOutcome::Saved(record)
        } else {
            SaveOutcome::Partial { record, failures }
        }
    }

    pub fn record(&self) -> &T {
        match self {
            SaveOutcome::Saved(record) | SaveOutcome::Partial { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            SaveOutcome::Saved(record) | SaveOutcome::Partial { record, .. } => record,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, SaveOutcome::Partial { .. })
    }

    pub fn failures(&self) -> &[AttachFailure] {
        match self {
            SaveOutcome::Saved(_) => &[],
            SaveOutcome::Partial { failures, .. } => failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let saved = SaveOutcome::from_parts(1, vec![]);
        assert!(!saved.is_partial());
        assert!(saved.failures().is_empty());

        let partial = SaveOutcome::from_parts(
            2,
            vec![AttachFailure {
                subject: AnalysisSubject::House,
                reason: "timeout".into(),
            }],
        );
        assert!(partial.is_partial());
        assert_eq!(*partial.record(), 2);
        assert_eq!(partial.failures()[0].subject, AnalysisSubject::House);
        assert_eq!(partial.into_record(), 2);
    }

    #[test]
    fn test_attach_url() {
        let attached = AttachOutcome::Attached {
            key: "users/1/analyses/x_tree.jpg".into(),
            url: "https://cdn/x".into(),
        };
        assert_eq!(attached.url(), Some("https://cdn/x"));
        assert_eq!(AttachOutcome::Skipped.url(), None);
    }
}
