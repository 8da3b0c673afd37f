//! Driver failure taxonomy consumed by the retry policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// High-level classification of a database failure.
///
/// Mirrors the DB-API style hierarchy most SQL drivers expose. The policy
/// never defines these kinds itself; drivers map their errors onto them via
/// [`DriverFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Problem with the driver interface itself (bad connection string, etc.).
    Interface,
    /// Generic database-reported error with no finer classification.
    Database,
    /// Bad data: encode/decode failures, out-of-range values.
    Data,
    /// Failures in the database's operation: lost connection, pool timeout.
    Operational,
    /// Constraint violations.
    Integrity,
    /// The driver or server hit an internal inconsistency.
    Internal,
    /// Caller mistakes: malformed SQL, missing column or row.
    Programming,
    /// Feature not supported by the backend.
    NotSupported,
    /// Not a driver failure at all.
    Application,
}

impl ErrorKind {
    /// Every kind a driver can report (everything except [`ErrorKind::Application`]).
    pub const DRIVER: [ErrorKind; 8] = [
        ErrorKind::Interface,
        ErrorKind::Database,
        ErrorKind::Data,
        ErrorKind::Operational,
        ErrorKind::Integrity,
        ErrorKind::Internal,
        ErrorKind::Programming,
        ErrorKind::NotSupported,
    ];

    /// Name as written in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Interface => "interface",
            ErrorKind::Database => "database",
            ErrorKind::Data => "data",
            ErrorKind::Operational => "operational",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Internal => "internal",
            ErrorKind::Programming => "programming",
            ErrorKind::NotSupported => "not_supported",
            ErrorKind::Application => "application",
        }
    }

    pub fn is_driver(self) -> bool {
        self != ErrorKind::Application
    }
}

/// Set of kinds that are eligible for retry by type alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KindSet(BTreeSet<ErrorKind>);

impl KindSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any driver-reported error.
    pub fn any_driver() -> Self {
        ErrorKind::DRIVER.into_iter().collect()
    }

    pub fn with(mut self, kind: ErrorKind) -> Self {
        self.0.insert(kind);
        self
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ErrorKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = ErrorKind>>(iter: I) -> Self {
        KindSet(iter.into_iter().collect())
    }
}

/// A failure the retry policy knows how to classify.
///
/// `kind` gives the top-level classification. Nested causes (for example a
/// socket error wrapped inside a generic driver error) are reached through
/// the standard [`std::error::Error::source`] chain.
pub trait DriverFailure: std::error::Error + 'static {
    fn kind(&self) -> ErrorKind;
}

impl DriverFailure for sqlx::Error {
    fn kind(&self) -> ErrorKind {
        match self {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => ErrorKind::Integrity,
                _ => ErrorKind::Database,
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => ErrorKind::Operational,
            sqlx::Error::Protocol(_) => ErrorKind::Internal,
            sqlx::Error::Configuration(_) => ErrorKind::Interface,
            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_) => ErrorKind::Programming,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Encode(_) | sqlx::Error::Decode(_) => {
                ErrorKind::Data
            }
            _ => ErrorKind::Database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_driver_excludes_application() {
        let set = KindSet::any_driver();
        assert!(set.contains(ErrorKind::Operational));
        assert!(set.contains(ErrorKind::Internal));
        assert!(set.contains(ErrorKind::Database));
        assert!(!set.contains(ErrorKind::Application));
        assert_eq!(set.iter().count(), ErrorKind::DRIVER.len());
    }

    #[test]
    fn sqlx_errors_map_to_kinds() {
        assert_eq!(sqlx::Error::PoolClosed.kind(), ErrorKind::Operational);
        assert_eq!(sqlx::Error::PoolTimedOut.kind(), ErrorKind::Operational);
        assert_eq!(sqlx::Error::RowNotFound.kind(), ErrorKind::Programming);
        assert_eq!(
            sqlx::Error::Protocol("unexpected message".into()).kind(),
            ErrorKind::Internal
        );
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert_eq!(sqlx::Error::Io(io).kind(), ErrorKind::Operational);
    }

    #[test]
    fn kinds_use_snake_case_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kinds: Vec<ErrorKind>,
        }
        let parsed: Wrapper = toml::from_str(r#"kinds = ["operational", "not_supported"]"#).unwrap();
        assert_eq!(
            parsed.kinds,
            vec![ErrorKind::Operational, ErrorKind::NotSupported]
        );
        assert_eq!(ErrorKind::NotSupported.as_str(), "not_supported");
    }
}
