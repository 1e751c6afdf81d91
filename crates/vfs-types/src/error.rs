use std::path::PathBuf;

/// Canonical result alias used by every `vfscore` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The caller-visible domain error taxonomy (spec §6).
///
/// Variants are returned verbatim from backends so that higher layers can
/// `match` on them; there is no wrapping/"context" layer on top, matching
/// the flat `io::Result`/`io::Error` style the reference workspace uses
/// throughout `overlayfs/fs.rs`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotExist(PathBuf),

    #[error("already exists: {0}")]
    Exist(PathBuf),

    #[error("not a directory: {0}")]
    NotDirectory(PathBuf),

    #[error("is a directory: {0}")]
    IsDirectory(PathBuf),

    #[error("permission denied: {0}")]
    Permission(PathBuf),

    #[error("read-only filesystem: {0}")]
    ReadOnly(PathBuf),

    #[error("mount failed: {0}")]
    MountFailed(String),

    #[error("object too large: {0}")]
    TooLarge(PathBuf),

    #[error("operation cancelled")]
    Cancelled,

    /// Carries the per-item errors from a bulk operation (recursive delete,
    /// multi-key query push-down). Equality to a specific domain error is
    /// defined as "the aggregate contains only that error" — see
    /// [`Error::is_only`].
    #[error("{} error(s) in aggregate: {0:?}", .0.len())]
    Aggregate(Vec<Error>),
}

impl Error {
    /// True if this error is an [`Error::Aggregate`] whose every member
    /// matches `pred`, or if this error itself matches `pred`.
    pub fn is_only(&self, pred: impl Fn(&Error) -> bool + Copy) -> bool {
        match self {
            Error::Aggregate(errs) => !errs.is_empty() && errs.iter().all(|e| e.is_only(pred)),
            other => pred(other),
        }
    }

    pub fn is_not_exist(&self) -> bool {
        self.is_only(|e| matches!(e, Error::NotExist(_)))
    }

    pub fn is_exist(&self) -> bool {
        self.is_only(|e| matches!(e, Error::Exist(_)))
    }

    /// Flatten a batch of fallible operations into `Ok(())` or a single
    /// `Error::Aggregate` carrying every failure, in order. Used by
    /// recursive delete (spec §4.2 Delete) and by query push-down failures.
    pub fn aggregate(results: Vec<Result<()>>) -> Result<()> {
        let errs: Vec<Error> = results.into_iter().filter_map(|r| r.err()).collect();
        if errs.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(errs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_of_all_ok_is_ok() {
        let results = vec![Ok(()), Ok(())];
        assert!(Error::aggregate(results).is_ok());
    }

    #[test]
    fn aggregate_collects_failures_in_order() {
        let results = vec![
            Ok(()),
            Err(Error::NotExist("/a".into())),
            Err(Error::Exist("/b".into())),
        ];
        let err = Error::aggregate(results).unwrap_err();
        match err {
            Error::Aggregate(items) => assert_eq!(items.len(), 2),
            other => panic!("expected Aggregate, got {other:?}"),
        }
    }

    #[test]
    fn is_only_matches_homogeneous_aggregate() {
        let err = Error::Aggregate(vec![
            Error::NotExist("/a".into()),
            Error::NotExist("/b".into()),
        ]);
        assert!(err.is_not_exist());
    }

    #[test]
    fn is_only_rejects_mixed_aggregate() {
        let err = Error::Aggregate(vec![
            Error::NotExist("/a".into()),
            Error::Exist("/b".into()),
        ]);
        assert!(!err.is_not_exist());
    }
}
