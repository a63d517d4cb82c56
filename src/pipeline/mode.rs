// src/pipeline/mode.rs

//! Side-effect policy for an invocation.

/// Which side effects a run is permitted to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Archive to the blob store, publish, and commit.
    Normal,
    /// Archive and commit, but skip all publisher calls.
    NoPublish,
    /// No blob writes and no publisher calls; artifacts land in a local
    /// directory and the commit is suppressed so a later real run still
    /// posts on the first observed change.
    LocalDryRun,
}

impl RunMode {
    /// Resolve the mode from CLI flags. `--no-tweet` wins when both are set.
    pub fn from_flags(dry_run: bool, no_tweet: bool) -> Self {
        if no_tweet {
            Self::NoPublish
        } else if dry_run {
            Self::LocalDryRun
        } else {
            Self::Normal
        }
    }

    /// Whether archive writes go to the real blob store.
    pub fn blob_writes(&self) -> bool {
        !matches!(self, Self::LocalDryRun)
    }

    /// Whether publisher calls (verify, upload, post) are made.
    pub fn publishes(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Whether `previousSchedule.json` is rewritten on a changed run.
    pub fn commits(&self) -> bool {
        !matches!(self, Self::LocalDryRun)
    }

    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NoPublish => "no-publish",
            Self::LocalDryRun => "dry-run",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_resolution() {
        assert_eq!(RunMode::from_flags(false, false), RunMode::Normal);
        assert_eq!(RunMode::from_flags(true, false), RunMode::LocalDryRun);
        assert_eq!(RunMode::from_flags(false, true), RunMode::NoPublish);
    }

    #[test]
    fn test_no_tweet_takes_precedence() {
        assert_eq!(RunMode::from_flags(true, true), RunMode::NoPublish);
    }

    #[test]
    fn test_side_effect_matrix() {
        assert!(RunMode::Normal.blob_writes());
        assert!(RunMode::Normal.publishes());
        assert!(RunMode::Normal.commits());

        assert!(RunMode::NoPublish.blob_writes());
        assert!(!RunMode::NoPublish.publishes());
        assert!(RunMode::NoPublish.commits());

        assert!(!RunMode::LocalDryRun.blob_writes());
        assert!(!RunMode::LocalDryRun.publishes());
        assert!(!RunMode::LocalDryRun.commits());
    }
}
