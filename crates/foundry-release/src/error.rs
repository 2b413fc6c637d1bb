use crate::types::Stage;

/// Classified release failures.
///
/// Engine functions return `anyhow::Error`; these variants sit at the root
/// of the chain so callers can `downcast_ref::<ReleaseError>()` regardless of
/// the context added on the way up.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("invalid manifest file name `{0}`: expected `system.json` or `module.json`")]
    InvalidManifestName(String),

    #[error("version file is empty")]
    EmptyVersion,

    #[error("invalid version `{0}`: versions must not contain whitespace")]
    InvalidVersion(String),

    #[error(
        "no GitHub token found: pass --token, set the actionToken input, or export GITHUB_TOKEN or GH_TOKEN"
    )]
    MissingToken,

    #[error(
        "repository owner and name are unknown: pass --owner and --repo, or run with GITHUB_EVENT_PATH or GITHUB_REPOSITORY set"
    )]
    MissingRepository,

    #[error(
        "committer identity is unknown: pass --committer-email and --committer-name, set [git] committer_email and committer_name, or run from a push event"
    )]
    MissingCommitter,

    #[error("{repository} has no published release to collect commits since")]
    NoPriorRelease { repository: String },
}

impl ReleaseError {
    /// Errors caused by how the tool was invoked rather than by a failing
    /// service or command
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ReleaseError::InvalidManifestName(_)
                | ReleaseError::MissingToken
                | ReleaseError::MissingRepository
                | ReleaseError::MissingCommitter
        )
    }
}

/// Context attached by the engine naming the stage that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} stage failed")]
pub struct StageFailed(pub Stage);

/// The stage an engine error came from, if any
pub fn failed_stage(err: &anyhow::Error) -> Option<Stage> {
    err.downcast_ref::<StageFailed>().map(|s| s.0)
}

/// Whether `err` is a configuration error anywhere in its chain
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ReleaseError>())
        .any(ReleaseError::is_config_error)
}
