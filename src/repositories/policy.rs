//! Repository disablement policy
//!
//! Decides, per repository row, whether its selection checkbox can be
//! toggled. Rules are evaluated in order and the first match wins:
//!
//! | # | Rule | Result |
//! |---|------|--------|
//! | 1 | listing re-fetch in flight | disabled |
//! | 2 | selected repository that recommended packages depend on | disabled |
//! | 3 | status is not `Valid` | disabled |
//! | 4 | no snapshots, not selected, "use latest" off | disabled |
//! | 5 | otherwise | enabled |

use std::fmt;

use crate::api::models::ApiRepository;
use crate::wizard::selectors::{
    select_groups, select_packages, select_recommended_repositories, select_use_latest,
};
use crate::wizard::store::WizardState;

/// Why a repository row cannot be toggled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledReason {
    Fetching,
    RecommendedDependency,
    InvalidStatus(String),
    NoSnapshots,
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => write!(f, "Repository data is still fetching, please wait."),
            Self::RecommendedDependency => write!(
                f,
                "This repository was added because of previously recommended packages added to the image.\n\
                 To remove the repository, its related packages must be removed first."
            ),
            Self::InvalidStatus(status) => write!(
                f,
                "Repository can't be selected. The status is still '{}'.",
                status
            ),
            Self::NoSnapshots => write!(
                f,
                "This repository doesn't have snapshots enabled, so it cannot be selected."
            ),
        }
    }
}

/// Inputs of the policy that come from outside the repository record
#[derive(Debug, Clone, Copy)]
pub struct DisableContext<'a> {
    pub is_fetching: bool,
    pub recommended: &'a [ApiRepository],
    pub has_packages_or_groups: bool,
    pub use_latest: bool,
}

impl<'a> DisableContext<'a> {
    /// Read the policy inputs from the wizard state
    pub fn from_state(state: &'a WizardState, is_fetching: bool) -> Self {
        Self {
            is_fetching,
            recommended: select_recommended_repositories(state),
            has_packages_or_groups: !select_packages(state).is_empty()
                || !select_groups(state).is_empty(),
            use_latest: select_use_latest(state),
        }
    }

    fn is_recommended(&self, repo: &ApiRepository) -> bool {
        let is_epel = repo.url.as_deref().is_some_and(|url| url.contains("epel"));
        is_epel
            || repo.uuid.as_ref().is_some_and(|uuid| {
                self.recommended
                    .iter()
                    .any(|r| r.uuid.as_ref() == Some(uuid))
            })
    }
}

/// `None` when the repository can be toggled, otherwise the reason it cannot.
pub fn is_repo_disabled(
    repo: &ApiRepository,
    is_selected: bool,
    ctx: &DisableContext<'_>,
) -> Option<DisabledReason> {
    if ctx.is_fetching {
        return Some(DisabledReason::Fetching);
    }

    if !ctx.recommended.is_empty()
        && is_selected
        && ctx.has_packages_or_groups
        && ctx.is_recommended(repo)
    {
        return Some(DisabledReason::RecommendedDependency);
    }

    if !repo.is_valid() {
        return Some(DisabledReason::InvalidStatus(
            repo.display_status().to_string(),
        ));
    }

    if !repo.snapshot && !is_selected && !ctx.use_latest {
        return Some(DisabledReason::NoSnapshots);
    }

    None
}
