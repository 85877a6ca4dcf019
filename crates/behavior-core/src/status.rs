//! Status returned by behavior nodes and the policies that aggregate them.

/// The result of ticking a behavior node.
///
/// # Tick Semantics
///
/// Terminal values mean the subtree is done for now; the next tick starts
/// it over from the entry point its parent defines. `Running` means the
/// subtree is mid-work and the driver should tick again.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Status {
    /// The behavior completed successfully.
    ///
    /// For conditions: The condition was met.
    /// For actions: The effect was carried out.
    Success,

    /// The behavior failed.
    ///
    /// For conditions: The condition was not met.
    /// For actions: The effect could not be carried out.
    Failure,

    /// The behavior is still working and wants another tick.
    ///
    /// Conditions never report this.
    Running,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Returns `true` for `Success` and `Failure`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Inverts the status: Success becomes Failure and vice versa.
    ///
    /// `Running` is returned unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }
}

impl From<bool> for Status {
    /// Maps a predicate result: `true` → `Success`, `false` → `Failure`.
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Threshold used by [`Parallel`](crate::Parallel) to aggregate child results.
///
/// `OneSucceeds` and `AllSucceed` are success thresholds; `OneFails` and
/// `AllFail` are failure thresholds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Policy {
    /// At least one child succeeded.
    OneSucceeds,
    /// Every child succeeded.
    AllSucceed,
    /// At least one child failed.
    OneFails,
    /// Every child failed.
    AllFail,
}

impl Policy {
    /// Returns `true` if this policy can be used as a success threshold.
    #[inline]
    pub fn is_success_policy(self) -> bool {
        matches!(self, Policy::OneSucceeds | Policy::AllSucceed)
    }

    /// Returns `true` if this policy can be used as a failure threshold.
    #[inline]
    pub fn is_failure_policy(self) -> bool {
        matches!(self, Policy::OneFails | Policy::AllFail)
    }

    /// Checks the threshold against counted child results.
    pub(crate) fn is_met(self, successes: usize, failures: usize, total: usize) -> bool {
        match self {
            Policy::OneSucceeds => successes >= 1,
            Policy::AllSucceed => successes == total,
            Policy::OneFails => failures >= 1,
            Policy::AllFail => failures == total,
        }
    }
}
