use super::*;

/// Result code stored in a share's `status` field.
///
/// Accept and solved codes are deliberately sparse bit patterns so a zeroed
/// or garbled value reads as a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StratumStatus(i32);

impl StratumStatus {
    /// Share met the job target.
    pub const ACCEPT: Self = Self(1_798_084_231);
    /// Share met the job target but the job is stale.
    pub const ACCEPT_STALE: Self = Self(950_395_421);
    /// Share met the network target.
    pub const SOLVED: Self = Self(1_422_486_894);
    pub const SOLVED_STALE: Self = Self(1_713_984_938);
    /// Share met the network target, not yet verified.
    pub const SOLVED_PRELIMINARY: Self = Self(1_835_617_709);

    pub const REJECT_NO_REASON: Self = Self(0);
    pub const JOB_NOT_FOUND_OR_STALE: Self = Self(21);
    pub const DUPLICATE_SHARE: Self = Self(22);
    pub const LOW_DIFFICULTY: Self = Self(23);
    pub const UNAUTHORIZED: Self = Self(24);
    pub const NOT_SUBSCRIBED: Self = Self(25);
    pub const ILLEGAL_METHOD: Self = Self(26);
    pub const ILLEGAL_PARAMS: Self = Self(27);
    pub const IP_BANNED: Self = Self(28);
    pub const INVALID_USERNAME: Self = Self(29);
    pub const INTERNAL_ERROR: Self = Self(30);
    pub const TIME_TOO_OLD: Self = Self(31);
    pub const TIME_TOO_NEW: Self = Self(32);
    pub const ILLEGAL_VERMASK: Self = Self(33);
    pub const INVALID_SOLUTION: Self = Self(34);
    pub const WRONG_NONCE_PREFIX: Self = Self(35);
    pub const JOB_NOT_FOUND: Self = Self(36);
    pub const STALE_SHARE: Self = Self(37);
    pub const UNKNOWN: Self = Self(i32::MAX);

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            Self::ACCEPT
                | Self::ACCEPT_STALE
                | Self::SOLVED
                | Self::SOLVED_STALE
                | Self::SOLVED_PRELIMINARY
        )
    }

    pub fn is_solved(self) -> bool {
        matches!(
            self,
            Self::SOLVED | Self::SOLVED_STALE | Self::SOLVED_PRELIMINARY
        )
    }
}

impl Default for StratumStatus {
    fn default() -> Self {
        Self::REJECT_NO_REASON
    }
}

impl From<i32> for StratumStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<StratumStatus> for i32 {
    fn from(status: StratumStatus) -> i32 {
        status.0
    }
}

impl Display for StratumStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            Self::ACCEPT => "Share accepted",
            Self::ACCEPT_STALE => "Share accepted (stale)",
            Self::SOLVED => "Share accepted and solved",
            Self::SOLVED_STALE => "Share accepted and solved (stale)",
            Self::SOLVED_PRELIMINARY => "Share accepted and solved (unverified)",
            Self::REJECT_NO_REASON => "Share rejected",
            Self::JOB_NOT_FOUND_OR_STALE => "Job not found (=stale)",
            Self::DUPLICATE_SHARE => "Duplicate share",
            Self::LOW_DIFFICULTY => "Low difficulty",
            Self::UNAUTHORIZED => "Unauthorized worker",
            Self::NOT_SUBSCRIBED => "Not subscribed",
            Self::ILLEGAL_METHOD => "Illegal method",
            Self::ILLEGAL_PARAMS => "Illegal params",
            Self::IP_BANNED => "Ip banned",
            Self::INVALID_USERNAME => "Invalid username",
            Self::INTERNAL_ERROR => "Internal error",
            Self::TIME_TOO_OLD => "Time too old",
            Self::TIME_TOO_NEW => "Time too new",
            Self::ILLEGAL_VERMASK => "Invalid version mask",
            Self::INVALID_SOLUTION => "Invalid solution",
            Self::WRONG_NONCE_PREFIX => "Wrong nonce prefix",
            Self::JOB_NOT_FOUND => "Job not found",
            Self::STALE_SHARE => "Stale share",
            _ => "Unknown",
        })
    }
}
