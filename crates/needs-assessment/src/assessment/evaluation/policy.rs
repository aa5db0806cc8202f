use serde::{Deserialize, Serialize};

/// Highest complexity score still classified as a low tier project.
pub const LOW_TIER_CEILING: u8 = 30;
/// Highest complexity score still classified as a mid tier project.
pub const MID_TIER_CEILING: u8 = 70;

/// Project size bucket derived from the complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Low,
    Mid,
    High,
}

impl ComplexityTier {
    pub const fn from_score(complexity: u8) -> Self {
        if complexity <= LOW_TIER_CEILING {
            Self::Low
        } else if complexity <= MID_TIER_CEILING {
            Self::Mid
        } else {
            Self::High
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }
}

/// Whether the client should own the result or have it managed for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipModel {
    Managed,
    Owned,
}

impl OwnershipModel {
    /// Only the sign of the independence score matters; zero counts as owned.
    pub const fn from_score(independence: i64) -> Self {
        if independence < 0 {
            Self::Managed
        } else {
            Self::Owned
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Owned => "owned",
        }
    }
}
