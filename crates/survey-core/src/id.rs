//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the campaign (application) that owns a task.
///
/// Every policy instance serves exactly one campaign; the host uses the
/// id to route completed tasks back to the policy that requested them.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CampaignId(pub u32);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CampaignId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_number() {
        assert_eq!(CampaignId(7).to_string(), "7");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&CampaignId(3)).unwrap();
        assert_eq!(json, "3");
        let back: CampaignId = serde_json::from_str("12").unwrap();
        assert_eq!(back, CampaignId::from(12));
    }
}
