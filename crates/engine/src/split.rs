//! Profit-split fractions and the split resolver.
//!
//! A split says how the profit on one completed app is divided between the
//! partner and the business. Fractions are stored as integer **basis points**
//! (10 000 = 100%) for the same reason money is stored as integer cents:
//! no floating-point drift.
//!
//! Resolution priority, first match wins:
//!
//! 1. a per-app [`PartnerAppSplit`](crate::PartnerAppSplit) for the
//!    (partner, app) pair
//! 2. assignment-level overrides (partner defaults fill any gap)
//! 3. the partner's default fractions
//! 4. the hardcoded fallback of 25% partner / 75% owner
//!
//! Nothing forces the two fractions to sum to 100% at read time; that rule is
//! enforced only on write paths via [`Split::validated`].

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, assignments::Assignment, partners::Partner};

/// A share fraction in basis points (`0..=10_000`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareBps(u16);

impl ShareBps {
    pub const ZERO: ShareBps = ShareBps(0);
    pub const FULL: ShareBps = ShareBps(10_000);

    /// Creates a share, rejecting values above 100%.
    pub fn new(bps: u16) -> ResultEngine<Self> {
        if bps > Self::FULL.0 {
            return Err(EngineError::InvalidShare(format!(
                "share must be <= 10000 basis points, got {bps}"
            )));
        }
        Ok(Self(bps))
    }

    /// Raw basis points.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Parses a percentage from form input ("25", "2.5", "12,5") into basis
    /// points. Accepts at most two decimals.
    pub fn from_percent_str(s: &str) -> ResultEngine<Self> {
        let invalid = || EngineError::InvalidShare(format!("invalid percentage: {s:?}"));
        let normalized = s.trim().replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (normalized.as_str(), ""),
        };
        if whole.is_empty()
            || whole.len() > 3
            || frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: u32 = whole.parse().map_err(|_| invalid())?;
        let frac: u32 = if frac.is_empty() {
            0
        } else {
            let parsed: u32 = frac.parse().map_err(|_| invalid())?;
            if frac.len() == 1 { parsed * 10 } else { parsed }
        };
        let bps = whole * 100 + frac;
        let bps = u16::try_from(bps).map_err(|_| invalid())?;
        Self::new(bps)
    }

    /// Formats the share as a human percentage ("25%", "12.5%").
    #[must_use]
    pub fn as_percent_string(self) -> String {
        if self.0 % 100 == 0 {
            format!("{}%", self.0 / 100)
        } else if self.0 % 10 == 0 {
            format!("{}.{}%", self.0 / 100, (self.0 % 100) / 10)
        } else {
            format!("{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

/// An effective (partner, owner) pair of shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub partner: ShareBps,
    pub owner: ShareBps,
}

impl Split {
    /// Applied when a partner record carries no defaults at all.
    pub const FALLBACK: Split = Split {
        partner: ShareBps(2_500),
        owner: ShareBps(7_500),
    };

    /// Builds a split, rejecting pairs that do not sum to 100%.
    ///
    /// This is the write-path rule from the edit forms; stored rows are never
    /// re-normalized on read.
    pub fn validated(partner: ShareBps, owner: ShareBps) -> ResultEngine<Self> {
        if partner.0 + owner.0 != ShareBps::FULL.0 {
            return Err(EngineError::InvalidShare(format!(
                "partner ({}) and owner ({}) shares must sum to 100%",
                partner.as_percent_string(),
                owner.as_percent_string()
            )));
        }
        Ok(Self { partner, owner })
    }
}

/// Returns the partner's default split, with the hardcoded fallback filling
/// any missing fraction.
#[must_use]
pub fn partner_defaults(partner: &Partner) -> Split {
    Split {
        partner: partner.default_partner_share.unwrap_or(Split::FALLBACK.partner),
        owner: partner.default_owner_share.unwrap_or(Split::FALLBACK.owner),
    }
}

/// Resolves the effective split for one app.
///
/// `app_split` is the per-app override for this (partner, app) pair, if any.
#[must_use]
pub fn resolve_split(
    partner: &Partner,
    assignment: Option<&Assignment>,
    app_split: Option<Split>,
) -> Split {
    if let Some(split) = app_split {
        return split;
    }

    let defaults = partner_defaults(partner);
    if let Some(assignment) = assignment
        && (assignment.partner_share.is_some() || assignment.owner_share.is_some())
    {
        return Split {
            partner: assignment.partner_share.unwrap_or(defaults.partner),
            owner: assignment.owner_share.unwrap_or(defaults.owner),
        };
    }

    defaults
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn partner(default_bps: Option<(u16, u16)>) -> Partner {
        Partner {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            contact: None,
            default_partner_share: default_bps.map(|(p, _)| ShareBps(p)),
            default_owner_share: default_bps.map(|(_, o)| ShareBps(o)),
            notes: None,
        }
    }

    fn assignment(overrides: Option<(u16, u16)>) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            partner_share: overrides.map(|(p, _)| ShareBps(p)),
            owner_share: overrides.map(|(_, o)| ShareBps(o)),
            notes: None,
        }
    }

    #[test]
    fn app_split_wins_over_everything() {
        let app_split = Split::validated(ShareBps(4_000), ShareBps(6_000)).unwrap();
        let resolved = resolve_split(
            &partner(Some((3_000, 7_000))),
            Some(&assignment(Some((5_000, 5_000)))),
            Some(app_split),
        );
        assert_eq!(resolved, app_split);
    }

    #[test]
    fn assignment_override_beats_partner_default() {
        let resolved = resolve_split(
            &partner(Some((3_000, 7_000))),
            Some(&assignment(Some((5_000, 5_000)))),
            None,
        );
        assert_eq!(resolved.partner, ShareBps(5_000));
        assert_eq!(resolved.owner, ShareBps(5_000));
    }

    #[test]
    fn partial_assignment_override_fills_from_defaults() {
        let mut half = assignment(None);
        half.partner_share = Some(ShareBps(1_000));
        let resolved = resolve_split(&partner(Some((3_000, 7_000))), Some(&half), None);
        assert_eq!(resolved.partner, ShareBps(1_000));
        assert_eq!(resolved.owner, ShareBps(7_000));
    }

    #[test]
    fn falls_back_to_hardcoded_quarter() {
        let resolved = resolve_split(&partner(None), Some(&assignment(None)), None);
        assert_eq!(resolved, Split::FALLBACK);
    }

    #[test]
    fn validated_rejects_bad_sum() {
        assert!(Split::validated(ShareBps(2_500), ShareBps(7_000)).is_err());
        assert!(Split::validated(ShareBps(2_500), ShareBps(7_500)).is_ok());
    }

    #[test]
    fn percent_parsing() {
        assert_eq!(ShareBps::from_percent_str("25").unwrap(), ShareBps(2_500));
        assert_eq!(ShareBps::from_percent_str("12.5").unwrap(), ShareBps(1_250));
        assert_eq!(ShareBps::from_percent_str("0,25").unwrap(), ShareBps(25));
        assert!(ShareBps::from_percent_str("101").is_err());
        assert!(ShareBps::from_percent_str("-1").is_err());
    }
}
