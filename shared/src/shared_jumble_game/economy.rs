use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    AD_GEM_BONUS, FREE_ALLOTMENT, HINT_COST_GEMS, RESET_WINDOW, SHUFFLE_COST_GEMS, TRIAL_COST_GEMS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Hint,
    Shuffle,
    Trial,
}

/// Which pool a consumption draws from first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOrder {
    FreeFirst,
    PurchasedFirst,
}

impl ResourceKind {
    pub fn cost_gems(&self) -> u32 {
        match self {
            Self::Hint => HINT_COST_GEMS,
            Self::Shuffle => SHUFFLE_COST_GEMS,
            Self::Trial => TRIAL_COST_GEMS,
        }
    }

    pub fn consume_order(&self) -> ConsumeOrder {
        match self {
            Self::Trial => ConsumeOrder::PurchasedFirst,
            Self::Hint | Self::Shuffle => ConsumeOrder::FreeFirst,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hint => write!(f, "hint"),
            Self::Shuffle => write!(f, "shuffle"),
            Self::Trial => write!(f, "trial"),
        }
    }
}

pub fn reset_window() -> Duration {
    Duration::seconds(RESET_WINDOW.as_secs() as i64)
}

/// Outcome of trying to spend one unit of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumption {
    Free { free_remaining: u32 },
    Purchased { purchased_remaining: u32 },
    Refused { cooldown: Duration },
}

impl Consumption {
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Refused { .. })
    }
}

/// What `ResourceCounter::refresh` changed, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Unchanged,
    Reset,
    CooldownStarted,
}

/// A daily free allowance plus a purchased pool for one resource.
///
/// Once the free allowance runs out the exhaustion time is stamped and the
/// allowance comes back `RESET_WINDOW` later. Purchased units never expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounter {
    pub kind: ResourceKind,
    pub free_used: u32,
    pub exhausted_at: Option<DateTime<Utc>>,
    pub purchased: u32,
}

impl ResourceCounter {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            free_used: 0,
            exhausted_at: None,
            purchased: 0,
        }
    }

    pub fn free_remaining(&self) -> u32 {
        FREE_ALLOTMENT.saturating_sub(self.free_used)
    }

    pub fn available(&self) -> u32 {
        self.free_remaining() + self.purchased
    }

    pub fn remaining_cooldown(&self, now: DateTime<Utc>) -> Duration {
        match self.exhausted_at {
            Some(exhausted_at) => {
                let left = reset_window() - (now - exhausted_at);
                if left > Duration::zero() {
                    left
                } else {
                    Duration::zero()
                }
            }
            None => Duration::zero(),
        }
    }

    /// Applies the daily reset if its window has passed. A counter loaded with
    /// an exhausted allowance but no timestamp starts its window now.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        match self.exhausted_at {
            Some(exhausted_at) if now - exhausted_at >= reset_window() => {
                self.free_used = 0;
                self.exhausted_at = None;
                RefreshOutcome::Reset
            }
            None if self.free_remaining() == 0 => {
                self.exhausted_at = Some(now);
                RefreshOutcome::CooldownStarted
            }
            _ => RefreshOutcome::Unchanged,
        }
    }

    /// Spends one unit following the kind's consume order.
    pub fn consume(&mut self, now: DateTime<Utc>) -> Consumption {
        self.refresh(now);

        let use_purchased_first = self.kind.consume_order() == ConsumeOrder::PurchasedFirst;
        if use_purchased_first && self.purchased > 0 {
            return self.take_purchased();
        }

        if self.free_remaining() > 0 {
            self.free_used += 1;
            if self.free_remaining() == 0 {
                self.exhausted_at = Some(now);
            }
            return Consumption::Free {
                free_remaining: self.free_remaining(),
            };
        }

        if self.purchased > 0 {
            return self.take_purchased();
        }

        Consumption::Refused {
            cooldown: self.remaining_cooldown(now),
        }
    }

    fn take_purchased(&mut self) -> Consumption {
        self.purchased -= 1;
        Consumption::Purchased {
            purchased_remaining: self.purchased,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> CooldownStatus {
        let cooldown = self.remaining_cooldown(now);
        CooldownStatus {
            kind: self.kind,
            available: self.available(),
            free_remaining: self.free_remaining(),
            purchased: self.purchased,
            in_cooldown: self.free_remaining() == 0 && cooldown > Duration::zero(),
            remaining_seconds: if cooldown > Duration::zero() {
                Some(cooldown.num_seconds())
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub kind: ResourceKind,
    pub available: u32,
    pub free_remaining: u32,
    pub purchased: u32,
    pub in_cooldown: bool,
    pub remaining_seconds: Option<i64>,
}

pub fn format_cooldown_time(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{}h {}m {}s", hours, minutes, secs)
}

/// Currencies and records mirrored from the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub gems: u32,
    pub tms_points: u64,
    pub highest_score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { gems_left: u32, purchased: u32 },
    /// Not enough gems; the player may watch an ad for `ad_bonus` gems instead.
    InsufficientGems { needed: u32, available: u32, ad_bonus: u32 },
}

/// Buys one unit of `counter`'s resource with gems from `wallet`.
pub fn purchase(counter: &mut ResourceCounter, wallet: &mut Wallet) -> PurchaseOutcome {
    let cost = counter.kind.cost_gems();
    if wallet.gems < cost {
        return PurchaseOutcome::InsufficientGems {
            needed: cost,
            available: wallet.gems,
            ad_bonus: AD_GEM_BONUS,
        };
    }

    wallet.gems -= cost;
    counter.purchased += 1;
    PurchaseOutcome::Purchased {
        gems_left: wallet.gems,
        purchased: counter.purchased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(hour as i64)
    }

    #[test]
    fn test_hint_uses_free_then_purchased() {
        let mut hints = ResourceCounter::new(ResourceKind::Hint);
        hints.purchased = 1;
        assert_eq!(hints.consume(at(0)), Consumption::Free { free_remaining: 2 });
        assert_eq!(hints.consume(at(0)), Consumption::Free { free_remaining: 1 });
        assert_eq!(hints.exhausted_at, None);
        assert_eq!(hints.consume(at(1)), Consumption::Free { free_remaining: 0 });
        assert_eq!(hints.exhausted_at, Some(at(1)));
        assert_eq!(hints.consume(at(2)), Consumption::Purchased { purchased_remaining: 0 });
        assert_eq!(
            hints.consume(at(3)),
            Consumption::Refused { cooldown: Duration::hours(22) }
        );
    }

    #[test]
    fn test_trial_uses_purchased_first() {
        let mut trials = ResourceCounter::new(ResourceKind::Trial);
        trials.purchased = 2;
        assert_eq!(trials.consume(at(0)), Consumption::Purchased { purchased_remaining: 1 });
        assert_eq!(trials.free_remaining(), 3);
    }

    #[test]
    fn test_reset_after_window_keeps_purchased() {
        let mut trials = ResourceCounter::new(ResourceKind::Trial);
        for _ in 0..3 {
            assert!(trials.consume(at(0)).is_granted());
        }
        trials.purchased = 4;
        assert_eq!(trials.remaining_cooldown(at(24) + Duration::seconds(1)), Duration::zero());
        assert_eq!(trials.refresh(at(24) + Duration::seconds(1)), RefreshOutcome::Reset);
        assert_eq!(trials.free_remaining(), FREE_ALLOTMENT);
        assert_eq!(trials.purchased, 4);
        assert_eq!(trials.exhausted_at, None);
    }

    #[test]
    fn test_remaining_cooldown_counts_down() {
        let mut shuffles = ResourceCounter::new(ResourceKind::Shuffle);
        shuffles.free_used = 3;
        shuffles.exhausted_at = Some(at(0));
        assert_eq!(shuffles.remaining_cooldown(at(6)), Duration::hours(18));
        let status = shuffles.status(at(6));
        assert!(status.in_cooldown);
        assert_eq!(status.remaining_seconds, Some(18 * 3600));
    }

    #[test]
    fn test_exhausted_without_timestamp_starts_window() {
        let mut hints = ResourceCounter::new(ResourceKind::Hint);
        hints.free_used = 3;
        assert_eq!(hints.refresh(at(5)), RefreshOutcome::CooldownStarted);
        assert_eq!(hints.exhausted_at, Some(at(5)));
    }

    #[test]
    fn test_purchase_spends_gems() {
        let mut wallet = Wallet { gems: 12, ..Wallet::default() };
        let mut trials = ResourceCounter::new(ResourceKind::Trial);
        assert_eq!(
            purchase(&mut trials, &mut wallet),
            PurchaseOutcome::Purchased { gems_left: 2, purchased: 1 }
        );
        assert_eq!(
            purchase(&mut trials, &mut wallet),
            PurchaseOutcome::InsufficientGems { needed: 10, available: 2, ad_bonus: AD_GEM_BONUS }
        );
        assert_eq!(trials.purchased, 1);
    }

    #[test]
    fn test_format_cooldown_time() {
        assert_eq!(format_cooldown_time(3_725), "1h 2m 5s");
    }
}
