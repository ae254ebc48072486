use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::economy::{ResourceCounter, ResourceKind, Wallet};
use crate::constants::FREE_ALLOTMENT;

fn default_free_trials() -> u32 {
    FREE_ALLOTMENT
}

/// The slice of the remote user profile the puzzle game reads and writes.
/// Timestamps travel as millisecond epochs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub gems: u32,
    #[serde(default)]
    pub tms_points: u64,
    #[serde(default)]
    pub highest_score: u64,
    #[serde(default)]
    pub hint_count: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_hint: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchased_hints: u32,
    #[serde(default)]
    pub shuffle_count: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_shuffle: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchased_shuffles: u32,
    #[serde(default = "default_free_trials")]
    pub free_trials: u32,
    #[serde(default)]
    pub purchased_trials: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_jumbo: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn new(user_id: i64, username: Option<String>) -> Self {
        Self {
            user_id,
            username,
            gems: 0,
            tms_points: 0,
            highest_score: 0,
            hint_count: 0,
            last_hint: None,
            purchased_hints: 0,
            shuffle_count: 0,
            last_shuffle: None,
            purchased_shuffles: 0,
            free_trials: FREE_ALLOTMENT,
            purchased_trials: 0,
            last_jumbo: None,
        }
    }

    pub fn wallet(&self) -> Wallet {
        Wallet {
            gems: self.gems,
            tms_points: self.tms_points,
            highest_score: self.highest_score,
        }
    }

    pub fn counter(&self, kind: ResourceKind) -> ResourceCounter {
        let (free_used, exhausted_at, purchased) = match kind {
            ResourceKind::Hint => (self.hint_count, self.last_hint, self.purchased_hints),
            ResourceKind::Shuffle => (self.shuffle_count, self.last_shuffle, self.purchased_shuffles),
            ResourceKind::Trial => (
                FREE_ALLOTMENT.saturating_sub(self.free_trials),
                self.last_jumbo,
                self.purchased_trials,
            ),
        };
        ResourceCounter {
            kind,
            free_used: free_used.min(FREE_ALLOTMENT),
            exhausted_at,
            purchased,
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, update: &UserUpdate) {
        for field in &update.fields {
            match *field {
                UserField::Gems(v) => self.gems = v,
                UserField::TmsPoints(v) => self.tms_points = v,
                UserField::HighestScore(v) => self.highest_score = v,
                UserField::HintCount(v) => self.hint_count = v,
                UserField::LastHint(v) => self.last_hint = v,
                UserField::PurchasedHints(v) => self.purchased_hints = v,
                UserField::ShuffleCount(v) => self.shuffle_count = v,
                UserField::LastShuffle(v) => self.last_shuffle = v,
                UserField::PurchasedShuffles(v) => self.purchased_shuffles = v,
                UserField::FreeTrials(v) => self.free_trials = v,
                UserField::PurchasedTrials(v) => self.purchased_trials = v,
                UserField::LastJumbo(v) => self.last_jumbo = v,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub user_id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserExistsResponse {
    pub exists: bool,
}

/// One named, typed field of the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Gems(u32),
    TmsPoints(u64),
    HighestScore(u64),
    HintCount(u32),
    LastHint(Option<DateTime<Utc>>),
    PurchasedHints(u32),
    ShuffleCount(u32),
    LastShuffle(Option<DateTime<Utc>>),
    PurchasedShuffles(u32),
    FreeTrials(u32),
    PurchasedTrials(u32),
    LastJumbo(Option<DateTime<Utc>>),
}

const FIELD_NAMES: &[&str] = &[
    "gems",
    "tms_points",
    "highest_score",
    "hint_count",
    "last_hint",
    "purchased_hints",
    "shuffle_count",
    "last_shuffle",
    "purchased_shuffles",
    "free_trials",
    "purchased_trials",
    "last_jumbo",
];

impl UserField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gems(_) => "gems",
            Self::TmsPoints(_) => "tms_points",
            Self::HighestScore(_) => "highest_score",
            Self::HintCount(_) => "hint_count",
            Self::LastHint(_) => "last_hint",
            Self::PurchasedHints(_) => "purchased_hints",
            Self::ShuffleCount(_) => "shuffle_count",
            Self::LastShuffle(_) => "last_shuffle",
            Self::PurchasedShuffles(_) => "purchased_shuffles",
            Self::FreeTrials(_) => "free_trials",
            Self::PurchasedTrials(_) => "purchased_trials",
            Self::LastJumbo(_) => "last_jumbo",
        }
    }
}

/// A partial user-record update. Serialises as a flat JSON object holding
/// only the listed fields; unknown keys are rejected on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserUpdate {
    pub fields: Vec<UserField>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: UserField) -> Self {
        // A later value for the same key replaces the earlier one.
        self.fields.retain(|existing| existing.key() != field.key());
        self.fields.push(field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields that persist `counter` in the user record.
    pub fn for_counter(counter: &ResourceCounter) -> Self {
        let update = Self::new();
        match counter.kind {
            ResourceKind::Hint => update
                .with(UserField::HintCount(counter.free_used))
                .with(UserField::LastHint(counter.exhausted_at))
                .with(UserField::PurchasedHints(counter.purchased)),
            ResourceKind::Shuffle => update
                .with(UserField::ShuffleCount(counter.free_used))
                .with(UserField::LastShuffle(counter.exhausted_at))
                .with(UserField::PurchasedShuffles(counter.purchased)),
            ResourceKind::Trial => update
                .with(UserField::FreeTrials(counter.free_remaining()))
                .with(UserField::PurchasedTrials(counter.purchased))
                .with(UserField::LastJumbo(counter.exhausted_at)),
        }
    }

    pub fn merge(mut self, other: UserUpdate) -> Self {
        for field in other.fields {
            self = self.with(field);
        }
        self
    }
}

fn millis(value: Option<DateTime<Utc>>) -> Option<i64> {
    value.map(|dt| dt.timestamp_millis())
}

fn from_millis(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

impl Serialize for UserUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            match *field {
                UserField::Gems(v)
                | UserField::HintCount(v)
                | UserField::PurchasedHints(v)
                | UserField::ShuffleCount(v)
                | UserField::PurchasedShuffles(v)
                | UserField::FreeTrials(v)
                | UserField::PurchasedTrials(v) => map.serialize_entry(field.key(), &v)?,
                UserField::TmsPoints(v) | UserField::HighestScore(v) => map.serialize_entry(field.key(), &v)?,
                UserField::LastHint(v) | UserField::LastShuffle(v) | UserField::LastJumbo(v) => {
                    map.serialize_entry(field.key(), &millis(v))?
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UserUpdate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UpdateVisitor;

        impl<'de> Visitor<'de> for UpdateVisitor {
            type Value = UserUpdate;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of user record fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UserUpdate, A::Error> {
                let mut update = UserUpdate::new();
                while let Some(key) = map.next_key::<String>()? {
                    let field = match key.as_str() {
                        "gems" => UserField::Gems(map.next_value()?),
                        "tms_points" => UserField::TmsPoints(map.next_value()?),
                        "highest_score" => UserField::HighestScore(map.next_value()?),
                        "hint_count" => UserField::HintCount(map.next_value()?),
                        "last_hint" => UserField::LastHint(from_millis(map.next_value()?)),
                        "purchased_hints" => UserField::PurchasedHints(map.next_value()?),
                        "shuffle_count" => UserField::ShuffleCount(map.next_value()?),
                        "last_shuffle" => UserField::LastShuffle(from_millis(map.next_value()?)),
                        "purchased_shuffles" => UserField::PurchasedShuffles(map.next_value()?),
                        "free_trials" => UserField::FreeTrials(map.next_value()?),
                        "purchased_trials" => UserField::PurchasedTrials(map.next_value()?),
                        "last_jumbo" => UserField::LastJumbo(from_millis(map.next_value()?)),
                        other => return Err(de::Error::unknown_field(other, FIELD_NAMES)),
                    };
                    update = update.with(field);
                }
                Ok(update)
            }
        }

        deserializer.deserialize_map(UpdateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_serialises_only_named_fields() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
        let update = UserUpdate::new()
            .with(UserField::HintCount(3))
            .with(UserField::LastHint(Some(at)));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({ "hint_count": 3, "last_hint": 1_700_000_000_000i64 }));
    }

    #[test]
    fn test_later_value_wins() {
        let update = UserUpdate::new()
            .with(UserField::Gems(10))
            .with(UserField::Gems(4));
        assert_eq!(update.fields, vec![UserField::Gems(4)]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<UserUpdate, _> = serde_json::from_value(json!({ "hint_cnt": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_update_to_record() {
        let mut record = UserRecord::new(42, None);
        let update: UserUpdate =
            serde_json::from_value(json!({ "free_trials": 0, "purchased_trials": 2, "last_jumbo": null })).unwrap();
        record.apply(&update);
        assert_eq!(record.free_trials, 0);
        assert_eq!(record.purchased_trials, 2);
        let trials = record.counter(ResourceKind::Trial);
        assert_eq!(trials.free_used, 3);
        assert_eq!(trials.purchased, 2);
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let record: UserRecord = serde_json::from_value(json!({ "user_id": 7, "gems": 15 })).unwrap();
        assert_eq!(record.gems, 15);
        assert_eq!(record.free_trials, FREE_ALLOTMENT);
        assert_eq!(record.last_hint, None);
    }

    #[test]
    fn test_counter_update_round_trips_through_record() {
        let mut record = UserRecord::new(1, Some("ton".into()));
        let mut hints = record.counter(ResourceKind::Hint);
        hints.free_used = 2;
        hints.purchased = 5;
        record.apply(&UserUpdate::for_counter(&hints));
        assert_eq!(record.counter(ResourceKind::Hint), hints);
    }
}
