//! Admin partial update payload for orders
//!
//! The payload is a JSON object whose keys must come from `is_enabled`,
//! `is_picked` and `is_paid`, each with a boolean value. Anything else rejects
//! the whole payload before the order is touched.

use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::model::Order;

/// Flags the admin may change on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderFlag {
    Enabled,
    Picked,
    Paid,
}

impl OrderFlag {
    pub const ALL: [OrderFlag; 3] = [OrderFlag::Enabled, OrderFlag::Picked, OrderFlag::Paid];

    /// Wire and stored field name of the flag
    pub fn field(self) -> &'static str {
        match self {
            Self::Enabled => "is_enabled",
            Self::Picked => "is_picked",
            Self::Paid => "is_paid",
        }
    }

    /// Field holding the timestamp paired with the flag
    pub fn timestamp_field(self) -> &'static str {
        match self {
            Self::Enabled => "disabled_at",
            Self::Picked => "picked_at",
            Self::Paid => "paid_at",
        }
    }

    /// Value the flag moves to in its watched transition
    pub fn watched_value(self) -> bool {
        !matches!(self, Self::Enabled)
    }

    /// Currently stored value of the flag
    pub fn value_in(self, order: &Order) -> bool {
        match self {
            Self::Enabled => order.is_enabled,
            Self::Picked => order.is_picked,
            Self::Paid => order.is_paid,
        }
    }

    /// Whether the paired timestamp is already set
    pub fn is_stamped(self, order: &Order) -> bool {
        match self {
            Self::Enabled => order.disabled_at.is_some(),
            Self::Picked => order.picked_at.is_some(),
            Self::Paid => order.paid_at.is_some(),
        }
    }
}

impl fmt::Display for OrderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for OrderFlag {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.field() == s)
            .ok_or_else(|| PatchError::UnknownField(s.to_string()))
    }
}

/// Reasons an update payload is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Invalid field in request payload: {0}")]
    UnknownField(String),

    #[error("Invalid value for {0}: expected a boolean")]
    NotBoolean(String),

    #[error("Request payload must set at least one of is_enabled, is_picked, is_paid")]
    Empty,
}

/// New value for one flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPatch {
    pub flag: OrderFlag,
    pub value: bool,
}

/// Validated partial update: one entry per supplied flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPatch {
    flags: Vec<FlagPatch>,
}

impl OrderPatch {
    pub fn new(flags: impl IntoIterator<Item = FlagPatch>) -> Result<Self, PatchError> {
        let mut patch = Self { flags: Vec::new() };
        for entry in flags {
            patch.set(entry.flag, entry.value);
        }
        if patch.flags.is_empty() {
            return Err(PatchError::Empty);
        }
        Ok(patch)
    }

    /// Set a flag, overriding an earlier value for the same flag
    fn set(&mut self, flag: OrderFlag, value: bool) {
        match self.flags.iter_mut().find(|entry| entry.flag == flag) {
            Some(entry) => entry.value = value,
            None => self.flags.push(FlagPatch { flag, value }),
        }
    }

    pub fn flags(&self) -> &[FlagPatch] {
        &self.flags
    }
}

impl TryFrom<Map<String, Value>> for OrderPatch {
    type Error = PatchError;

    fn try_from(payload: Map<String, Value>) -> Result<Self, Self::Error> {
        let flags = payload
            .into_iter()
            .map(|(key, value)| {
                let flag: OrderFlag = key.parse()?;
                let value = value.as_bool().ok_or(PatchError::NotBoolean(key))?;
                Ok(FlagPatch { flag, value })
            })
            .collect::<Result<Vec<_>, PatchError>>()?;

        Self::new(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parses_allowed_flags() {
        let patch = OrderPatch::try_from(payload(json!({"is_paid": true, "is_enabled": false})))
            .unwrap();
        assert_eq!(patch.flags().len(), 2);
        assert!(patch.flags().contains(&FlagPatch {
            flag: OrderFlag::Paid,
            value: true
        }));
        assert!(patch.flags().contains(&FlagPatch {
            flag: OrderFlag::Enabled,
            value: false
        }));
    }

    #[test]
    fn test_unknown_key_rejects_whole_payload() {
        let err = OrderPatch::try_from(payload(json!({"is_paid": true, "foo": 1}))).unwrap_err();
        assert_eq!(err, PatchError::UnknownField("foo".into()));
        assert_eq!(err.to_string(), "Invalid field in request payload: foo");
    }

    #[test]
    fn test_legacy_spelling_is_rejected() {
        let err = OrderPatch::try_from(payload(json!({"is_enable": false}))).unwrap_err();
        assert_eq!(err, PatchError::UnknownField("is_enable".into()));
    }

    #[test]
    fn test_non_boolean_value_rejected() {
        let err = OrderPatch::try_from(payload(json!({"is_picked": "yes"}))).unwrap_err();
        assert_eq!(err, PatchError::NotBoolean("is_picked".into()));
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert_eq!(
            OrderPatch::try_from(Map::new()).unwrap_err(),
            PatchError::Empty
        );
    }

    #[test]
    fn test_flag_round_trips_through_field_name() {
        for flag in OrderFlag::ALL {
            assert_eq!(flag.field().parse::<OrderFlag>().unwrap(), flag);
        }
    }
}
