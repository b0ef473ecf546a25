//! Transition planning for order updates
//!
//! [`plan_update`] is pure: given the stored order, a validated patch and the
//! current time it returns every field write the update needs. Side effects are
//! derived from the stored state only, never from other entries of the same patch.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::model::Order;
use super::patch::{OrderFlag, OrderPatch};
use crate::store::Document;

/// Field writes for one order update
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    /// Flag values plus any derived timestamps, applied as one merge
    pub writes: Document,
    /// Flags whose timestamp this update sets
    pub stamped: Vec<OrderFlag>,
}

/// Derive the writes for applying `patch` to `current` at `now`
///
/// A timestamp is written only when the flag moves to its watched value from the
/// other value and the timestamp has never been set. Re-applying a patch therefore
/// never moves a timestamp.
pub fn plan_update(current: &Order, patch: &OrderPatch, now: DateTime<Utc>) -> TransitionPlan {
    let stamp = Value::String(now.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    let mut writes = Document::new();
    let mut stamped = Vec::new();

    for entry in patch.flags() {
        let flag = entry.flag;
        writes.insert(flag.field().to_string(), Value::Bool(entry.value));

        let enters_watched_state =
            entry.value == flag.watched_value() && flag.value_in(current) != entry.value;
        if enters_watched_state && !flag.is_stamped(current) {
            writes.insert(flag.timestamp_field().to_string(), stamp.clone());
            stamped.push(flag);
        }
    }

    TransitionPlan { writes, stamped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::patch::FlagPatch;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn fresh_order() -> Order {
        Order {
            id: "o1".into(),
            is_enabled: true,
            ..Order::default()
        }
    }

    fn patch(entries: &[(OrderFlag, bool)]) -> OrderPatch {
        OrderPatch::new(
            entries
                .iter()
                .map(|&(flag, value)| FlagPatch { flag, value }),
        )
        .unwrap()
    }

    #[test]
    fn test_paying_stamps_paid_at() {
        let plan = plan_update(&fresh_order(), &patch(&[(OrderFlag::Paid, true)]), now());
        assert_eq!(plan.writes["is_paid"], Value::Bool(true));
        assert_eq!(plan.writes["paid_at"], "2024-05-01T12:00:00Z");
        assert_eq!(plan.stamped, vec![OrderFlag::Paid]);
    }

    #[test]
    fn test_already_paid_is_idempotent() {
        let mut order = fresh_order();
        order.is_paid = true;
        order.paid_at = Some(now());

        let plan = plan_update(&order, &patch(&[(OrderFlag::Paid, true)]), now());
        assert_eq!(plan.writes.len(), 1);
        assert!(plan.stamped.is_empty());
    }

    #[test]
    fn test_timestamp_never_overwritten() {
        let mut order = fresh_order();
        order.is_paid = false;
        order.paid_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let plan = plan_update(&order, &patch(&[(OrderFlag::Paid, true)]), now());
        assert!(!plan.writes.contains_key("paid_at"));
    }

    #[test]
    fn test_unpaying_writes_flag_only() {
        let mut order = fresh_order();
        order.is_paid = true;

        let plan = plan_update(&order, &patch(&[(OrderFlag::Paid, false)]), now());
        assert_eq!(plan.writes["is_paid"], Value::Bool(false));
        assert!(!plan.writes.contains_key("paid_at"));
    }

    #[test]
    fn test_disabling_stamps_disabled_at() {
        let plan = plan_update(&fresh_order(), &patch(&[(OrderFlag::Enabled, false)]), now());
        assert_eq!(plan.writes["is_enabled"], Value::Bool(false));
        assert!(plan.writes.contains_key("disabled_at"));

        let plan = plan_update(&fresh_order(), &patch(&[(OrderFlag::Enabled, true)]), now());
        assert!(!plan.writes.contains_key("disabled_at"));
    }

    #[test]
    fn test_independent_flags_in_one_patch() {
        let mut order = fresh_order();
        order.is_picked = true;
        order.picked_at = Some(now());

        let plan = plan_update(
            &order,
            &patch(&[(OrderFlag::Paid, true), (OrderFlag::Picked, true)]),
            now(),
        );
        assert!(plan.writes.contains_key("paid_at"));
        assert!(!plan.writes.contains_key("picked_at"));
        assert_eq!(plan.stamped, vec![OrderFlag::Paid]);
    }
}
