//! Orders: the one resource with lifecycle behavior
//!
//! Orders are submitted by shoppers and afterwards only change through the admin
//! partial update, which may flip the `is_paid`, `is_picked` and `is_enabled` flags.
//! Flipping a flag in its watched direction stamps the paired timestamp once:
//!
//! | Flag | Watched transition | Timestamp |
//! |---|---|---|
//! | `is_paid` | false → true | `paid_at` |
//! | `is_picked` | false → true | `picked_at` |
//! | `is_enabled` | true → false | `disabled_at` |
//!
//! [`patch`] parses the update payload, [`engine`] derives the writes, and
//! [`OrderService`] ties both to the document store.

pub mod engine;
mod model;
pub mod patch;
mod service;

pub use engine::{plan_update, TransitionPlan};
pub use model::{LineItem, NewOrder, Order};
pub use patch::{FlagPatch, OrderFlag, OrderPatch, PatchError};
pub use service::OrderService;
