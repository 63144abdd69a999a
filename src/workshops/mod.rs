//! Workshop listing: filter model, query composition, and result shaping.
//!
//! Listing a workshop subset runs in three steps: resolve the free-text
//! and tag filters to candidate id lists, compose the remaining column
//! constraints into one SELECT, and shape the nested relation payload
//! (tag join wrappers, creator, attachments) into flat view models.

pub mod filter;
pub mod query;
pub mod shape;

pub use filter::{plan_list_query, QueryPlan, SelectPlan, WorkshopFilter};
pub use query::{get_workshop, list_workshops};
pub use shape::{shape_workshop, WorkshopRecord, WorkshopView};
