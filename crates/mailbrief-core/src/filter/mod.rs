//! Filter predicate model, canonical state store, and deep-link codec.

mod model;
mod query;
mod store;

pub use model::{
    ActionRequired, AttachmentFilter, Category, DateRange, FilterPredicate, Priority, SenderType,
};
pub use store::{FilterChange, FilterStore};
