//! In-memory page model the controllers run against.

pub mod document;
pub mod events;
pub mod page;
pub mod selector;

pub use document::{Document, Element, NodeId, Window};
pub use events::{Event, EventKind};
pub use page::{Page, Subscription};
pub use selector::Selector;
