pub mod site;

pub use site::{DeferredSite, Site};
