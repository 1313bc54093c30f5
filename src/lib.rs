pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod dom;
pub mod domain;
pub mod sample;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConsoleNotifier, HttpLeadGateway, RecordingNotifier};
pub use app::{DeferredSite, Site};
pub use config::SiteConfig;
pub use dom::{Document, Element, Page};
pub use utils::error::{Result, SiteError};
