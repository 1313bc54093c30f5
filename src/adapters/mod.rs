// Adapters layer: concrete implementations of the domain ports.

pub mod http_gateway;
pub mod notifier;

pub use http_gateway::HttpLeadGateway;
pub use notifier::{ConsoleNotifier, RecordingNotifier};
