pub mod orchestrator;
pub mod service;

pub use orchestrator::{FetchOrchestrator, FetchSource, Fetched, UNAVAILABLE_MESSAGE};
pub use service::{cancellable, TrendService};
