pub mod adapters;
pub mod client;
pub mod fallback;

pub use adapters::adapt;
pub use client::{AnalyzerClient, AnalyzerRequest, CallOutcome};
