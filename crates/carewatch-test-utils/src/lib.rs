//! Test helpers shared across Carewatch crates.

pub mod fixtures;
pub mod llm;
pub mod store;

pub use llm::{FailingLLM, FixedChatResponse, FixedLLM, FlakyLLM, RecordingChatLLM, SlowLLM};
pub use store::{FlakyStore, StoreFault};
