//! Agent runtime - tool-augmented conversation loop
//!
//! This crate is the "brain" of the MediBot service:
//! - A provider-agnostic chat client with tool-calling support (`llm`)
//! - The tool trait, registry, and schema surface the model sees (`tools`)
//! - The clinic's appointment tool set (`toolset`)
//! - The bounded model/tools dispatch loop (`dispatcher`)
//!
//! # Safety Principle
//!
//! The model is strictly a translator between the patient and the tool set.
//! It never decides whether a booking is valid; those decisions are made by
//! `medibot_core::scheduling` and the store, and the model only relays the
//! outcome.

pub mod dispatcher;
pub mod llm;
pub mod tools;
pub mod toolset;

pub use dispatcher::{AgentError, Dispatcher, GIVE_UP_REPLY};
pub use llm::{ChatMessage, LlmClient, LlmError, OpenAiChatClient, Role, ToolCall, ToolSchema};
pub use tools::{Tool, ToolOutcome, ToolRegistry, ToolReply};
pub use toolset::{Clock, SystemClock, ToolContext};
