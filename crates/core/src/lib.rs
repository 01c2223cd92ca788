//! Core domain for the dialogbridge fulfillment webhook.
//!
//! Everything here is synchronous and free of I/O: intent registry, tag
//! routing, slot resolution, prompt templates, configuration and the error
//! taxonomy shared by the agent and server crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod prompt;
pub mod registry;
pub mod resolver;
pub mod routing;

pub use domain::intent::{IntentId, IntentSpec, UNROUTED_INTENT_ID};
pub use domain::request::NormalizedRequest;
pub use domain::session::{Role, SessionId, Turn};
pub use domain::slots::SlotSet;
pub use errors::{DownstreamError, GenerationError, IntentError, RegistryError, TemplateError};
pub use prompt::{ApiData, PromptTemplate, PromptVars};
pub use registry::IntentRegistry;
pub use resolver::{SlotResolution, SlotResolver};
pub use routing::TagRouter;
