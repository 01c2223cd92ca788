//! Fulfillment agent - turns a normalized webhook request into reply text.
//!
//! # Flow
//!
//! 1. **Routing** - the request already carries a core intent id
//! 2. **Slot check** (`dialogbridge_core::resolver`) - ask for missing parameters
//! 3. **Data call** (`downstream`) - at most one call to the intent's endpoint
//! 4. **Synthesis** (`synthesizer`) - the model phrases the reply
//! 5. **History** - both turns appended under the session lease
//!
//! # Key Types
//!
//! - `FulfillmentRuntime` - orchestrator (see `runtime` module)
//! - `LlmClient` - pluggable generation capability
//! - `DownstreamClient` - pluggable banking data endpoint client
//!
//! The model never decides whether data is fetched or which intent applies.
//! Those are deterministic decisions made before it is called.

pub mod downstream;
pub mod llm;
pub mod runtime;
pub mod synthesizer;

pub use downstream::{DownstreamAnswer, DownstreamClient, DownstreamPayload, HttpDownstreamClient};
pub use llm::{ChatCompletionsClient, GenerationRequest, LlmClient, RetryPolicy};
pub use runtime::{FulfillmentReply, FulfillmentRuntime, ReplyOutcome, RuntimeOptions};
pub use synthesizer::{Framing, PromptContext, ResponseSynthesizer, Synthesis};
