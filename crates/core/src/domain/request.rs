use serde::{Deserialize, Serialize};

use crate::domain::intent::IntentId;
use crate::domain::session::SessionId;
use crate::domain::slots::SlotSet;

/// Platform-neutral view of one webhook delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    pub session_id: SessionId,
    pub user_text: String,
    /// The platform label exactly as received (tag or display name).
    pub intent_tag: String,
    pub intent_id: IntentId,
    pub parameters: SlotSet,
    pub sentiment: Option<String>,
}

