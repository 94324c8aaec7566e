use crate::providers::Message;
use serde::{Deserialize, Serialize};

/// On-disk record of a saved conversation
///
/// The file holds exactly these two fields; anything else is rejected when
/// loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedConversation {
    /// The model the conversation was using
    pub model: String,
    /// The full transcript, in order
    pub messages: Vec<Message>,
}
