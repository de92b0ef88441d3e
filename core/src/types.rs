//! Response DTOs returned by the extractor.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fixed greeting every envelope carries.
pub const MESSAGE: &str = "I am a super proprietary API";

/// Decoded query parameters, in order of first appearance.
///
/// Inserting an existing key replaces its value in place, so a repeated
/// parameter ends up with its last value but its first position.
pub type QueryMap = IndexMap<String, String>;

/// The envelope handed back to the host for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub message: String,
    pub query: QueryMap,
}

impl ResponseEnvelope {
    pub fn new(query: QueryMap) -> Self {
        Self {
            message: MESSAGE.to_string(),
            query,
        }
    }
}
