//! World descriptor.

use serde::{Deserialize, Serialize};

/// Static description of a narrative setting. Chosen once per session and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    /// Catalog key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short setting description handed to the narrator.
    pub description: String,
    /// Tone hints ("grim", "whimsical", ...).
    #[serde(default)]
    pub tone: Vec<String>,
    /// Content constraints the narrator must respect.
    #[serde(default)]
    pub constraints: Vec<String>,
}
