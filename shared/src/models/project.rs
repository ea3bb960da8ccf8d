//! Project lookup model

use serde::{Deserialize, Serialize};

/// Small reference record mirrored locally for offline display and form
/// selection. Pulled, never pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<i64>,
}
