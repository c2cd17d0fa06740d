use serde::{Deserialize, Serialize};

use super::LocalizedText;
use crate::shared::geo::Coordinate;

/// A bus stop as served by the bus stop service.
/// The workspace never creates or deletes these, it only references them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: LocalizedText,
    pub description: String,
    pub coordinate: Option<Coordinate>,
    pub address: String,
    pub city: String,
    pub is_accessible: bool,
}

impl Stop {
    /// Name shown in pickers, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.english.is_empty() {
            &self.id
        } else {
            &self.name.english
        }
    }
}
