use routedesk::{model::Stop, shared::Coordinate};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StopDto {
    pub id: String,
    pub name: String,
    pub name_sinhala: String,
    pub name_tamil: String,
    pub coordinate: Option<Coordinate>,
    pub is_accessible: bool,
}

impl StopDto {
    pub fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.clone(),
            name: stop.display_name().to_string(),
            name_sinhala: stop.name.sinhala.clone(),
            name_tamil: stop.name.tamil.clone(),
            coordinate: stop.coordinate,
            is_accessible: stop.is_accessible,
        }
    }
}
