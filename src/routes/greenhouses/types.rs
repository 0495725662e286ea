use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::greenhouses;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GreenhouseRequest {
    /// Display name, unique ignoring case
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GreenhouseResponse {
    pub id: i32,
    pub name: String,
}

impl From<greenhouses::Model> for GreenhouseResponse {
    fn from(g: greenhouses::Model) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}
