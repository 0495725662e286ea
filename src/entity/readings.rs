use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registros")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "inv_id")]
    pub greenhouse_id: i32,
    #[sea_orm(column_name = "fecha")]
    pub date: Date,
    /// Time of day as `HH:MM`; absent on rows recorded before it was captured
    #[sea_orm(column_name = "hora")]
    pub time: Option<String>,
    #[sea_orm(column_name = "t_max")]
    pub temp_max: f64,
    #[sea_orm(column_name = "t_min")]
    pub temp_min: f64,
    #[sea_orm(column_name = "h_max")]
    pub humidity_max: f64,
    #[sea_orm(column_name = "h_min")]
    pub humidity_min: f64,
    pub co2: Option<f64>,
}

impl Model {
    /// Midpoint of the day's temperature range.
    #[must_use]
    pub fn avg_temp(&self) -> f64 {
        (self.temp_max + self.temp_min) / 2.0
    }

    /// Midpoint of the day's humidity range.
    #[must_use]
    pub fn avg_humidity(&self) -> f64 {
        (self.humidity_max + self.humidity_min) / 2.0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::greenhouses::Entity",
        from = "Column::GreenhouseId",
        to = "super::greenhouses::Column::Id",
        on_delete = "Cascade"
    )]
    Greenhouse,
}

impl Related<super::greenhouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Greenhouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
