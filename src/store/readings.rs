use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::entity::{greenhouses, readings};
use crate::error::{AppError, AppResult};
use crate::period::Period;

/// A reading as submitted by the dashboard form
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewReading {
    /// Calendar day of the reading
    pub date: NaiveDate,
    /// Time of day, `HH:MM` or `HH:MM:SS`
    pub time: Option<String>,
    /// Maximum temperature (°C)
    pub temp_max: f64,
    /// Minimum temperature (°C)
    pub temp_min: f64,
    /// Maximum relative humidity (%)
    pub humidity_max: f64,
    /// Minimum relative humidity (%)
    pub humidity_min: f64,
    /// CO2 concentration (ppm)
    pub co2: Option<f64>,
}

impl NewReading {
    fn validate(&self) -> AppResult<()> {
        let values = [
            ("temp_max", self.temp_max),
            ("temp_min", self.temp_min),
            ("humidity_max", self.humidity_max),
            ("humidity_min", self.humidity_min),
        ];
        for (field, v) in values {
            if !v.is_finite() {
                return Err(AppError::BadRequest(format!("{field} must be a finite number")));
            }
        }

        if self.temp_min > self.temp_max {
            return Err(AppError::BadRequest(
                "temp_min must not exceed temp_max".to_string(),
            ));
        }
        if self.humidity_min > self.humidity_max {
            return Err(AppError::BadRequest(
                "humidity_min must not exceed humidity_max".to_string(),
            ));
        }
        for (field, v) in [("humidity_max", self.humidity_max), ("humidity_min", self.humidity_min)] {
            if !(0.0..=100.0).contains(&v) {
                return Err(AppError::BadRequest(format!("{field} must be between 0 and 100")));
            }
        }

        if let Some(co2) = self.co2
            && (!co2.is_finite() || co2 < 0.0)
        {
            return Err(AppError::BadRequest(
                "co2 must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }
}

/// Normalise a time of day to `HH:MM`.
fn normalize_time(raw: &str) -> AppResult<String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AppError::BadRequest(format!("Invalid time of day: {raw}")))
}

/// Which readings to list
#[derive(Debug, Clone, Copy)]
pub struct ReadingFilter {
    pub greenhouse_id: Option<i32>,
    pub period: Period,
}

impl ReadingFilter {
    #[must_use]
    pub fn greenhouse(greenhouse_id: i32, period: Period) -> Self {
        Self {
            greenhouse_id: Some(greenhouse_id),
            period,
        }
    }
}

pub async fn add_reading(
    db: &DatabaseConnection,
    greenhouse_id: i32,
    input: &NewReading,
) -> AppResult<readings::Model> {
    input.validate()?;
    let time = input.time.as_deref().map(normalize_time).transpose()?;

    if greenhouses::Entity::find_by_id(greenhouse_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "Greenhouse {greenhouse_id} not found"
        )));
    }

    let reading = readings::ActiveModel {
        greenhouse_id: Set(greenhouse_id),
        date: Set(input.date),
        time: Set(time),
        temp_max: Set(input.temp_max),
        temp_min: Set(input.temp_min),
        humidity_max: Set(input.humidity_max),
        humidity_min: Set(input.humidity_min),
        co2: Set(input.co2),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(
        reading_id = reading.id,
        greenhouse_id,
        date = %reading.date,
        time = ?reading.time,
        "Reading stored"
    );
    Ok(reading)
}

/// List readings, newest first.
pub async fn list_readings(
    db: &DatabaseConnection,
    filter: ReadingFilter,
) -> AppResult<Vec<readings::Model>> {
    let mut query = readings::Entity::find();

    if let Some(greenhouse_id) = filter.greenhouse_id {
        query = query.filter(readings::Column::GreenhouseId.eq(greenhouse_id));
    }

    if let Some((start, end)) = filter.period.date_range() {
        query = query
            .filter(readings::Column::Date.gte(start))
            .filter(readings::Column::Date.lt(end));
    }

    Ok(query
        .order_by_desc(readings::Column::Date)
        .order_by_desc(readings::Column::Time)
        .order_by_desc(readings::Column::Id)
        .all(db)
        .await?)
}

/// Delete one reading by id, returning the removed row.
pub async fn delete_reading(db: &DatabaseConnection, id: i32) -> AppResult<readings::Model> {
    let reading = readings::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reading {id} not found")))?;

    readings::Entity::delete_by_id(id).exec(db).await?;

    tracing::info!(reading_id = id, greenhouse_id = reading.greenhouse_id, "Reading deleted");
    Ok(reading)
}
