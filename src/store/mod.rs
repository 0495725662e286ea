//! Data access for greenhouses and their readings.
//!
//! Route handlers go through these functions rather than querying entities
//! directly, so validation and the cascade rules live in one place.

mod greenhouses;
mod readings;

pub use greenhouses::{
    create_greenhouse, delete_greenhouse, find_greenhouse_by_name, list_greenhouses,
    rename_greenhouse, resolve_greenhouse,
};
pub use readings::{NewReading, ReadingFilter, add_reading, delete_reading, list_readings};
