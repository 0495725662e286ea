use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
    sea_query::{Expr, Func},
};

use crate::entity::{greenhouses, readings};
use crate::error::{AppError, AppResult};

/// Longest accepted greenhouse name, in characters
const MAX_NAME_LEN: usize = 64;

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Greenhouse name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Greenhouse name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn duplicate(name: &str) -> AppError {
    AppError::Conflict(format!("A greenhouse named '{name}' already exists"))
}

/// Translate a unique-index violation into the same conflict the pre-check
/// reports. Two concurrent creates can both pass the pre-check.
fn map_unique_violation(err: DbErr, name: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate(name),
        _ => AppError::Database(err),
    }
}

/// List all greenhouses, ordered by name
pub async fn list_greenhouses(db: &DatabaseConnection) -> AppResult<Vec<greenhouses::Model>> {
    Ok(greenhouses::Entity::find()
        .order_by_asc(greenhouses::Column::Name)
        .all(db)
        .await?)
}

/// Case-insensitive lookup by name.
///
/// SQLite's `LOWER` folds ASCII only, so names with other letters are
/// compared after Unicode lowercasing in Rust ("Ñandú" matches "ñandú").
pub async fn find_greenhouse_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> AppResult<Option<greenhouses::Model>> {
    let name = name.trim();

    if name.is_ascii() {
        return Ok(greenhouses::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    greenhouses::Entity,
                    greenhouses::Column::Name,
                ))))
                .eq(name.to_lowercase()),
            )
            .one(db)
            .await?);
    }

    let wanted = name.to_lowercase();
    Ok(greenhouses::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .find(|g| g.name.to_lowercase() == wanted))
}

/// Resolve a greenhouse by numeric id or name (case-insensitive).
///
/// An all-digit key that matches no id is retried as a name, so a
/// greenhouse called "2024" stays reachable.
pub async fn resolve_greenhouse(
    db: &DatabaseConnection,
    id_or_name: &str,
) -> AppResult<greenhouses::Model> {
    if let Ok(id) = id_or_name.trim().parse::<i32>()
        && let Some(greenhouse) = greenhouses::Entity::find_by_id(id).one(db).await?
    {
        return Ok(greenhouse);
    }

    find_greenhouse_by_name(db, id_or_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Greenhouse '{id_or_name}' not found")))
}

pub async fn create_greenhouse(
    db: &DatabaseConnection,
    name: &str,
) -> AppResult<greenhouses::Model> {
    let name = validate_name(name)?;

    if find_greenhouse_by_name(db, &name).await?.is_some() {
        return Err(duplicate(&name));
    }

    let greenhouse = greenhouses::ActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| map_unique_violation(e, &name))?;

    tracing::info!(greenhouse_id = greenhouse.id, name = %greenhouse.name, "Greenhouse created");
    Ok(greenhouse)
}

pub async fn rename_greenhouse(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
) -> AppResult<greenhouses::Model> {
    let name = validate_name(name)?;

    let existing = greenhouses::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Greenhouse {id} not found")))?;

    if let Some(other) = find_greenhouse_by_name(db, &name).await?
        && other.id != id
    {
        return Err(duplicate(&name));
    }

    let old_name = existing.name.clone();
    let mut active: greenhouses::ActiveModel = existing.into();
    active.name = Set(name.clone());
    let updated = active
        .update(db)
        .await
        .map_err(|e| map_unique_violation(e, &name))?;

    tracing::info!(greenhouse_id = id, from = %old_name, to = %updated.name, "Greenhouse renamed");
    Ok(updated)
}

/// Delete a greenhouse together with all of its readings.
///
/// Readings are removed explicitly inside the transaction: tables created by
/// early releases carry no foreign key to cascade through.
///
/// Returns the number of readings removed.
pub async fn delete_greenhouse(db: &DatabaseConnection, id: i32) -> AppResult<u64> {
    let txn = db.begin().await?;

    if greenhouses::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!("Greenhouse {id} not found")));
    }

    let removed = readings::Entity::delete_many()
        .filter(readings::Column::GreenhouseId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    greenhouses::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(greenhouse_id = id, readings_removed = removed, "Greenhouse deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Norte  ").unwrap(), "Norte");
    }

    #[test]
    fn blank_and_oversized_names_rejected() {
        assert!(matches!(validate_name("   "), Err(AppError::BadRequest(_))));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(validate_name(&long), Err(AppError::BadRequest(_))));
    }
}
