//! Database operations for `saved_lists` and `saved_list_items`.
//!
//! Lists are addressed externally by their `public_id` UUID; the internal
//! `BIGSERIAL` id never leaves this crate. Items keep their insertion
//! `position` and are returned in that order. Appends never deduplicate —
//! a list is an append log of save actions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use leadscout_core::{Lead, SavedList, SavedListSummary};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `saved_lists` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavedListRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `saved_list_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavedListItemRow {
    pub id: i64,
    pub list_id: i64,
    pub position: i32,
    pub name: String,
    pub address: String,
    pub distance_m: f64,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub maps_url: Option<String>,
    pub postal_code: Option<String>,
    pub emails: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl SavedListItemRow {
    fn into_lead(self) -> Lead {
        let emails = serde_json::from_value(self.emails).unwrap_or_default();
        Lead {
            name: self.name,
            address: self.address,
            distance_m: self.distance_m,
            website: self.website,
            phone: self.phone,
            maps_url: self.maps_url,
            postal_code: self.postal_code,
            emails,
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates a new named list containing `items` in order, in one transaction.
///
/// # Errors
///
/// Returns [`DbError::NameTaken`] if a list with exactly this name already
/// exists (names are case-sensitive), or [`DbError::Sqlx`] on other failures.
/// On any error nothing is persisted.
pub async fn create_list(pool: &PgPool, name: &str, items: &[Lead]) -> Result<SavedList, DbError> {
    let mut tx = pool.begin().await?;

    let public_id = Uuid::new_v4();
    let inserted = sqlx::query_as::<_, SavedListRow>(
        "INSERT INTO saved_lists (public_id, name) VALUES ($1, $2) \
         RETURNING id, public_id, name, created_at",
    )
    .bind(public_id)
    .bind(name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique_violation(e, name))?;

    insert_items(&mut tx, inserted.id, 0, items).await?;
    tx.commit().await?;

    Ok(SavedList {
        id: inserted.public_id,
        name: inserted.name,
        items: items.to_vec(),
        created_at: inserted.created_at,
    })
}

/// Appends `items` to an existing list in order, in one transaction.
///
/// Positions continue after the current maximum, so interleaved appends
/// from two saves keep each batch contiguous.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no list has this id (nothing is
/// persisted in that case), or [`DbError::Sqlx`] on other failures.
pub async fn append_to_list(
    pool: &PgPool,
    list_id: Uuid,
    items: &[Lead],
) -> Result<SavedList, DbError> {
    let mut tx = pool.begin().await?;

    let list = sqlx::query_as::<_, SavedListRow>(
        "SELECT id, public_id, name, created_at FROM saved_lists \
         WHERE public_id = $1 FOR UPDATE",
    )
    .bind(list_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let next_position: i32 = sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM saved_list_items WHERE list_id = $1",
    )
    .bind(list.id)
    .fetch_one(&mut *tx)
    .await?;

    insert_items(&mut tx, list.id, next_position, items).await?;
    tx.commit().await?;

    get_list(pool, list_id).await
}

/// Returns all lists, newest first, without item payloads.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_lists(pool: &PgPool) -> Result<Vec<SavedListSummary>, DbError> {
    let rows = sqlx::query_as::<_, (Uuid, String, i64, DateTime<Utc>)>(
        "SELECT l.public_id, l.name, COUNT(i.id), l.created_at \
         FROM saved_lists l \
         LEFT JOIN saved_list_items i ON i.list_id = l.id \
         GROUP BY l.id \
         ORDER BY l.created_at DESC, l.id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, item_count, created_at)| SavedListSummary {
            id,
            name,
            item_count,
            created_at,
        })
        .collect())
}

/// Fetches one list with its items in position order.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no list has this id.
pub async fn get_list(pool: &PgPool, list_id: Uuid) -> Result<SavedList, DbError> {
    let list = sqlx::query_as::<_, SavedListRow>(
        "SELECT id, public_id, name, created_at FROM saved_lists WHERE public_id = $1",
    )
    .bind(list_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let items = sqlx::query_as::<_, SavedListItemRow>(
        "SELECT id, list_id, position, name, address, distance_m, website, phone, \
                maps_url, postal_code, emails, created_at \
         FROM saved_list_items WHERE list_id = $1 ORDER BY position",
    )
    .bind(list.id)
    .fetch_all(pool)
    .await?;

    Ok(SavedList {
        id: list.public_id,
        name: list.name,
        items: items.into_iter().map(SavedListItemRow::into_lead).collect(),
        created_at: list.created_at,
    })
}

/// Deletes a list and all of its items. Not recoverable.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no list has this id.
pub async fn delete_list(pool: &PgPool, list_id: Uuid) -> Result<(), DbError> {
    let deleted = sqlx::query("DELETE FROM saved_lists WHERE public_id = $1")
        .bind(list_id)
        .execute(pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    list_id: i64,
    start_position: i32,
    items: &[Lead],
) -> Result<(), DbError> {
    for (offset, lead) in items.iter().enumerate() {
        let position = start_position.saturating_add(i32::try_from(offset).unwrap_or(i32::MAX));
        sqlx::query(
            "INSERT INTO saved_list_items \
                 (list_id, position, name, address, distance_m, website, phone, \
                  maps_url, postal_code, emails) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(list_id)
        .bind(position)
        .bind(&lead.name)
        .bind(&lead.address)
        .bind(lead.distance_m)
        .bind(&lead.website)
        .bind(&lead.phone)
        .bind(&lead.maps_url)
        .bind(&lead.postal_code)
        .bind(serde_json::to_value(&lead.emails).unwrap_or_default())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn map_unique_violation(e: sqlx::Error, name: &str) -> DbError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return DbError::NameTaken(name.to_owned());
        }
    }
    DbError::Sqlx(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str) -> Lead {
        Lead {
            name: name.to_owned(),
            address: format!("{name} street 1"),
            distance_m: 250.0,
            website: Some(format!("https://{}.example", name.to_lowercase())),
            phone: Some("(212) 555-0147".to_owned()),
            maps_url: None,
            postal_code: Some("10001".to_owned()),
            emails: vec![format!("info@{}.example", name.to_lowercase())],
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_then_get_round_trips_items_in_order(pool: PgPool) {
        let created = create_list(&pool, "Leads1", &[lead("Alpha"), lead("Beta")])
            .await
            .expect("create");

        let fetched = get_list(&pool, created.id).await.expect("get");
        assert_eq!(fetched.name, "Leads1");
        assert_eq!(fetched.items.len(), 2);
        assert_eq!(fetched.items[0].name, "Alpha");
        assert_eq!(fetched.items[1].name, "Beta");
        assert_eq!(fetched.items[0].emails, ["info@alpha.example"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_with_duplicate_name_is_name_taken(pool: PgPool) {
        let first = create_list(&pool, "Leads1", &[lead("Alpha")])
            .await
            .expect("first create");

        let err = create_list(&pool, "Leads1", &[lead("Beta")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NameTaken(ref n) if n == "Leads1"));

        // The failed attempt must not have touched the original list.
        let unchanged = get_list(&pool, first.id).await.expect("get");
        assert_eq!(unchanged.items.len(), 1);
        assert_eq!(unchanged.items[0].name, "Alpha");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_names_are_case_sensitive(pool: PgPool) {
        create_list(&pool, "Leads", &[]).await.expect("create");
        create_list(&pool, "leads", &[])
            .await
            .expect("different case is a different name");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn append_extends_in_order_without_dedup(pool: PgPool) {
        let created = create_list(&pool, "Leads1", &[lead("Alpha")])
            .await
            .expect("create");

        let after_first = append_to_list(&pool, created.id, &[lead("Beta"), lead("Alpha")])
            .await
            .expect("append");
        assert_eq!(after_first.items.len(), 3);

        // Saving the structurally identical lead again appends another entry.
        let after_second = append_to_list(&pool, created.id, &[lead("Alpha")])
            .await
            .expect("append again");
        let names: Vec<&str> = after_second.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Alpha", "Alpha"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn append_to_missing_list_is_not_found(pool: PgPool) {
        let err = append_to_list(&pool, Uuid::new_v4(), &[lead("Alpha")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delete_removes_list_and_its_items(pool: PgPool) {
        let created = create_list(&pool, "Leads1", &[lead("Alpha")])
            .await
            .expect("create");

        delete_list(&pool, created.id).await.expect("delete");
        assert!(matches!(
            get_list(&pool, created.id).await,
            Err(DbError::NotFound)
        ));
        assert!(matches!(
            delete_list(&pool, created.id).await,
            Err(DbError::NotFound)
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_lists_returns_newest_first_with_counts(pool: PgPool) {
        create_list(&pool, "Older", &[lead("Alpha")])
            .await
            .expect("create older");
        create_list(&pool, "Newer", &[lead("Alpha"), lead("Beta")])
            .await
            .expect("create newer");

        let summaries = list_lists(&pool).await.expect("list");
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Newer");
        assert_eq!(summaries[0].item_count, 2);
        assert_eq!(summaries[1].name, "Older");
        assert_eq!(summaries[1].item_count, 1);
    }
}
