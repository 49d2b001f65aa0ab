//! Read-only view of a Firefox `places.sqlite` database.

use crate::{matches_query, query_terms, BookmarkNode, StoreError, TreeStore, ROOT_ID};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// `moz_bookmarks.id` of the places root.
const PLACES_ROOT: i64 = 1;
const TYPE_BOOKMARK: i64 = 1;
const TYPE_FOLDER: i64 = 2;

const SELECT_NODE: &str = "SELECT b.id AS id, b.parent AS parent, b.type AS kind, \
     b.title AS title, b.dateAdded AS date_added, p.url AS url \
     FROM moz_bookmarks b LEFT JOIN moz_places p ON p.id = b.fk";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[derive(Clone)]
pub struct PlacesStore {
    pool: SqlitePool,
}

impl PlacesStore {
    /// Opens a places database. Plain paths are opened read-only; `sqlite:`
    /// urls are used as given.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let url = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            let norm = database_url.replace('\\', "/");
            format!("sqlite://{}?mode=ro", norm)
        };
        let opts = SqliteConnectOptions::from_str(&url)?;
        let mut pool_opts = SqlitePoolOptions::new();
        if url.contains("memory") {
            pool_opts = pool_opts.max_connections(1);
        } else {
            pool_opts = pool_opts.max_connections(5);
        }
        let pool = pool_opts.connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn store_id(places_id: i64) -> String {
    if places_id == PLACES_ROOT {
        ROOT_ID.to_string()
    } else {
        places_id.to_string()
    }
}

fn places_id(id: &str) -> Option<i64> {
    if id == ROOT_ID {
        Some(PLACES_ROOT)
    } else {
        id.parse().ok()
    }
}

fn node_from_row(row: &SqliteRow) -> Result<BookmarkNode, StoreError> {
    let id: i64 = row.try_get("id")?;
    let parent: Option<i64> = row.try_get("parent")?;
    let kind: i64 = row.try_get("kind")?;
    let url: Option<String> = row.try_get("url")?;
    let date_added: Option<i64> = row.try_get("date_added")?;
    Ok(BookmarkNode {
        id: store_id(id),
        parent_id: if id == PLACES_ROOT {
            None
        } else {
            parent.map(store_id)
        },
        url: if kind == TYPE_FOLDER {
            None
        } else {
            Some(url.unwrap_or_default())
        },
        title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        date_added: date_added.map(|us| us / 1000),
    })
}

#[async_trait::async_trait]
impl TreeStore for PlacesStore {
    async fn get(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        let key = places_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let row = sqlx::query(&format!(
            "{SELECT_NODE} WHERE b.id = ?1 AND b.type IN ({TYPE_BOOKMARK}, {TYPE_FOLDER})"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        node_from_row(&row)
    }

    async fn children(&self, id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let parent = self.get(id).await?;
        if !parent.is_directory() {
            return Ok(Vec::new());
        }
        let key = places_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let rows = sqlx::query(&format!(
            "{SELECT_NODE} WHERE b.parent = ?1 AND b.type IN ({TYPE_BOOKMARK}, {TYPE_FOLDER}) \
             ORDER BY b.position"
        ))
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(node_from_row).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let terms = query_terms(query);
        let Some(first) = terms.first() else {
            return Ok(Vec::new());
        };
        // Narrow in SQL on the first term, check the rest in memory.
        let rows = sqlx::query(&format!(
            "{SELECT_NODE} WHERE b.id != ?1 AND b.type IN ({TYPE_BOOKMARK}, {TYPE_FOLDER}) \
             AND (lower(b.title) LIKE ?2 OR lower(p.url) LIKE ?2) ORDER BY b.id"
        ))
        .bind(PLACES_ROOT)
        .bind(format!("%{}%", first))
        .fetch_all(&self.pool)
        .await?;
        let mut found = Vec::with_capacity(rows.len());
        for row in &rows {
            let node = node_from_row(row)?;
            if matches_query(&node, &terms) {
                found.push(node);
            }
        }
        Ok(found)
    }
}
