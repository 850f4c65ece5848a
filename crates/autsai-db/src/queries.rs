use crate::models::{DocumentRow, UserRow};
use crate::query::{ListQuery, Order, json_path, sql_value};
use crate::Database;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::Value;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password) VALUES (?1, ?2, ?3)",
                (id, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Documents --

    pub fn list_documents(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>> {
        self.with_conn(|conn| query_documents(conn, collection, query))
    }

    pub fn get_document(&self, collection: &str, id: &str) -> Result<Option<DocumentRow>> {
        self.with_conn(|conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    [collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            body.map(|text| -> Result<DocumentRow> {
                Ok(DocumentRow {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    body: serde_json::from_str(&text)?,
                })
            })
            .transpose()
        })
    }

    /// Insert a new document. The id must be unique within the collection.
    pub fn insert_document(&self, collection: &str, id: &str, body: &Value) -> Result<()> {
        if !body.is_object() {
            return Err(anyhow!("Document {}/{} is not a JSON object", collection, id));
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                rusqlite::params![collection, id, body.to_string()],
            )?;
            Ok(())
        })
    }

    /// Shallow-merge `patch` into an existing document.
    /// Returns the merged body, or `None` when the document doesn't exist.
    pub fn patch_document(&self, collection: &str, id: &str, patch: &Value) -> Result<Option<Value>> {
        let fields = patch
            .as_object()
            .ok_or_else(|| anyhow!("Patch for {}/{} is not a JSON object", collection, id))?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    [collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(text) = existing else {
                return Ok(None);
            };

            let mut body: Value = serde_json::from_str(&text)?;
            let object = body
                .as_object_mut()
                .ok_or_else(|| anyhow!("Stored document {}/{} is not an object", collection, id))?;
            for (key, value) in fields {
                // the id is the row key, never rewritten by a patch
                if key != "id" {
                    object.insert(key.clone(), value.clone());
                }
            }

            tx.execute(
                "UPDATE documents SET body = ?3, updated_at = datetime('now')
                 WHERE collection = ?1 AND id = ?2",
                rusqlite::params![collection, id, body.to_string()],
            )?;
            tx.commit()?;

            Ok(Some(body))
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is one of two literals chosen above, never user input
    let sql = format!(
        "SELECT id, email, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_documents(conn: &Connection, collection: &str, query: &ListQuery) -> Result<Vec<Value>> {
    let mut sql = String::from("SELECT body FROM documents WHERE collection = ?1");
    let mut params: Vec<rusqlite::types::Value> = vec![collection.to_string().into()];

    // Field paths are bound as parameters, so no field name reaches the SQL text.
    for (field, value) in &query.filters {
        params.push(json_path(field).into());
        if value.is_null() {
            sql.push_str(&format!(" AND json_extract(body, ?{}) IS NULL", params.len()));
        } else {
            let path_idx = params.len();
            params.push(sql_value(value));
            sql.push_str(&format!(
                " AND json_extract(body, ?{}) = ?{}",
                path_idx,
                params.len()
            ));
        }
    }

    let mut order_terms = Vec::with_capacity(query.order_by.len() + 1);
    for (field, order) in &query.order_by {
        params.push(json_path(field).into());
        let direction = match order {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        };
        order_terms.push(format!("json_extract(body, ?{}) {}", params.len(), direction));
    }
    order_terms.push("rowid ASC".to_string());
    sql.push_str(" ORDER BY ");
    sql.push_str(&order_terms.join(", "));

    if let Some(limit) = query.limit {
        params.push(i64::from(limit).into());
        sql.push_str(&format!(" LIMIT ?{}", params.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.iter()
        .map(|text| Ok(serde_json::from_str::<Value>(text)?))
        .collect()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
