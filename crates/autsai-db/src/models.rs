/// Database row types. These map directly to SQLite rows.
/// Document bodies stay as raw JSON here; typing happens above the gateway.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub body: serde_json::Value,
}
