//! The remote data gateway the screens talk to: auth, document collections
//! and object storage behind one trait.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use autsai_types::Collection;
use autsai_types::collection::Owner;
use autsai_types::api::User;

use crate::query::ListQuery;
use crate::storage::Storage;
use crate::Database;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: Collection, id: String },
    #[error("malformed record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Snapshot published to `auth_state` subscribers on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    pub upsert: bool,
}

pub trait Gateway: Send + Sync {
    /// `auth.me()`: the signed-in partner.
    fn me(&self) -> impl Future<Output = Result<User, GatewayError>> + Send;

    /// `auth.onAuthStateChanged()`: dropping the receiver unsubscribes.
    fn auth_state(&self) -> watch::Receiver<AuthState>;

    fn list(
        &self,
        collection: Collection,
        query: ListQuery,
    ) -> impl Future<Output = Result<Vec<Value>, GatewayError>> + Send;

    fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;

    /// Shallow-merge `patch` into the record with `id`.
    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;

    /// `storage.upload()`: returns the object's public URL.
    fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        options: UploadOptions,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// `list` decoded into typed records. One malformed record fails the call.
    fn list_as<T>(
        &self,
        collection: Collection,
        query: ListQuery,
    ) -> impl Future<Output = Result<Vec<T>, GatewayError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            self.list(collection, query)
                .await?
                .into_iter()
                .map(|record| serde_json::from_value(record).map_err(GatewayError::from))
                .collect()
        }
    }

    fn create_record<T>(
        &self,
        collection: Collection,
        record: &T,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send
    where
        T: Serialize + Sync,
    {
        let encoded = serde_json::to_value(record);
        async move { self.create(collection, encoded?).await }
    }
}

/// Gateway over the local SQLite document store and disk storage, scoped to
/// one signed-in partner.
pub struct LocalGateway {
    db: Arc<Database>,
    storage: Arc<Storage>,
    auth: watch::Sender<AuthState>,
}

impl LocalGateway {
    pub fn new(db: Arc<Database>, storage: Arc<Storage>) -> Self {
        let (auth, _) = watch::channel(AuthState {
            user: None,
            is_loading: true,
        });
        Self { db, storage, auth }
    }

    pub fn signed_in(db: Arc<Database>, storage: Arc<Storage>, user: User) -> Self {
        let gateway = Self::new(db, storage);
        gateway.sign_in(user);
        gateway
    }

    pub fn sign_in(&self, user: User) {
        self.auth.send_replace(AuthState {
            user: Some(user),
            is_loading: false,
        });
    }

    pub fn sign_out(&self) {
        self.auth.send_replace(AuthState {
            user: None,
            is_loading: false,
        });
    }
}

impl LocalGateway {
    async fn blocking<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?;
        Ok(result?)
    }

    /// Ids of the partner's own records in a partner-owned collection.
    async fn owned_ids(&self, collection: Collection, user_id: &str) -> Result<HashSet<String>, GatewayError> {
        let query = ListQuery::new().filter("user_id", user_id);
        let rows = self
            .blocking(move |db| db.list_documents(collection.as_str(), &query))
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Whether `record` belongs to `user_id`, directly or through its parent.
    async fn owns(&self, collection: Collection, record: &Value, user_id: &str) -> Result<bool, GatewayError> {
        match collection.owner() {
            Owner::Partner => Ok(record.get("user_id").and_then(Value::as_str) == Some(user_id)),
            Owner::Parent { collection: parent, field } => {
                let Some(parent_id) = record.get(field).and_then(Value::as_str) else {
                    return Ok(false);
                };
                Ok(self.owned_ids(parent, user_id).await?.contains(parent_id))
            }
            Owner::Shared => Ok(true),
        }
    }
}

/// Every call is scoped to the signed-in partner. Updates to a record they
/// don't own report not found.
impl Gateway for LocalGateway {
    async fn me(&self) -> Result<User, GatewayError> {
        self.auth.borrow().user.clone().ok_or(GatewayError::Unauthenticated)
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    async fn list(&self, collection: Collection, query: ListQuery) -> Result<Vec<Value>, GatewayError> {
        let user = self.me().await?;
        let query = match collection.owner() {
            Owner::Partner => query.filter("user_id", user.id.clone()),
            _ => query,
        };
        let mut rows = self
            .blocking(move |db| db.list_documents(collection.as_str(), &query))
            .await?;

        if let Owner::Parent { collection: parent, field } = collection.owner() {
            let owned = self.owned_ids(parent, &user.id).await?;
            rows.retain(|row| {
                row.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|id| owned.contains(id))
            });
        }

        debug!("list {} -> {} records", collection, rows.len());
        Ok(rows)
    }

    async fn create(&self, collection: Collection, mut record: Value) -> Result<Value, GatewayError> {
        let user = self.me().await?;
        let object = record
            .as_object_mut()
            .ok_or_else(|| anyhow::anyhow!("{} record is not an object", collection))?;
        if collection.owner() == Owner::Partner {
            object.insert("user_id".into(), Value::String(user.id.clone()));
        }
        let id = match object.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                object.insert("id".into(), Value::String(id.clone()));
                id
            }
        };

        if let Owner::Parent { collection: parent, field } = collection.owner() {
            if !self.owns(collection, &record, &user.id).await? {
                let parent_id = record.get(field).and_then(Value::as_str).unwrap_or_default();
                return Err(GatewayError::NotFound {
                    collection: parent,
                    id: parent_id.to_string(),
                });
            }
        }

        let body = record.clone();
        self.blocking(move |db| db.insert_document(collection.as_str(), &id, &body))
            .await?;
        Ok(record)
    }

    async fn update(&self, collection: Collection, id: &str, mut patch: Value) -> Result<Value, GatewayError> {
        let user = self.me().await?;
        let not_found = || GatewayError::NotFound {
            collection,
            id: id.to_string(),
        };

        let key = id.to_string();
        let existing = self
            .blocking(move |db| db.get_document(collection.as_str(), &key))
            .await?
            .ok_or_else(not_found)?;
        if !self.owns(collection, &existing.body, &user.id).await? {
            warn!("{} refused update of {} record {}", user.id, collection, id);
            return Err(not_found());
        }

        if let Some(fields) = patch.as_object_mut() {
            match collection.owner() {
                Owner::Partner => {
                    fields.remove("user_id");
                }
                Owner::Parent { field, .. } => {
                    fields.remove(field);
                }
                Owner::Shared => {}
            }
        }

        let key = id.to_string();
        let merged = self
            .blocking(move |db| db.patch_document(collection.as_str(), &key, &patch))
            .await?;
        merged.ok_or_else(not_found)
    }

    async fn upload(&self, bytes: Vec<u8>, path: &str, options: UploadOptions) -> Result<String, GatewayError> {
        self.storage
            .put(path, &bytes, options.upsert)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::query::Order;

    fn partner(id: &str) -> User {
        User { id: id.into(), email: format!("{}@sportsclub.com", id) }
    }

    async fn storage(name: &str) -> Arc<Storage> {
        let dir = std::env::temp_dir().join(format!("autsai_gateway_test_{}_{}", name, std::process::id()));
        Arc::new(Storage::new(dir, "http://localhost:3000").await.unwrap())
    }

    async fn gateway(name: &str) -> LocalGateway {
        let db = Arc::new(Database::open_in_memory().unwrap());
        LocalGateway::signed_in(db, storage(name).await, partner("u1"))
    }

    #[tokio::test]
    async fn me_follows_auth_state() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let gw = LocalGateway::new(db, storage("auth").await);
        let mut rx = gw.auth_state();
        assert!(rx.borrow().is_loading);
        assert!(matches!(gw.me().await, Err(GatewayError::Unauthenticated)));

        let user = User { id: "u1".into(), email: "carlos@sportsclub.com".into() };
        gw.sign_in(user.clone());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user.as_ref(), Some(&user));
        assert_eq!(gw.me().await.unwrap(), user);

        gw.sign_out();
        assert!(gw.me().await.is_err());
    }

    #[tokio::test]
    async fn create_assigns_missing_ids_and_update_merges() {
        let gw = gateway("crud").await;
        gw.create(Collection::Facilities, json!({"id": "fac_1", "name": "Club Norte"}))
            .await
            .unwrap();
        let created = gw
            .create(Collection::FacilityAmenities, json!({"facility_id": "fac_1", "amenity_name": "Parking"}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let merged = gw
            .update(Collection::FacilityAmenities, &id, json!({"is_available": 1}))
            .await
            .unwrap();
        assert_eq!(merged["amenity_name"], "Parking");
        assert_eq!(merged["is_available"], 1);

        let rows = gw
            .list(
                Collection::FacilityAmenities,
                ListQuery::new().filter("facility_id", "fac_1").order_by("amenity_name", Order::Asc),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![merged]);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let gw = gateway("missing").await;
        let err = gw
            .update(Collection::Bookings, "nope", json!({"status": "confirmed"}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_as_rejects_malformed_records() {
        let gw = gateway("typed").await;
        gw.create(Collection::Instructors, json!({"id": "i1", "name": "Carlos Rodriguez"}))
            .await
            .unwrap();

        let instructors: Vec<autsai_types::models::Instructor> =
            gw.list_as(Collection::Instructors, ListQuery::new()).await.unwrap();
        assert_eq!(instructors[0].name, "Carlos Rodriguez");

        gw.create(Collection::Instructors, json!({"id": "i2"})).await.unwrap();
        let result: Result<Vec<autsai_types::models::Instructor>, _> =
            gw.list_as(Collection::Instructors, ListQuery::new()).await;
        assert!(matches!(result, Err(GatewayError::Serialization(_))));
    }

    #[tokio::test]
    async fn partners_only_see_and_touch_their_own_records() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let files = storage("owners").await;
        let a = LocalGateway::signed_in(db.clone(), files.clone(), partner("a"));
        let b = LocalGateway::signed_in(db.clone(), files, partner("b"));

        let created = b
            .create(Collection::Bookings, json!({"id": "bk_b", "user_id": "a", "status": "pending"}))
            .await
            .unwrap();
        assert_eq!(created["user_id"], "b");
        b.create(Collection::Facilities, json!({"id": "fac_b", "name": "B Club"}))
            .await
            .unwrap();
        b.create(Collection::FacilityAmenities, json!({"id": "amn_b", "facility_id": "fac_b"}))
            .await
            .unwrap();

        assert!(a.list(Collection::Bookings, ListQuery::new()).await.unwrap().is_empty());
        assert!(
            a.list(Collection::FacilityAmenities, ListQuery::new().filter("facility_id", "fac_b"))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(b.list(Collection::Bookings, ListQuery::new()).await.unwrap().len(), 1);

        let err = a
            .update(Collection::Bookings, "bk_b", json!({"status": "canceled"}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
        assert!(a.update(Collection::FacilityAmenities, "amn_b", json!({"is_available": 1})).await.is_err());
        assert!(
            a.create(Collection::FacilitySports, json!({"id": "spt_a", "facility_id": "fac_b"}))
                .await
                .is_err()
        );
        assert_eq!(db.get_document("bookings", "bk_b").unwrap().unwrap().body["status"], "pending");

        let merged = b
            .update(Collection::Facilities, "fac_b", json!({"user_id": "a", "name": "Renamed"}))
            .await
            .unwrap();
        assert_eq!(merged["user_id"], "b");
        assert_eq!(merged["name"], "Renamed");
    }
}
