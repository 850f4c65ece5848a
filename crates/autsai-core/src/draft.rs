use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Edit buffer for a record: a snapshot taken when editing starts and a
/// working copy the form writes into. Committing hands back the working copy
/// and the fields that differ from the snapshot; discarding drops both.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
    original: T,
    working: T,
}

impl<T> Draft<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn begin(current: &T) -> Self {
        Self {
            original: current.clone(),
            working: current.clone(),
        }
    }

    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn get(&self) -> &T {
        &self.working
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.working
    }

    /// Merge top-level fields of `patch` into the working copy. `id` is never
    /// rewritten. On a type error the working copy is left as it was.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut merged = serde_json::to_value(&self.working)?;
        if let Some(object) = merged.as_object_mut() {
            for (key, value) in patch {
                if key != "id" {
                    object.insert(key.clone(), value.clone());
                }
            }
        }
        self.working = serde_json::from_value(merged)?;
        Ok(())
    }

    /// Fields whose serialized value differs from the snapshot.
    pub fn changes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let before = serde_json::to_value(&self.original)?;
        let after = serde_json::to_value(&self.working)?;

        let (Value::Object(before), Value::Object(after)) = (before, after) else {
            return Ok(Map::new());
        };

        Ok(after
            .into_iter()
            .filter(|(key, value)| before.get(key) != Some(value))
            .collect())
    }

    pub fn is_dirty(&self) -> Result<bool, serde_json::Error> {
        Ok(!self.changes()?.is_empty())
    }

    pub fn into_working(self) -> T {
        self.working
    }
}
