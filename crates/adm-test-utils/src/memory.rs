//! In-memory data integrator

use adm_form::{convert_str, json_to_form_string, CleanData, FieldValue, ValueKind};
use adm_panel::{DataIntegrator, IntegratorError, Record};
use adm_schema::ModelSchema;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Tables keyed by model name, rows keyed by primary key text
#[derive(Debug, Default)]
pub struct MemoryDataIntegrator {
    tables: RwLock<HashMap<String, IndexMap<String, Record>>>,
    failing: AtomicBool,
    failing_deletes: RwLock<HashSet<String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryDataIntegrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row as-is
    pub fn insert(&self, model: &ModelSchema, record: Record) {
        let key = row_key(model, &record).unwrap_or_default();
        self.tables
            .write()
            .entry(model.name.clone())
            .or_default()
            .insert(key, record);
    }

    /// Rows of a model in insertion order
    #[must_use]
    pub fn rows(&self, model: &ModelSchema) -> Vec<Record> {
        self.tables
            .read()
            .get(&model.name)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self, model: &ModelSchema) -> usize {
        self.tables.read().get(&model.name).map_or(0, IndexMap::len)
    }

    /// Make every call fail with a backend error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make deletes of one id fail
    pub fn fail_delete_of(&self, id: impl Into<FieldValue>) {
        self.failing_deletes.write().insert(id.into().to_form_string());
    }

    /// Number of read calls made so far
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of create/update/delete calls made so far
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), IntegratorError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(IntegratorError::backend("store unavailable"))
        } else {
            Ok(())
        }
    }

    fn read(&self) -> Result<(), IntegratorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn write(&self) -> Result<(), IntegratorError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()
    }
}

fn primary_key_name(model: &ModelSchema) -> Result<&str, IntegratorError> {
    model
        .primary_key
        .as_deref()
        .ok_or_else(|| IntegratorError::MissingPrimaryKey(model.name.clone()))
}

fn row_key(model: &ModelSchema, record: &Record) -> Result<String, IntegratorError> {
    let pk = primary_key_name(model)?;
    match record.get(pk) {
        None | Some(Value::Null) => Err(IntegratorError::MissingPrimaryKey(format!("{}.{pk}", model.name))),
        Some(value) => Ok(json_to_form_string(value)),
    }
}

fn project(record: &Record, fields: &[String]) -> Record {
    fields
        .iter()
        .filter_map(|f| record.get(f).map(|v| (f.clone(), v.clone())))
        .collect()
}

fn matches(record: &Record, term: &str, fields: &[String]) -> bool {
    let term = term.to_lowercase();
    fields.iter().any(|f| {
        record
            .get(f)
            .is_some_and(|v| json_to_form_string(v).to_lowercase().contains(&term))
    })
}

#[async_trait]
impl DataIntegrator for MemoryDataIntegrator {
    async fn fetch_all(&self, model: &ModelSchema) -> Result<Vec<Record>, IntegratorError> {
        self.read()?;
        Ok(self.rows(model))
    }

    async fn fetch_fields(&self, model: &ModelSchema, fields: &[String]) -> Result<Vec<Record>, IntegratorError> {
        self.read()?;
        Ok(self.rows(model).iter().map(|r| project(r, fields)).collect())
    }

    async fn fetch_fields_with_search(
        &self,
        model: &ModelSchema,
        fields: &[String],
        term: &str,
        search_fields: &[String],
    ) -> Result<Vec<Record>, IntegratorError> {
        self.read()?;
        Ok(self
            .rows(model)
            .iter()
            .filter(|r| matches(r, term, search_fields))
            .map(|r| project(r, fields))
            .collect())
    }

    async fn get_by_id(&self, model: &ModelSchema, id: &FieldValue) -> Result<Option<Record>, IntegratorError> {
        self.read()?;
        Ok(self
            .tables
            .read()
            .get(&model.name)
            .and_then(|t| t.get(&id.to_form_string()))
            .cloned())
    }

    async fn create(&self, model: &ModelSchema, values: &CleanData) -> Result<Record, IntegratorError> {
        self.write()?;
        let pk = primary_key_name(model)?.to_string();
        let mut record: Record = values.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();

        let mut tables = self.tables.write();
        let table = tables.entry(model.name.clone()).or_default();
        if record.get(&pk).map_or(true, Value::is_null) {
            let id = match model.primary_key_kind() {
                Some(ValueKind::Integer) => {
                    let next = table
                        .values()
                        .filter_map(|r| r.get(&pk).and_then(Value::as_i64))
                        .max()
                        .unwrap_or(0)
                        + 1;
                    Value::from(next)
                }
                Some(ValueKind::Identifier) => Value::String(uuid::Uuid::new_v4().to_string()),
                _ => return Err(IntegratorError::MissingPrimaryKey(pk)),
            };
            record.insert(pk.clone(), id);
        }

        let key = row_key(model, &record)?;
        if table.contains_key(&key) {
            return Err(IntegratorError::backend(format!("duplicate primary key '{key}'")));
        }
        table.insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, model: &ModelSchema, id: &FieldValue, values: &CleanData) -> Result<Record, IntegratorError> {
        self.write()?;
        let mut tables = self.tables.write();
        let record = tables
            .get_mut(&model.name)
            .and_then(|t| t.get_mut(&id.to_form_string()))
            .ok_or_else(|| IntegratorError::NotFound(id.to_string()))?;
        for (name, value) in values {
            record.insert(name.clone(), value.to_json());
        }
        Ok(record.clone())
    }

    async fn delete_by_id(&self, model: &ModelSchema, id: &FieldValue) -> Result<(), IntegratorError> {
        self.write()?;
        let key = id.to_form_string();
        if self.failing_deletes.read().contains(&key) {
            return Err(IntegratorError::backend(format!("row '{key}' is locked")));
        }
        self.tables
            .write()
            .get_mut(&model.name)
            .and_then(|t| t.shift_remove(&key))
            .map(|_| ())
            .ok_or_else(|| IntegratorError::NotFound(key))
    }

    fn primary_key_value(&self, model: &ModelSchema, record: &Record) -> Result<FieldValue, IntegratorError> {
        let raw = row_key(model, record)?;
        let kind = self.primary_key_kind(model)?;
        if kind == ValueKind::Opaque {
            return Ok(FieldValue::Text(raw));
        }
        convert_str(&raw, kind).map_err(|err| IntegratorError::backend(err.to_string()))
    }

    fn primary_key_kind(&self, model: &ModelSchema) -> Result<ValueKind, IntegratorError> {
        model
            .primary_key_kind()
            .ok_or_else(|| IntegratorError::MissingPrimaryKey(model.name.clone()))
    }
}
