//! In-memory store double for service tests

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::model::Consultation;
use crate::store::{DocumentStore, Filter, Record, RecordStore};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(String, String), Value>>,
    sequence: Mutex<i64>,
    consultations: Mutex<BTreeMap<String, Consultation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of kind `R`
    pub fn count<R: Record>(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .keys()
            .filter(|(kind, _)| kind == R::KIND)
            .count()
    }
}

impl RecordStore for MemoryStore {
    fn get<R: Record>(&self, key: &str) -> Result<Option<R>> {
        let records = self.records.lock().unwrap();
        match records.get(&(R::KIND.to_string(), key.to_string())) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn find<R: Record>(&self, filter: &Filter) -> Result<Vec<R>> {
        let records = self.records.lock().unwrap();
        let mut found = Vec::new();
        for ((kind, _), value) in records.iter() {
            if kind == R::KIND && filter.matches(value) {
                found.push(serde_json::from_value(value.clone())?);
            }
        }
        Ok(found)
    }

    fn insert<R: Record>(&self, mut record: R) -> Result<R> {
        if R::GENERATED_KEY {
            let mut sequence = self.sequence.lock().unwrap();
            *sequence += 1;
            record.assign_key(*sequence);
        }
        let value = serde_json::to_value(&record)?;
        self.records
            .lock()
            .unwrap()
            .insert((R::KIND.to_string(), record.key()), value);
        Ok(record)
    }

    fn update<R: Record>(&self, record: &R) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let slot = (R::KIND.to_string(), record.key());
        if !records.contains_key(&slot) {
            return Ok(false);
        }
        records.insert(slot, serde_json::to_value(record)?);
        Ok(true)
    }

    fn delete<R: Record>(&self, key: &str) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        Ok(records
            .remove(&(R::KIND.to_string(), key.to_string()))
            .is_some())
    }
}

impl DocumentStore for MemoryStore {
    fn insert_consultation(&self, consultation: &Consultation) -> Result<()> {
        self.consultations
            .lock()
            .unwrap()
            .insert(consultation.id.clone(), consultation.clone());
        Ok(())
    }

    fn find_consultations(&self, filter: &Filter) -> Result<Vec<Consultation>> {
        let consultations = self.consultations.lock().unwrap();
        let mut found = Vec::new();
        for consultation in consultations.values() {
            if filter.matches(&serde_json::to_value(consultation)?) {
                found.push(consultation.clone());
            }
        }
        Ok(found)
    }

    fn replace_consultation(&self, consultation: &Consultation) -> Result<bool> {
        let mut consultations = self.consultations.lock().unwrap();
        match consultations.get_mut(&consultation.id) {
            Some(slot) => {
                *slot = consultation.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_consultation(&self, id: &str) -> Result<bool> {
        Ok(self.consultations.lock().unwrap().remove(id).is_some())
    }
}
