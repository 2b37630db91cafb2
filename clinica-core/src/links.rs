//! Response shaping
//!
//! Every entity returned by the API carries a `links` map describing where it
//! can be read, updated field by field, and deleted. Links are computed from
//! the entity on each response and never stored.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::{Account, Appointment, Consultation, Doctor, Patient};

/// Root of every resource path
pub const API_BASE: &str = "/api/medicineProject";

/// A single hyperlink descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(rename = "type")]
    pub method: &'static str,
}

impl Link {
    pub fn new(href: impl Into<String>, method: &'static str) -> Self {
        Self {
            href: href.into(),
            method,
        }
    }
}

pub type Links = BTreeMap<String, Link>;

/// An entity that can be rendered with hyperlinks
pub trait Shape: Serialize {
    /// Collection segment under [`API_BASE`], e.g. `doctors`
    const COLLECTION: &'static str;

    /// Field groups that have their own update endpoint
    const UPDATABLE: &'static [&'static str];

    /// Path of this entity, used for `self` and `delete`
    fn path(&self) -> String;

    /// Fields exposed to clients
    fn fields(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Path of the update endpoint for one field group
    fn update_path(&self, field: &str) -> String {
        format!("{}/{}", self.path(), field)
    }

    fn links(&self) -> Links {
        let path = self.path();
        let mut links = Links::new();
        links.insert("self".to_string(), Link::new(path.clone(), "GET"));
        for field in Self::UPDATABLE {
            links.insert(format!("update_{}", field), Link::new(self.update_path(field), "PUT"));
        }
        links.insert("delete".to_string(), Link::new(path, "DELETE"));
        links
    }
}

/// Render an entity as its fields plus a `links` map
pub fn shape<E: Shape>(entity: &E) -> Value {
    let mut body = match entity.fields() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let links = serde_json::to_value(entity.links()).unwrap_or_default();
    body.insert("links".to_string(), links);
    Value::Object(body)
}

/// Render a list as `{ "<collection>": [...] }`
pub fn shape_all<E: Shape>(entities: &[E]) -> Value {
    let items: Vec<Value> = entities.iter().map(shape).collect();
    let mut body = Map::new();
    body.insert(E::COLLECTION.to_string(), Value::Array(items));
    Value::Object(body)
}

/// Links attached to a rejected create: where to list and where to retry
pub fn collection_links(collection: &str, label: &str) -> Links {
    let href = format!("{}/{}", API_BASE, collection);
    let mut links = Links::new();
    links.insert(format!("view {}", collection), Link::new(href.clone(), "GET"));
    links.insert(format!("add new {}", label), Link::new(href, "POST"));
    links
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl Shape for Account {
    const COLLECTION: &'static str = "accounts";
    const UPDATABLE: &'static [&'static str] =
        &["last_name", "first_name", "user_name", "user_email", "password"];

    fn path(&self) -> String {
        format!("{}/{}/{}", API_BASE, Self::COLLECTION, self.id)
    }

    fn fields(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "last_name": self.last_name,
            "first_name": self.first_name,
            "user_name": self.user_name,
            "user_email": self.user_email,
        })
    }
}

impl Shape for Doctor {
    const COLLECTION: &'static str = "doctors";
    const UPDATABLE: &'static [&'static str] = &["name", "email", "phone_number", "speciality"];

    fn path(&self) -> String {
        format!("{}/{}/{}", API_BASE, Self::COLLECTION, self.id)
    }
}

impl Shape for Patient {
    const COLLECTION: &'static str = "patients";
    const UPDATABLE: &'static [&'static str] =
        &["name", "email", "phone_number", "age_and_birthday", "is_active"];

    fn path(&self) -> String {
        format!("{}/{}/{}", API_BASE, Self::COLLECTION, segment(&self.cnp))
    }
}

impl Shape for Appointment {
    const COLLECTION: &'static str = "appointments";
    const UPDATABLE: &'static [&'static str] = &["patient_id", "doctor_id", "date", "status"];

    fn path(&self) -> String {
        format!("{}/{}/{}", API_BASE, Self::COLLECTION, self.id)
    }
}

impl Shape for Consultation {
    const COLLECTION: &'static str = "consultations";
    const UPDATABLE: &'static [&'static str] = &["consultation"];

    /// Consultations are addressed by their natural key
    fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}",
            API_BASE,
            Self::COLLECTION,
            segment(&self.patient_id),
            self.doctor_id,
            segment(&self.date),
            segment(&self.diagnostic)
        )
    }

    /// The internal document id stays inside the store
    fn fields(&self) -> Value {
        serde_json::json!({
            "patient_id": self.patient_id,
            "doctor_id": self.doctor_id,
            "date": self.date,
            "diagnostic": self.diagnostic,
            "investigations": self.investigations,
        })
    }

    /// Updates replace the whole key through the collection endpoint
    fn update_path(&self, _field: &str) -> String {
        format!("{}/{}", API_BASE, Self::COLLECTION)
    }
}
