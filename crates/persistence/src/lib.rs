#![deny(warnings)]

//! Persistence layer: the saved-event library.
//!
//! Events are kept as one JSON list on disk. Saving an id that already
//! exists replaces it; the last write wins and there is no locking.

use chrono::NaiveDate;
use promo_core::{AttributeValue, ComparisonColumn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Returns the default location of the event library.
pub fn default_library_path() -> &'static str {
    "./saves/events.json"
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed event library: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid event {0}: {1}")]
    InvalidEvent(String, &'static str),
}

/// A trade promotion event saved to the library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedEvent {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub retailer: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Promoted shelf price, if the event changes price.
    #[serde(default)]
    pub promo_price: Option<Decimal>,
    /// Free-form metrics such as "Sales ROI" or "Volume Lift".
    #[serde(default)]
    pub metrics: BTreeMap<String, AttributeValue>,
}

impl SavedEvent {
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.id.trim().is_empty() {
            return Err(PersistenceError::InvalidEvent(self.id.clone(), "blank id"));
        }
        if self.name.trim().is_empty() {
            return Err(PersistenceError::InvalidEvent(self.id.clone(), "blank name"));
        }
        if self.end_date < self.start_date {
            return Err(PersistenceError::InvalidEvent(
                self.id.clone(),
                "end date before start date",
            ));
        }
        if matches!(self.promo_price, Some(p) if p < Decimal::ZERO) {
            return Err(PersistenceError::InvalidEvent(self.id.clone(), "negative price"));
        }
        Ok(())
    }

    /// Comparison column carrying the event's metrics and descriptive fields.
    ///
    /// Descriptive fields are written last, so a metric sharing one of their
    /// names cannot replace them.
    pub fn to_column(&self) -> ComparisonColumn {
        let mut col = ComparisonColumn::new(self.id.clone(), self.name.clone());
        col.attributes = self.metrics.clone();
        col = col
            .with("Brand", AttributeValue::Text(self.brand.clone()))
            .with("Retailer", AttributeValue::Text(self.retailer.clone()))
            .with("Duration (days)", AttributeValue::Number(Decimal::from(self.duration_days())));
        if let Some(p) = self.promo_price {
            col = col.with("Promo Price", AttributeValue::Number(p));
        }
        col
    }

    /// Length of the event in days, inclusive of both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// JSON-file backed list of saved events.
#[derive(Debug)]
pub struct EventLibrary {
    path: PathBuf,
    events: Vec<SavedEvent>,
}

impl EventLibrary {
    /// Load the library at `path`; a missing file is an empty library.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let events = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            Vec::new()
        };
        info!(path = %path.display(), events = events.len(), "event library opened");
        Ok(Self { path, events })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[SavedEvent] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&SavedEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Insert or replace by id, then write the whole library.
    ///
    /// The in-memory list only changes once the write succeeded.
    pub fn save(&mut self, event: SavedEvent) -> Result<(), PersistenceError> {
        event.validate()?;
        let mut next = self.events.clone();
        match next.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                debug!(id = %event.id, "replacing saved event");
                *slot = event;
            }
            None => {
                debug!(id = %event.id, "adding saved event");
                next.push(event);
            }
        }
        self.commit(next)
    }

    /// Remove by id. Returns whether an event was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, PersistenceError> {
        let next: Vec<SavedEvent> = self.events.iter().filter(|e| e.id != id).cloned().collect();
        if next.len() == self.events.len() {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Comparison columns for the selected ids, in selection order.
    /// Unknown ids are skipped.
    pub fn columns_for(&self, ids: &[&str]) -> Vec<ComparisonColumn> {
        ids.iter()
            .filter_map(|id| self.get(id))
            .map(SavedEvent::to_column)
            .collect()
    }

    fn commit(&mut self, events: Vec<SavedEvent>) -> Result<(), PersistenceError> {
        write_events(&self.path, &events)?;
        self.events = events;
        Ok(())
    }
}

fn write_events(path: &Path, events: &[SavedEvent]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(events)?)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), events = events.len(), "event library written");
    Ok(())
}
