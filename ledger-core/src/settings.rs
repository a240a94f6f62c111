//! Key/value settings tab
//!
//! The settings tab is self-healing: before any read or write, a missing tab
//! is created and every required key that is absent is appended with its
//! default. Unknown keys are never removed.

use crate::{
    store::{CellRange, Row, StructuralRequest, ValueInput},
    Ledger, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Header row of the settings tab
pub const SETTINGS_HEADER: [&str; 2] = ["Key", "Value"];

/// Key of the shared access password
pub const PASSWORD_KEY: &str = "simple_password";

/// Keys that must always be present, with their defaults
pub const REQUIRED_SETTINGS: [(&str, &str); 6] = [
    (PASSWORD_KEY, "123456"),
    ("supplier_name", ""),
    ("supplier_ceo", ""),
    ("supplier_reg_no", ""),
    ("supplier_address", ""),
    ("supplier_phone", ""),
];

/// Flat settings map
pub type Settings = BTreeMap<String, String>;

/// One key/value write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingUpdate {
    /// Setting key
    pub key: String,
    /// New value
    pub value: String,
}

impl SettingUpdate {
    /// Build an update
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

fn is_header(index: usize, row: &Row) -> bool {
    index == 0 && row.first().map(String::as_str) == Some(SETTINGS_HEADER[0])
}

fn key_of(row: &Row) -> Option<&str> {
    row.first().map(String::as_str).filter(|k| !k.is_empty())
}

fn position_of(rows: &[Row], key: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .position(|(i, row)| !is_header(i, row) && key_of(row) == Some(key))
}

/// Rows to append so that the tab holds a header and every required key.
///
/// Pure and idempotent: applying the plan to `existing` yields rows for which
/// the plan is empty.
pub fn provisioning_plan(existing: &[Row]) -> Vec<Row> {
    let mut staged: Vec<Row> = Vec::new();
    if existing.is_empty() {
        staged.push(SETTINGS_HEADER.iter().map(|s| s.to_string()).collect());
    }
    for (key, default) in REQUIRED_SETTINGS {
        if position_of(existing, key).is_none() {
            staged.push(vec![key.to_string(), default.to_string()]);
        }
    }
    staged
}

/// Flatten settings rows into a map, header and keyless rows skipped.
///
/// A later duplicate key wins.
pub fn settings_from_rows(rows: &[Row]) -> Settings {
    rows.iter()
        .enumerate()
        .filter(|(i, row)| !is_header(*i, row))
        .filter_map(|(_, row)| {
            let key = key_of(row)?;
            let value = row.get(1).cloned().unwrap_or_default();
            Some((key.to_string(), value))
        })
        .collect()
}

impl Ledger {
    fn settings_range(&self) -> CellRange {
        CellRange::columns(&self.layout().settings_tab, 0, 1)
    }

    /// Make sure the settings tab exists and holds every required key.
    ///
    /// Returns the tab's rows as they stand after provisioning.
    pub async fn provision_settings(&self) -> Result<Vec<Row>> {
        let tab = &self.layout().settings_tab;
        if self.store().find_sheet(tab).await?.is_none() {
            info!("Creating settings tab {:?}", tab);
            self.store()
                .batch_update(vec![StructuralRequest::AddSheet { title: tab.clone() }])
                .await?;
        }

        let range = self.settings_range();
        let mut rows = self.store().read(&range).await?;
        let staged = provisioning_plan(&rows);
        if !staged.is_empty() {
            info!("Provisioning {} settings rows", staged.len());
            self.store()
                .append(&range, staged.clone(), ValueInput::Raw)
                .await?;
            rows.extend(staged);
        }
        Ok(rows)
    }

    /// All settings, defaults backfilled
    pub async fn get_settings(&self) -> Result<Settings> {
        let rows = self.provision_settings().await?;
        let settings = settings_from_rows(&rows);
        debug!("Loaded {} settings", settings.len());
        Ok(settings)
    }

    /// Overwrite existing keys in place and append new ones.
    ///
    /// One remote call per key: a failure midway leaves the earlier keys
    /// written.
    pub async fn update_settings(&self, updates: &[SettingUpdate]) -> Result<()> {
        let mut rows = self.provision_settings().await?;
        let tab = self.layout().settings_tab.clone();

        for update in updates {
            if update.key.is_empty() {
                warn!("Skipping settings update with empty key");
                continue;
            }
            match position_of(&rows, &update.key) {
                Some(index) => {
                    let cell = CellRange::cell(&tab, 1, index as u32 + 1);
                    debug!("Updating setting {} at {}", update.key, cell);
                    self.store()
                        .update(&cell, vec![vec![update.value.clone()]], ValueInput::Raw)
                        .await?;
                    let row = &mut rows[index];
                    row.resize(2, String::new());
                    row[1] = update.value.clone();
                }
                None => {
                    debug!("Appending new setting {}", update.key);
                    let row = vec![update.key.clone(), update.value.clone()];
                    self.store()
                        .append(&self.settings_range(), vec![row.clone()], ValueInput::Raw)
                        .await?;
                    rows.push(row);
                }
            }
        }
        Ok(())
    }

    /// Compare a candidate with the shared access password
    pub async fn verify_password(&self, candidate: &str) -> Result<bool> {
        let settings = self.get_settings().await?;
        Ok(settings.get(PASSWORD_KEY).map(String::as_str) == Some(candidate))
    }

    /// Replace the shared access password
    pub async fn update_password(&self, password: &str) -> Result<()> {
        info!("Updating shared access password");
        self.update_settings(&[SettingUpdate::new(PASSWORD_KEY, password)])
            .await
    }
}
