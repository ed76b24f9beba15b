// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence bridge contract.
//!
//! The boundary between the editor core and whatever host stores the
//! entry document: named field reads/writes, change subscriptions and
//! asset resolution. Implementations live in `memory` and `file`.

use crate::models::screen::ImageFile;
use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Field names of the persisted entry document.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const BACKGROUND: &str = "background";
    pub const ROLLOVER: &str = "rollover";
    pub const AREAS: &str = "areas";
    pub const SELECTED: &str = "selected";
}

pub type FieldValue = serde_json::Value;
pub type FieldListener = Box<dyn FnMut(Option<&FieldValue>)>;

/// Host-side storage of one entry document.
pub trait EntryStore {
    /// Synchronous read of a named field's current value.
    fn get_field(&self, name: &str) -> Option<FieldValue>;

    /// Write a field (`None` clears it). `Ok` means the host
    /// acknowledged the write.
    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<()>;

    /// Subscribe to external mutation of a field. Delivery stops when
    /// the returned handle is dropped.
    fn on_field_change(&mut self, name: &str, listener: FieldListener) -> FieldSubscription;
}

/// Resolves an opaque asset reference to concrete image details.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, asset_id: &str) -> Result<ImageFile>;
}

/// Per-field listener registry shared between a store and the
/// subscription handles it hands out.
#[derive(Default)]
pub struct ListenerTable {
    next_id: u64,
    by_field: HashMap<String, Vec<(u64, FieldListener)>>,
}

impl ListenerTable {
    /// Register a listener and return its scoped handle.
    pub fn subscribe(
        table: &Rc<RefCell<ListenerTable>>,
        field: &str,
        listener: FieldListener,
    ) -> FieldSubscription {
        let mut inner = table.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .by_field
            .entry(field.to_string())
            .or_default()
            .push((id, listener));
        FieldSubscription {
            table: Rc::downgrade(table),
            field: field.to_string(),
            id,
        }
    }

    /// Invoke every listener registered for a field.
    pub fn notify(&mut self, field: &str, value: Option<&FieldValue>) {
        if let Some(listeners) = self.by_field.get_mut(field) {
            for (_, listener) in listeners.iter_mut() {
                listener(value);
            }
        }
    }

    fn detach(&mut self, field: &str, id: u64) {
        if let Some(listeners) = self.by_field.get_mut(field) {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }
}

/// Scoped subscription handle; detaches its listener on drop so no
/// exit path can leak a registration.
pub struct FieldSubscription {
    table: Weak<RefCell<ListenerTable>>,
    field: String,
    id: u64,
}

impl Drop for FieldSubscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().detach(&self.field, self.id);
        }
    }
}
