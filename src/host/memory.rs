// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory entry store.
//!
//! Backs the tests and the on-disk store; field writes are acknowledged
//! immediately and echoed to subscribers, matching the host SDK's
//! behavior of notifying all listeners including the writer.

use super::bridge::{EntryStore, FieldListener, FieldSubscription, FieldValue, ListenerTable};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Default)]
pub struct MemoryEntry {
    fields: BTreeMap<String, FieldValue>,
    listeners: Rc<RefCell<ListenerTable>>,
}

impl MemoryEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            fields,
            listeners: Rc::default(),
        }
    }

    /// All current fields, for document-level serialization.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }
}

impl EntryStore for MemoryEntry {
    fn get_field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<()> {
        match &value {
            Some(value) => {
                self.fields.insert(name.to_string(), value.clone());
            }
            None => {
                self.fields.remove(name);
            }
        }
        self.listeners
            .borrow_mut()
            .notify(name, value.as_ref());
        Ok(())
    }

    fn on_field_change(&mut self, name: &str, listener: FieldListener) -> FieldSubscription {
        ListenerTable::subscribe(&self.listeners, name, listener)
    }
}
