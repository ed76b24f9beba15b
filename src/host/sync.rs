// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reconciliation between editor state and the host store.
//!
//! `EntrySync` diffs the committed area list against the last value
//! known to be persisted and writes only on change. `AssetCache` runs
//! fire-and-forget asset resolution on worker threads, tagging each
//! request with a sequence number so completions that were superseded
//! while in flight are discarded.

use super::bridge::{AssetResolver, EntryStore, FieldValue, fields};
use crate::models::area::{Area, AreaId};
use crate::models::screen::{ImageFile, Screen};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Change event delivered by a field subscription.
pub struct FieldEvent {
    pub field: &'static str,
    pub value: Option<FieldValue>,
}

/// Subscribe to a set of fields, funneling changes into one channel the
/// caller drains on its own schedule. Dropping the returned handles
/// detaches every listener.
pub fn subscribe_fields(
    store: &mut dyn EntryStore,
    names: &[&'static str],
) -> (Vec<super::bridge::FieldSubscription>, Receiver<FieldEvent>) {
    let (tx, rx) = channel();
    let subscriptions = names
        .iter()
        .map(|&field| {
            let tx: Sender<FieldEvent> = tx.clone();
            store.on_field_change(
                field,
                Box::new(move |value| {
                    let _ = tx.send(FieldEvent {
                        field,
                        value: value.cloned(),
                    });
                }),
            )
        })
        .collect();
    (subscriptions, rx)
}

/// Writes the committed area list (and the selected-area index) back to
/// the host, skipping writes when the serialized list is unchanged.
pub struct EntrySync {
    last_persisted: Option<String>,
}

impl EntrySync {
    /// Seed the last-persisted snapshot from the store's current value,
    /// so hydrating an existing entry does not trigger a write.
    pub fn seed(store: &dyn EntryStore) -> Self {
        let last_persisted = store
            .get_field(fields::AREAS)
            .and_then(|value| serde_json::from_value::<Vec<Area>>(value).ok())
            .and_then(|areas| serde_json::to_string(&areas).ok());
        Self { last_persisted }
    }

    /// Persist after a state transition. Returns whether a write was
    /// issued. The snapshot only advances once the host acknowledged
    /// both writes; on failure it stays stale and the next evaluation
    /// retries.
    pub fn persist(
        &mut self,
        store: &mut dyn EntryStore,
        screen: Option<&Screen>,
        selected: Option<&AreaId>,
    ) -> Result<bool> {
        let Some(screen) = screen else {
            return Ok(false);
        };

        let serialized = serde_json::to_string(&screen.areas)?;
        if self.last_persisted.as_deref() == Some(serialized.as_str()) {
            return Ok(false);
        }

        store.set_field(fields::AREAS, Some(serde_json::to_value(&screen.areas)?))?;

        let index = selected.and_then(|id| screen.areas.iter().position(|area| &area.id == id));
        store.set_field(fields::SELECTED, index.map(FieldValue::from))?;

        log::debug!(
            "persisted {} areas, selected index {:?}",
            screen.areas.len(),
            index
        );
        self.last_persisted = Some(serialized);
        Ok(true)
    }
}

/// Asset slots resolved through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetField {
    Background,
    Rollover,
}

impl AssetField {
    pub fn field_name(self) -> &'static str {
        match self {
            AssetField::Background => fields::BACKGROUND,
            AssetField::Rollover => fields::ROLLOVER,
        }
    }
}

struct Completion {
    field: AssetField,
    seq: u64,
    result: Result<ImageFile>,
}

/// Fire-and-forget asset resolution with per-field sequence numbers.
pub struct AssetCache {
    resolver: Arc<dyn AssetResolver>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_seq: u64,
    latest: HashMap<AssetField, u64>,
}

impl AssetCache {
    pub fn new(resolver: Arc<dyn AssetResolver>) -> Self {
        let (tx, rx) = channel();
        Self {
            resolver,
            tx,
            rx,
            next_seq: 0,
            latest: HashMap::new(),
        }
    }

    /// Issue a new sequence number for a field; any response carrying an
    /// older one is no longer the latest and will be discarded.
    fn begin(&mut self, field: AssetField) -> u64 {
        self.next_seq += 1;
        self.latest.insert(field, self.next_seq);
        self.next_seq
    }

    /// Resolve an asset id for a field on a worker thread.
    pub fn request(&mut self, field: AssetField, asset_id: &str) {
        let seq = self.begin(field);
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        let asset_id = asset_id.to_string();
        log::debug!("resolving {} asset {asset_id} (seq {seq})", field.field_name());
        std::thread::spawn(move || {
            let result = resolver.resolve(&asset_id);
            let _ = tx.send(Completion { field, seq, result });
        });
    }

    /// Mark a field's in-flight requests stale, e.g. after the field was
    /// cleared externally.
    pub fn invalidate(&mut self, field: AssetField) {
        self.begin(field);
    }

    /// Drain completed resolutions. `None` details mean the resolution
    /// failed and the field degrades to a "no image" state.
    pub fn poll(&mut self) -> Vec<(AssetField, Option<ImageFile>)> {
        let completions: Vec<Completion> = self.rx.try_iter().collect();
        completions
            .into_iter()
            .filter_map(|completion| self.admit(completion))
            .collect()
    }

    fn admit(&mut self, completion: Completion) -> Option<(AssetField, Option<ImageFile>)> {
        if self.latest.get(&completion.field) != Some(&completion.seq) {
            log::debug!(
                "discarding stale {} resolution (seq {})",
                completion.field.field_name(),
                completion.seq
            );
            return None;
        }
        match completion.result {
            Ok(details) => Some((completion.field, Some(details))),
            Err(error) => {
                log::warn!(
                    "{} asset resolution failed: {error:#}",
                    completion.field.field_name()
                );
                Some((completion.field, None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::bridge::{FieldListener, FieldSubscription};
    use crate::host::memory::MemoryEntry;
    use crate::models::area::{Point, PolygonLine};
    use anyhow::anyhow;
    use serde_json::json;

    /// Store wrapper that counts and optionally fails writes.
    struct CountingStore {
        inner: MemoryEntry,
        writes: usize,
        fail_next: bool,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryEntry::new(),
                writes: 0,
                fail_next: false,
            }
        }
    }

    impl EntryStore for CountingStore {
        fn get_field(&self, name: &str) -> Option<FieldValue> {
            self.inner.get_field(name)
        }

        fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<()> {
            if self.fail_next {
                self.fail_next = false;
                return Err(anyhow!("host rejected write"));
            }
            self.writes += 1;
            self.inner.set_field(name, value)
        }

        fn on_field_change(&mut self, name: &str, listener: FieldListener) -> FieldSubscription {
            self.inner.on_field_change(name, listener)
        }
    }

    fn screen_with_area() -> Screen {
        let mut screen = Screen::new();
        let mut area = Area::new();
        area.lines = vec![PolygonLine::closed(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
        )];
        screen.areas.push(area);
        screen
    }

    #[test]
    fn test_identical_list_persists_exactly_once() {
        let mut store = CountingStore::new();
        let mut sync = EntrySync::seed(&store);
        let screen = screen_with_area();

        assert!(sync.persist(&mut store, Some(&screen), None).unwrap());
        let writes_after_first = store.writes;
        assert!(!sync.persist(&mut store, Some(&screen), None).unwrap());
        assert_eq!(store.writes, writes_after_first);
    }

    #[test]
    fn test_no_screen_means_no_write() {
        let mut store = CountingStore::new();
        let mut sync = EntrySync::seed(&store);
        assert!(!sync.persist(&mut store, None, None).unwrap());
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_seeded_snapshot_skips_hydration_write() {
        let mut store = CountingStore::new();
        let screen = screen_with_area();
        store
            .set_field(fields::AREAS, Some(serde_json::to_value(&screen.areas).unwrap()))
            .unwrap();
        store.writes = 0;

        let mut sync = EntrySync::seed(&store);
        assert!(!sync.persist(&mut store, Some(&screen), None).unwrap());
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_selected_index_follows_area_position() {
        let mut store = CountingStore::new();
        let mut sync = EntrySync::seed(&store);
        let mut screen = screen_with_area();
        screen.areas.push(Area::new());
        let second = screen.areas[1].id.clone();

        sync.persist(&mut store, Some(&screen), Some(&second)).unwrap();
        assert_eq!(store.get_field(fields::SELECTED), Some(json!(1)));

        // Selection id not in the list: stored selection is cleared.
        screen.areas.remove(1);
        sync.persist(&mut store, Some(&screen), Some(&second)).unwrap();
        assert_eq!(store.get_field(fields::SELECTED), None);
    }

    #[test]
    fn test_failed_write_retries_on_next_evaluation() {
        let mut store = CountingStore::new();
        let mut sync = EntrySync::seed(&store);
        let screen = screen_with_area();

        store.fail_next = true;
        assert!(sync.persist(&mut store, Some(&screen), None).is_err());
        assert_eq!(store.get_field(fields::AREAS), None);

        // Snapshot stayed stale, so the same state persists now.
        assert!(sync.persist(&mut store, Some(&screen), None).unwrap());
        assert!(store.get_field(fields::AREAS).is_some());
    }

    struct NullResolver;

    impl AssetResolver for NullResolver {
        fn resolve(&self, _asset_id: &str) -> Result<ImageFile> {
            Err(anyhow!("unused"))
        }
    }

    fn details(name: &str) -> ImageFile {
        ImageFile {
            content_type: "image/png".to_string(),
            width: 1,
            height: 1,
            file_name: name.to_string(),
            url: name.to_string(),
        }
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut cache = AssetCache::new(Arc::new(NullResolver));
        let first = cache.begin(AssetField::Background);
        let second = cache.begin(AssetField::Background);

        let stale = cache.admit(Completion {
            field: AssetField::Background,
            seq: first,
            result: Ok(details("old.png")),
        });
        assert!(stale.is_none());

        let fresh = cache.admit(Completion {
            field: AssetField::Background,
            seq: second,
            result: Ok(details("new.png")),
        });
        assert_eq!(
            fresh,
            Some((AssetField::Background, Some(details("new.png"))))
        );
    }

    #[test]
    fn test_invalidate_supersedes_in_flight_request() {
        let mut cache = AssetCache::new(Arc::new(NullResolver));
        let seq = cache.begin(AssetField::Rollover);
        cache.invalidate(AssetField::Rollover);

        let admitted = cache.admit(Completion {
            field: AssetField::Rollover,
            seq,
            result: Ok(details("late.png")),
        });
        assert!(admitted.is_none());
    }

    #[test]
    fn test_failed_resolution_degrades_to_no_image() {
        let mut cache = AssetCache::new(Arc::new(NullResolver));
        let seq = cache.begin(AssetField::Background);
        let admitted = cache.admit(Completion {
            field: AssetField::Background,
            seq,
            result: Err(anyhow!("missing file")),
        });
        assert_eq!(admitted, Some((AssetField::Background, None)));
    }
}
