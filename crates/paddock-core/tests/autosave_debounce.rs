mod common;

use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::time::Duration;

use common::FlakyStore;
use paddock_core::autosave::{AutosaveEvent, Autosaver};
use paddock_core::config::PaddockConfig;
use paddock_core::editor::SetupEditor;
use paddock_core::range::RangeValidator;
use paddock_core::setup::{EventCarId, SetupField, SetupStore};
use paddock_core::store::{Filter, MemoryStore, Query, Row, RowStore, StoreError, Table};

fn editor(backend: &Arc<FlakyStore>) -> (Arc<SetupStore>, SetupEditor) {
    let store = Arc::new(SetupStore::new(backend.clone()));
    let editor = SetupEditor::open(
        Arc::clone(&store),
        Arc::new(RangeValidator::default()),
        &PaddockConfig::default(),
        EventCarId::new("ec-1"),
    )
    .unwrap();
    (store, editor)
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_saves_once_with_last_state() {
    let backend = Arc::new(FlakyStore::new());
    let (store, mut editor) = editor(&backend);

    // t = 0, 100, 200 ms
    editor.set_extra("front.fl.pressure", 1.80).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    editor.set_extra("front.fl.pressure", 1.85).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    editor.set_extra("front.fl.pressure", 1.90).unwrap();

    // t = 999 ms: still quiet
    tokio::time::sleep(Duration::from_millis(799)).await;
    assert_eq!(backend.upsert_count(), 0);

    // t = 1001 ms: fired once
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(backend.upsert_count(), 1);

    let stored = store.load(&EventCarId::new("ec-1")).unwrap().unwrap();
    assert_eq!(stored.get_value("front.fl.pressure"), Some(1.90));

    let events = editor.poll_autosave();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], AutosaveEvent::Saved(_)));
    assert!(!editor.is_dirty());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(backend.upsert_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_is_not_debounced() {
    let backend = Arc::new(FlakyStore::new());
    let (_, mut editor) = editor(&backend);

    editor.set_field(SetupField::WingAngle, Some(12.0)).unwrap();
    editor.save().unwrap();
    assert_eq!(backend.upsert_count(), 1);

    // The pending autosave still fires independently and upserts the same row
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.upsert_count(), 2);
    assert_eq!(backend.inner.row_count(Table::EventCarSetup), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_failure_is_synchronous() {
    let backend = Arc::new(FlakyStore::new());
    let (_, mut editor) = editor(&backend);

    editor.set_field(SetupField::RideHeight, Some(45.0)).unwrap();
    editor.save().unwrap();
    let saved = editor.last_saved().cloned();

    backend.reject_writes(Table::EventCarSetup, true);
    editor.set_field(SetupField::RideHeight, Some(40.0)).unwrap();

    assert!(editor.save().is_err());
    assert_eq!(editor.last_saved().cloned(), saved);
    assert_eq!(editor.draft().fields.ride_height, Some(40.0));
    assert!(editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_autosave_reported_and_not_retried() {
    let backend = Arc::new(FlakyStore::new());
    backend.reject_writes(Table::EventCarSetup, true);
    let (_, mut editor) = editor(&backend);

    editor.set_extra("brakes.bias", 57.0).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let events = editor.poll_autosave();
    match events.as_slice() {
        [AutosaveEvent::Failed { event_car_id, patch, .. }] => {
            assert_eq!(event_car_id.as_str(), "ec-1");
            assert_eq!(patch.extras.get_value("brakes.bias"), Some(57.0));
        }
        other => panic!("Expected one failure, got {:?}", other),
    }
    assert_eq!(editor.last_saved(), None);

    // No retry storm: nothing else fires until the next edit
    backend.reject_writes(Table::EventCarSetup, false);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(editor.poll_autosave().is_empty());
    assert_eq!(backend.inner.row_count(Table::EventCarSetup), 0);

    editor.set_extra("brakes.bias", 58.0).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(matches!(
        editor.poll_autosave().as_slice(),
        [AutosaveEvent::Saved(_)]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_autosaver_replaces_pending_timer() {
    let backend = Arc::new(FlakyStore::new());
    let store = Arc::new(SetupStore::new(backend.clone()));
    let (autosaver, mut rx) = Autosaver::new(store, Duration::from_millis(800));
    let id = EventCarId::new("ec-9");

    for wing in [1.0, 2.0, 3.0, 4.0] {
        autosaver.schedule(
            id.clone(),
            paddock_core::setup::SetupPatch::new().field(SetupField::WingAngle, wing),
        );
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    match rx.recv().await {
        Some(AutosaveEvent::Saved(record)) => assert_eq!(record.fields.wing_angle, Some(4.0)),
        other => panic!("Expected Saved, got {:?}", other),
    }
    assert_eq!(backend.upsert_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overtaken_autosave_does_not_roll_back() {
    let backend = Arc::new(FlakyStore::new());
    let (store, mut editor) = editor(&backend);

    // Autosave persists A, but the editor has not polled yet
    editor.set_field(SetupField::WingAngle, Some(5.0)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.upsert_count(), 1);

    // B is saved by hand before the stale outcome is drained
    editor.set_field(SetupField::WingAngle, Some(9.0)).unwrap();
    editor.save().unwrap();

    let events = editor.poll_autosave();
    assert!(matches!(events.as_slice(), [AutosaveEvent::Saved(_)]));

    let stored = store.load(&EventCarId::new("ec-1")).unwrap().unwrap();
    assert_eq!(stored.fields.wing_angle, Some(9.0));
    assert_eq!(editor.last_saved().unwrap().fields.wing_angle, Some(9.0));
    assert_eq!(editor.draft().updated_at, stored.updated_at);
    assert!(!editor.is_dirty());
}

/// Upserts wait until the test releases them, or give up after two seconds
struct GatedStore {
    inner: MemoryStore,
    release: Mutex<std_mpsc::Receiver<()>>,
}

impl RowStore for GatedStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.inner.select(query)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.inner.insert(table, row)
    }

    fn update(&self, table: Table, filters: &[Filter], changes: Row) -> Result<usize, StoreError> {
        self.inner.update(table, filters, changes)
    }

    fn upsert(&self, table: Table, row: Row, conflict_column: &str) -> Result<Row, StoreError> {
        self.release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(2))
            .map_err(|_| StoreError::Unavailable("gate never opened".into()))?;
        self.inner.upsert(table, row, conflict_column)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        self.inner.delete(table, filters)
    }
}

#[tokio::test]
async fn test_autosave_write_does_not_block_the_runtime() {
    let (open_gate, release) = std_mpsc::channel();
    let backend = Arc::new(GatedStore {
        inner: MemoryStore::new(),
        release: Mutex::new(release),
    });
    let store = Arc::new(SetupStore::new(backend));
    let (autosaver, mut rx) = Autosaver::new(store, Duration::from_millis(10));

    autosaver.schedule(
        EventCarId::new("ec-1"),
        paddock_core::setup::SetupPatch::new().field(SetupField::WingAngle, 7.0),
    );

    // Single-threaded runtime: this only runs while the write is parked
    tokio::time::sleep(Duration::from_millis(100)).await;
    open_gate.send(()).unwrap();

    match rx.recv().await {
        Some(AutosaveEvent::Saved(record)) => assert_eq!(record.fields.wing_angle, Some(7.0)),
        other => panic!("Expected Saved, got {:?}", other),
    }
}
