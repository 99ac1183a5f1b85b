//! Tests for Store
//!
//! These tests verify:
//! - Basic get/put/delete operations
//! - Crash recovery from the WAL
//! - Write atomicity (failed append leaves the index untouched)
//! - No-op deletes never reach the log
//! - Concurrent access patterns
//! - Store lifecycle (open/close)

use std::fs;
use std::path::PathBuf;
use std::thread;

use durakv::config::Config;
use durakv::store::Store;
use durakv::wal::MAX_PAYLOAD_SIZE;
use durakv::DuraError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, PathBuf, Store) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");
    let store = Store::open_path(&log_path).unwrap();
    (temp_dir, log_path, store)
}

fn log_len(path: &PathBuf) -> u64 {
    fs::metadata(path).unwrap().len()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("fresh.wal");
    assert!(!log_path.exists());

    let _store = Store::open_path(&log_path).unwrap();

    assert!(log_path.exists());
}

#[test]
fn test_put_get() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("hello", "world").unwrap();
    let result = store.get("hello").unwrap();

    assert_eq!(result, "world");
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, _path, store) = setup_temp_store();

    let result = store.get("nonexistent");

    assert!(matches!(result.unwrap_err(), DuraError::KeyNotFound));
}

#[test]
fn test_put_overwrite() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key", "value1").unwrap();
    store.put("key", "value2").unwrap();

    assert_eq!(store.get("key").unwrap(), "value2");
}

#[test]
fn test_delete() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key", "value").unwrap();
    assert_eq!(store.get("key").unwrap(), "value");

    store.delete("key").unwrap();
    assert!(matches!(store.get("key").unwrap_err(), DuraError::KeyNotFound));
}

#[test]
fn test_delete_nonexistent_key() {
    let (_temp, path, store) = setup_temp_store();

    store.put("other", "value").unwrap();
    let len_before = log_len(&path);

    // A delete for an absent key is refused and must not pollute the log
    let result = store.delete("nonexistent");

    assert!(matches!(result.unwrap_err(), DuraError::KeyNotFound));
    assert_eq!(log_len(&path), len_before);
}

#[test]
fn test_put_after_delete_resurrects() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key", "first").unwrap();
    store.delete("key").unwrap();
    store.put("key", "second").unwrap();

    assert_eq!(store.get("key").unwrap(), "second");
}

#[test]
fn test_multiple_keys() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key1", "value1").unwrap();
    store.put("key2", "value2").unwrap();
    store.put("key3", "value3").unwrap();

    assert_eq!(store.get("key1").unwrap(), "value1");
    assert_eq!(store.get("key2").unwrap(), "value2");
    assert_eq!(store.get("key3").unwrap(), "value3");
    assert_eq!(store.len(), 3);
}

// =============================================================================
// Crash Recovery Tests
// =============================================================================

#[test]
fn test_recovery_from_wal() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    // First store - write data, then drop without closing (simulating crash)
    {
        let store = Store::open_path(&log_path).unwrap();

        store.put("key1", "value1").unwrap();
        store.put("key2", "value2").unwrap();
        store.delete("key1").unwrap();
        store.put("key3", "value3").unwrap();

        drop(store);
    }

    // Second store - should recover from WAL
    {
        let store = Store::open_path(&log_path).unwrap();

        assert!(matches!(store.get("key1").unwrap_err(), DuraError::KeyNotFound)); // Was deleted
        assert_eq!(store.get("key2").unwrap(), "value2");
        assert_eq!(store.get("key3").unwrap(), "value3");
    }
}

#[test]
fn test_no_data_loss_across_repeated_recovery() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    // Write, crash, recover, crash again, recover again
    {
        let store = Store::open_path(&log_path).unwrap();
        store.put("key", "value").unwrap();
        drop(store); // Crash
    }

    {
        let store = Store::open_path(&log_path).unwrap();
        assert_eq!(store.get("key").unwrap(), "value");
        drop(store); // Crash again without writing anything new
    }

    {
        let store = Store::open_path(&log_path).unwrap();
        assert_eq!(store.get("key").unwrap(), "value");
    }
}

#[test]
fn test_recovery_tolerates_truncated_tail() {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    {
        let store = Store::open_path(&log_path).unwrap();
        store.put("key1", "value1").unwrap();
        store.put("key2", "value2").unwrap();
    }

    // Simulate a crash mid-append: garbage half-record at the tail
    {
        let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
        file.write_all(&[0u8; 7]).unwrap();
        file.sync_all().unwrap();
    }

    let store = Store::open_path(&log_path).unwrap();

    assert_eq!(store.get("key1").unwrap(), "value1");
    assert_eq!(store.get("key2").unwrap(), "value2");

    // The store remains writable after discarding the tail
    store.put("key3", "value3").unwrap();
    assert_eq!(store.get("key3").unwrap(), "value3");
}

#[test]
fn test_open_fails_on_corrupted_log() {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    {
        let store = Store::open_path(&log_path).unwrap();
        store.put("key1", "value1").unwrap();
        store.put("key2", "value2").unwrap();
    }

    // Flip a byte inside the first record: full-length damage, not a torn tail
    {
        let mut bytes = fs::read(&log_path).unwrap();
        bytes[20] ^= 0xFF;
        let mut file = fs::File::create(&log_path).unwrap();
        file.write_all(&bytes).unwrap();
        file.sync_all().unwrap();
    }

    let result = Store::open_path(&log_path);

    assert!(matches!(result.unwrap_err(), DuraError::Corruption(_)));
}

#[test]
fn test_open_fails_when_log_cannot_be_created() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("missing_dir").join("store.wal");

    let result = Store::open_path(&log_path);

    assert!(matches!(result.unwrap_err(), DuraError::Io(_)));
}

// =============================================================================
// Atomicity Tests
// =============================================================================

#[test]
fn test_failed_append_leaves_index_unchanged() {
    let (_temp, path, store) = setup_temp_store();

    store.put("existing", "value").unwrap();
    let len_before = log_len(&path);

    // An oversized record fails inside the append path before any byte is
    // written; the index must not reflect the attempted mutation
    let oversized = "x".repeat(MAX_PAYLOAD_SIZE as usize + 1);
    let result = store.put("too_big", &oversized);

    assert!(matches!(result.unwrap_err(), DuraError::Serialization(_)));
    assert!(matches!(store.get("too_big").unwrap_err(), DuraError::KeyNotFound));
    assert_eq!(log_len(&path), len_before);

    // The store is still usable afterwards
    store.put("next", "fine").unwrap();
    assert_eq!(store.get("next").unwrap(), "fine");
}

// =============================================================================
// Close/Lifecycle Tests
// =============================================================================

#[test]
fn test_close_then_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    {
        let store = Store::open_path(&log_path).unwrap();
        store.put("key", "value").unwrap();
        store.close().unwrap();
    }

    let store = Store::open_path(&log_path).unwrap();
    assert_eq!(store.get("key").unwrap(), "value");
}

#[test]
fn test_operations_after_close_fail() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key", "value").unwrap();
    store.close().unwrap();

    assert!(matches!(store.get("key").unwrap_err(), DuraError::StoreClosed));
    assert!(matches!(store.put("key", "other").unwrap_err(), DuraError::StoreClosed));
    assert!(matches!(store.delete("key").unwrap_err(), DuraError::StoreClosed));
}

#[test]
fn test_double_close_fails() {
    let (_temp, _path, store) = setup_temp_store();

    store.close().unwrap();

    assert!(matches!(store.close().unwrap_err(), DuraError::StoreClosed));
}

#[test]
fn test_open_path_convenience() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    let store = Store::open_path(&log_path).unwrap();

    store.put("key", "value").unwrap();
    assert_eq!(store.get("key").unwrap(), "value");
}

// =============================================================================
// Accessor Tests
// =============================================================================

#[test]
fn test_accessors() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");

    let config = Config::builder().log_path(&log_path).build();
    let store = Store::open(config).unwrap();

    assert_eq!(store.log_path(), log_path);
    assert_eq!(store.config().log_path, log_path);
    assert_eq!(store.len(), 0);
    assert!(store.is_empty());

    store.put("key", "value").unwrap();
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_reads() {
    use std::sync::Arc;

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");
    let store = Arc::new(Store::open_path(&log_path).unwrap());

    // Pre-populate data
    for i in 0..100 {
        store.put(&format!("key{}", i), &format!("value{}", i)).unwrap();
    }

    // Spawn multiple reader threads
    let mut handles = vec![];
    for _ in 0..4 {
        let store_clone = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key{}", i);
                let expected = format!("value{}", i);
                assert_eq!(store_clone.get(&key).unwrap(), expected);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writes_are_durable() {
    use std::sync::Arc;

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");
    let store = Arc::new(Store::open_path(&log_path).unwrap());

    // Spawn multiple writer threads on distinct keys
    let mut handles = vec![];
    for t in 0..4 {
        let store_clone = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let key = format!("thread{}_key{}", t, i);
                let value = format!("thread{}_value{}", t, i);
                store_clone.put(&key, &value).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Verify all writes landed in the live index
    for t in 0..4 {
        for i in 0..25 {
            let key = format!("thread{}_key{}", t, i);
            let expected = format!("thread{}_value{}", t, i);
            assert_eq!(store.get(&key).unwrap(), expected);
        }
    }

    // Every acknowledged write must also survive a reopen
    drop(store);
    let reopened = Store::open_path(&log_path).unwrap();
    assert_eq!(reopened.len(), 100);
    for t in 0..4 {
        for i in 0..25 {
            let key = format!("thread{}_key{}", t, i);
            let expected = format!("thread{}_value{}", t, i);
            assert_eq!(reopened.get(&key).unwrap(), expected);
        }
    }
}

#[test]
fn test_concurrent_mixed_readers_and_writers() {
    use std::sync::Arc;

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("store.wal");
    let store = Arc::new(Store::open_path(&log_path).unwrap());

    store.put("stable", "constant").unwrap();

    let mut handles = vec![];
    for t in 0..2 {
        let store_clone = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                store_clone
                    .put(&format!("w{}_{}", t, i), &format!("v{}_{}", t, i))
                    .unwrap();
            }
        }));
    }
    for _ in 0..4 {
        let store_clone = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                assert_eq!(store_clone.get("stable").unwrap(), "constant");
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 41);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_empty_key() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("", "empty_key_value").unwrap();
    assert_eq!(store.get("").unwrap(), "empty_key_value");
}

#[test]
fn test_empty_value() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("key", "").unwrap();
    assert_eq!(store.get("key").unwrap(), "");
}

#[test]
fn test_large_value() {
    let (_temp, _path, store) = setup_temp_store();

    let large_value = "v".repeat(100_000); // 100 KB
    store.put("large_key", &large_value).unwrap();

    assert_eq!(store.get("large_key").unwrap(), large_value);
}

#[test]
fn test_unicode_keys_and_values() {
    let (_temp, _path, store) = setup_temp_store();

    store.put("clé", "värde 🗄").unwrap();
    assert_eq!(store.get("clé").unwrap(), "värde 🗄");
}
