use index::{BackendConfig, FingerprintIndex, FingerprintStore, IndexError};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn redb_config(dir: &TempDir) -> BackendConfig {
    BackendConfig::redb(dir.path().join("corpus.redb").to_string_lossy().into_owned())
}

#[test]
fn entries_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let index = FingerprintIndex::new(&redb_config(&dir)).unwrap();
        index
            .upsert("7301", "https://example.com/7301", Some("first"), &[0.6, 0.8])
            .unwrap();
        index.flush().unwrap();
    }
    let index = FingerprintIndex::new(&redb_config(&dir)).unwrap();
    assert_eq!(index.len().unwrap(), 1);
    let entry = index.entry("7301").unwrap().unwrap();
    assert_eq!(entry.url, "https://example.com/7301");
    assert_eq!(entry.title.as_deref(), Some("first"));
    assert_eq!(entry.vector, vec![0.6, 0.8]);
}

#[test]
fn overwrite_is_total_on_disk() {
    let dir = TempDir::new().unwrap();
    let index = FingerprintIndex::new(&redb_config(&dir)).unwrap();
    index.upsert("v", "https://a", Some("old"), &[1.0, 0.0]).unwrap();
    index.upsert("v", "https://b", None, &[0.0, 0.0, 1.0]).unwrap();

    let all = index.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].url, "https://b");
    assert_eq!(all[0].title, None);
    assert_eq!(all[0].vector.len(), 3);
}

#[test]
fn delete_removes_entry() {
    let dir = TempDir::new().unwrap();
    let index = FingerprintIndex::new(&redb_config(&dir)).unwrap();
    index.upsert("v", "u", None, &[1.0]).unwrap();
    index.delete("v").unwrap();
    assert!(index.is_empty().unwrap());
    assert_eq!(index.get("v").unwrap(), None);
}

#[test]
fn concurrent_writers_and_readers_see_whole_records() {
    let dir = TempDir::new().unwrap();
    let index = Arc::new(FingerprintIndex::new(&redb_config(&dir)).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for round in 0..10 {
                    let len = 1 + (t + round) % 5;
                    let v = vec![round as f32; len];
                    index.upsert("shared", &format!("url-{t}-{round}"), None, &v).unwrap();
                }
            })
        })
        .collect();
    let reader = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for _ in 0..50 {
                match index.all() {
                    Ok(entries) => {
                        for e in entries {
                            assert!(!e.vector.is_empty());
                        }
                    }
                    Err(err) => panic!("reader saw {err:?}"),
                }
            }
        })
    };
    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();
    assert_eq!(index.len().unwrap(), 1);
}

#[test]
fn opening_a_directory_fails() {
    let dir = TempDir::new().unwrap();
    let cfg = BackendConfig::redb(dir.path().to_string_lossy().into_owned());
    assert!(matches!(
        FingerprintIndex::new(&cfg),
        Err(IndexError::Backend(_))
    ));
}
