//! Integration tests for loading sidecars and resolving payloads.

use sidecar_index::{DataFile, Error, ReaderState, SidecarIndex, SidecarReader};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Write a data file made of the given payloads and a matching sidecar.
fn write_fixture(dir: &tempfile::TempDir, payloads: &[(&str, &[u8])]) -> (PathBuf, PathBuf) {
    let data_path = dir.path().join("db.data");
    let index_path = dir.path().join("db.index");

    let mut data = Vec::new();
    let mut sidecar = String::new();
    for (key, payload) in payloads {
        sidecar.push_str(&format!("{}\t{}\t{}\n", key, data.len(), payload.len()));
        data.extend_from_slice(payload);
    }

    fs::write(&data_path, data).unwrap();
    fs::write(&index_path, sidecar).unwrap();
    (index_path, data_path)
}

#[test]
fn test_payloads_resolve_by_position() {
    let dir = tempfile::tempdir().unwrap();
    let payloads: &[(&str, &[u8])] = &[
        ("AF-P00001-F1", &b"MKTAYIAKQR"[..]),
        ("AF-P00002-F1", &b""[..]),
        ("AF-P00003-F1", &b"GSHMLEDPVD\nEXTRA"[..]),
    ];
    let (index_path, data_path) = write_fixture(&dir, payloads);

    let index = SidecarIndex::load(&index_path).unwrap();
    let data = DataFile::open(&data_path).unwrap();

    assert_eq!(index.len(), payloads.len());
    for (i, (key, payload)) in payloads.iter().enumerate() {
        assert_eq!(index.key_at(i).unwrap(), *key);
        assert_eq!(data.payload(&index, i).unwrap(), *payload);
    }
}

#[test]
fn test_payload_out_of_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("db.index");
    let data_path = dir.path().join("db.data");
    fs::write(&index_path, "ok\t0\t4\nbad\t2\t100\n").unwrap();
    fs::write(&data_path, b"abcdef").unwrap();

    // Bad ranges load fine; they only fail when read
    let index = SidecarIndex::load(&index_path).unwrap();
    let data = DataFile::open(&data_path).unwrap();
    assert_eq!(index.len(), 2);

    assert_eq!(data.payload(&index, 0).unwrap(), b"abcd");
    assert!(matches!(
        data.payload(&index, 1),
        Err(Error::PayloadOutOfBounds {
            index: 1,
            offset: 2,
            length: 100,
            file_size: 6
        })
    ));
    assert!(matches!(
        data.payload(&index, 2),
        Err(Error::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_independent_readers_load_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let counts = [100usize, 2_000, 50, 7_500];

    let completed = Arc::new(AtomicUsize::new(0));
    let mut jobs = Vec::new();
    for (n, count) in counts.iter().enumerate() {
        let path = dir.path().join(format!("part{}.index", n));
        let contents: String = (0..*count)
            .map(|i| format!("p{}-{}\t{}\t{}\n", n, i, i * 10, i % 256))
            .collect();
        fs::write(&path, contents).unwrap();

        let reader = SidecarReader::new();
        let done = Arc::clone(&completed);
        let handle = reader
            .load_async(path, move |_| {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        jobs.push((reader, handle, *count));
    }

    for (n, (reader, handle, count)) in jobs.into_iter().enumerate() {
        let stats = handle.wait().unwrap();
        assert_eq!(stats.records, count);
        assert_eq!(reader.state(), ReaderState::Ready);
        assert_eq!(reader.size(), count);
        assert_eq!(reader.key_at(count - 1).unwrap(), format!("p{}-{}", n, count - 1));
        assert_eq!(reader.offset_at(count - 1).unwrap(), (count as u64 - 1) * 10);
    }
    assert_eq!(completed.load(Ordering::SeqCst), counts.len());
}

#[test]
fn test_async_load_rejects_second_request_while_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.index");
    let contents: String = (0..200_000).map(|i| format!("key{}\t{}\t1\n", i, i)).collect();
    fs::write(&path, contents).unwrap();

    let reader = SidecarReader::new();
    let handle = reader.load_async(path.clone(), |_| {}).unwrap();

    // Whatever the timing, a second request can never start a parallel load
    let second = reader.load(&path);
    assert!(matches!(
        second,
        Err(Error::LoadInProgress) | Err(Error::AlreadyLoaded)
    ));

    handle.wait().unwrap();
    assert_eq!(reader.size(), 200_000);
}

#[test]
fn test_reader_observes_nothing_or_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.index");
    let contents: String = (0..50_000).map(|i| format!("k{}\t{}\t{}\n", i, i, i)).collect();
    fs::write(&path, contents).unwrap();

    let reader = SidecarReader::new();
    let handle = reader.load_async(path, |_| {}).unwrap();

    while !handle.is_finished() {
        let size = reader.size();
        assert!(size == 0 || size == 50_000, "partial size {}", size);
        match reader.key_at(0) {
            Ok(key) => assert_eq!(key, "k0"),
            Err(Error::NotReady) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    handle.wait().unwrap();
    assert_eq!(reader.size(), 50_000);
}
