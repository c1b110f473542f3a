// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Whole-list persistence.
//!
//! A saved list is a flat run of records in ascending key order. Each record
//! is the key's [`FixedCodec`] encoding immediately followed by the value's.
//! There is no header, length prefix or checksum, so the reader has to know
//! `K` and `V` up front. The end of the file is the only terminator.

use std::{
    fs::File,
    io,
    io::{
        BufReader,
        BufWriter,
        Read,
        Write,
    },
    path::Path,
};

use bytes::BytesMut;
use tracing::{
    debug,
    instrument,
    warn,
};

use crate::{
    encoding::FixedCodec,
    errs::SkipListError,
    skiplist::{
        Comparator,
        SkipList,
    },
};

impl<K, V, C> SkipList<K, V, C>
where
    K: FixedCodec,
    V: FixedCodec,
    C: Comparator<K>,
{
    /// Write every entry to `path`, replacing whatever was there.
    ///
    /// The list stays read-locked while the file is written. On an I/O error
    /// the file is left partially written.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SkipListError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        let mut buf = BytesMut::with_capacity(K::ENCODED_SIZE + V::ENCODED_SIZE);
        let mut written = 0usize;

        self.try_for_each(|key, value| -> io::Result<()> {
            buf.clear();
            key.encode(&mut buf);
            value.encode(&mut buf);
            writer.write_all(&buf)?;
            written += 1;
            Ok(())
        })?;
        writer.flush()?;

        debug!(records = written, "saved skiplist");
        Ok(())
    }

    /// Replace the contents of the list with the records in `path`, returning
    /// the resulting size.
    ///
    /// The list is cleared before the first record is read. If reading stops
    /// on anything other than a clean end of file, the records read so far
    /// stay in the list and the error carries how many were inserted.
    /// Duplicate keys in the file keep their first occurrence.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<usize, SkipListError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        self.clear();

        let mut record = vec![0u8; K::ENCODED_SIZE + V::ENCODED_SIZE];
        let mut inserted = 0usize;
        let mut dropped = 0usize;

        loop {
            let entry = match read_record(&mut reader, &mut record) {
                | Ok(false) => break,
                | Ok(true) => <(K, V)>::decode(&record),
                | Err(e) => Err(e),
            };
            let (key, value) = match entry {
                | Ok(kv) => kv,
                | Err(source) => return Err(SkipListError::Load { inserted, source }),
            };

            if self.insert(key, value) {
                inserted += 1;
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!(dropped, "dropped duplicate records");
        }
        let size = self.size();
        debug!(records = inserted, size, "loaded skiplist");
        Ok(size)
    }
}

/// Fill `buf` with the next record. `Ok(false)` means the stream ended cleanly
/// on a record boundary; ending part way through a record is an
/// [`io::ErrorKind::UnexpectedEof`] error.
fn read_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            | Ok(0) if filled == 0 => return Ok(false),
            | Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("truncated record: {filled} of {} bytes", buf.len()),
                ))
            },
            | Ok(n) => filled += n,
            | Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            | Err(e) => return Err(e),
        }
    }
    Ok(filled > 0)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::{
        seq::SliceRandom,
        thread_rng,
    };
    use tempfile::tempdir;

    use super::*;
    use crate::config::SkipListConfig;

    const RECORD: usize = 12; // u32 key + u64 value

    fn populated(keys: &[u32]) -> SkipList<u32, u64> {
        let list = SkipList::new();
        for &k in keys {
            list.insert(k, k as u64 * 100);
        }
        list
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.bin");

        let mut keys: Vec<u32> = (0..1_000).map(|i| i * 7).collect();
        keys.shuffle(&mut thread_rng());
        let list = populated(&keys);
        let expected = list.entries();

        list.save(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), (keys.len() * RECORD) as u64);

        list.clear();
        assert!(list.is_empty());

        assert_eq!(list.load(&path).unwrap(), keys.len());
        assert_eq!(list.entries(), expected);
        list.assert_invariants();
    }

    #[test]
    fn test_load_into_fresh_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.bin");
        populated(&[3, 1, 2]).save(&path).unwrap();

        let other = SkipList::<u32, u64>::with_config(SkipListConfig::new(4, 0.25)).unwrap();
        other.insert(99, 0);
        assert_eq!(other.load(&path).unwrap(), 3);
        assert_eq!(other.keys(), vec![1, 2, 3]);
    }

    #[test]
    fn test_byte_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.bin");

        let list = SkipList::<u32, u16>::new();
        list.insert(2, 0x1400);
        list.insert(1, 0x0a00);
        list.save(&path).unwrap();

        assert_eq!(
            fs::read(&path).unwrap(),
            vec![1, 0, 0, 0, 0x00, 0x0a, 2, 0, 0, 0, 0x00, 0x14]
        );
    }

    #[test]
    fn test_save_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        let list = SkipList::<u32, u64>::new();
        list.save(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        assert_eq!(list.load(&path).unwrap(), 0);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.bin");

        populated(&(0..100).collect::<Vec<_>>()).save(&path).unwrap();
        populated(&[5]).save(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), RECORD as u64);
    }

    #[test]
    fn test_save_to_missing_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("list.bin");
        assert!(matches!(
            populated(&[1]).save(&path),
            Err(SkipListError::Io(_))
        ));
    }

    #[test]
    fn test_load_missing_file_keeps_contents() {
        let dir = tempdir().unwrap();
        let list = populated(&[1, 2]);
        assert!(matches!(
            list.load(dir.path().join("missing.bin")),
            Err(SkipListError::Io(_))
        ));
        assert_eq!(list.size(), 2);
    }

    #[test]
    fn test_load_truncated_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.bin");
        populated(&[10, 20, 30]).save(&path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 5);
        fs::write(&path, bytes).unwrap();

        let list = SkipList::<u32, u64>::new();
        match list.load(&path) {
            | Err(SkipListError::Load { inserted, source }) => {
                assert_eq!(inserted, 2);
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            },
            | other => panic!("expected a load error, got {other:?}"),
        }
        assert_eq!(list.keys(), vec![10, 20]);
    }

    #[test]
    fn test_load_drops_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dups.bin");

        let mut bytes = BytesMut::new();
        for (k, v) in [(7u32, 1u64), (3, 2), (7, 3)] {
            k.encode(&mut bytes);
            v.encode(&mut bytes);
        }
        fs::write(&path, &bytes).unwrap();

        let list = SkipList::<u32, u64>::new();
        assert_eq!(list.load(&path).unwrap(), 2);
        assert_eq!(list.entries(), vec![(3, 2), (7, 1)]);
    }

    #[test]
    fn test_load_invalid_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chars.bin");

        let mut bytes = BytesMut::new();
        1u8.encode(&mut bytes);
        'a'.encode(&mut bytes);
        2u8.encode(&mut bytes);
        0xd800u32.encode(&mut bytes);
        fs::write(&path, &bytes).unwrap();

        let list = SkipList::<u8, char>::new();
        match list.load(&path) {
            | Err(SkipListError::Load { inserted, source }) => {
                assert_eq!(inserted, 1);
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            },
            | other => panic!("expected a load error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_record_boundaries() {
        let mut buf = [0u8; 4];
        let mut empty: &[u8] = &[];
        assert!(!read_record(&mut empty, &mut buf).unwrap());

        let mut exact: &[u8] = &[1, 2, 3, 4];
        assert!(read_record(&mut exact, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
        assert!(!read_record(&mut exact, &mut buf).unwrap());

        let mut short: &[u8] = &[1, 2];
        let err = read_record(&mut short, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
