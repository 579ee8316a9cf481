//! CSV entry loader
//!
//! Reads an entry array from CSV with a header row. Columns are matched by
//! name: `ts`, `cpu`, `pid`, `event_id` are required; `offset`, `stream_id`,
//! `visible` and `next` are optional and may be omitted entirely.
//!
//! ```text
//! ts,cpu,pid,event_id,offset,stream_id,visible,next
//! 1000,0,42,7,0,0,255,3
//! 1005,1,17,7,64,0,255,
//! ```
//!
//! When the file carries no `next` links at all they are derived by
//! chaining entries recorded on the same CPU.

use crate::data::{Entry, TraceError, TraceResult};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Read entries from any CSV source
pub fn read_csv<R: Read>(reader: R) -> TraceResult<Vec<Entry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for record in reader.deserialize() {
        let entry: Entry = record?;
        entries.push(entry);
    }

    check_sorted(&entries)?;

    if entries.iter().all(|e| e.next.is_none()) {
        link_by_cpu(&mut entries);
    }

    Ok(entries)
}

/// Load entries from a CSV file
pub fn load_csv(path: &Path) -> TraceResult<Vec<Entry>> {
    let file = std::fs::File::open(path)?;
    let entries = read_csv(std::io::BufReader::new(file))?;

    tracing::info!("Loaded {} entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Verify that timestamps never decrease
pub fn check_sorted(entries: &[Entry]) -> TraceResult<()> {
    match entries.windows(2).position(|w| w[1].ts < w[0].ts) {
        Some(pos) => Err(TraceError::Unsorted { index: pos + 1 }),
        None => Ok(()),
    }
}

/// Point every entry at the next entry recorded on the same CPU
pub fn link_by_cpu(entries: &mut [Entry]) {
    let mut last_on_cpu: HashMap<i32, usize> = HashMap::new();

    for i in 0..entries.len() {
        entries[i].next = None;
        if let Some(prev) = last_on_cpu.insert(entries[i].cpu, i) {
            entries[prev].next = Some(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_full_columns() {
        let csv = "ts,cpu,pid,event_id,offset,stream_id,visible,next\n\
                   1000,0,42,7,0,0,255,2\n\
                   1005,1,17,7,64,1,2,\n\
                   1010,0,42,8,128,0,255,\n";

        let entries = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].next, Some(2));
        assert_eq!(entries[1].stream_id, 1);
        assert_eq!(entries[1].visible, 2);
        assert_eq!(entries[2].offset, 128);
    }

    #[test]
    fn test_read_minimal_columns_links_by_cpu() {
        let csv = "ts,cpu,pid,event_id\n\
                   1,0,1,0\n\
                   2,1,2,0\n\
                   3,0,3,0\n\
                   4,1,4,0\n";

        let entries = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].visible, 0xFF);
        assert_eq!(entries[0].next, Some(2));
        assert_eq!(entries[1].next, Some(3));
        assert_eq!(entries[2].next, None);
        assert_eq!(entries[3].next, None);
    }

    #[test]
    fn test_unsorted_rejected() {
        let csv = "ts,cpu,pid,event_id\n5,0,1,0\n3,0,1,0\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TraceError::Unsorted { index: 1 }));
    }

    #[test]
    fn test_bad_row() {
        let csv = "ts,cpu,pid,event_id\nabc,0,1,0\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TraceError::Csv(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ts,cpu,pid,event_id").unwrap();
        for i in 0..10 {
            writeln!(file, "{},{},{},0", 100 + i, i % 2, i).unwrap();
        }

        let entries = load_csv(file.path()).unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[9].ts, 109);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("/nonexistent/trace.csv")).unwrap_err();
        assert!(matches!(err, TraceError::Io(_)));
    }
}
