//! Table Scan
//!
//! Chunked top-k similarity scan over the embedding table.

use std::cmp::Ordering;
use std::thread;

use crossbeam::channel;

use super::similarity::dot_product;
use super::table::EmbeddingTable;

/// Top `k` rows by dot product against `query`, as `(row, score)` pairs
/// in descending score order.
///
/// Small tables are scanned serially; above `parallel_threshold` rows the
/// scan is split across `workers` threads (0 = one per CPU core) which
/// each rank their own chunk and hand partial results back over a channel.
/// Both paths produce identical output: ties on equal scores resolve to
/// the lower row number.
pub(crate) fn top_k(
    table: &EmbeddingTable,
    query: &[f32],
    k: usize,
    workers: usize,
    parallel_threshold: usize,
) -> Vec<(usize, f32)> {
    let rows = table.len();
    let workers = if workers == 0 {
        num_cpus::get()
    } else {
        workers
    };

    if rows <= parallel_threshold || workers <= 1 {
        let scored = score_range(table, query, 0, rows);
        return rank(scored, k);
    }

    let chunk = rows.div_ceil(workers);
    let (tx, rx) = channel::unbounded();

    thread::scope(|s| {
        for (i, start) in (0..rows).step_by(chunk).enumerate() {
            let end = (start + chunk).min(rows);
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("scan-{}", i))
                .spawn_scoped(s, move || {
                    let partial = rank(score_range(table, query, start, end), k);
                    let _ = tx.send(partial);
                })
                .expect("failed to spawn scan thread");
        }
    });
    drop(tx);

    let mut merged = Vec::with_capacity(workers * k);
    for partial in rx.try_iter() {
        merged.extend(partial);
    }
    rank(merged, k)
}

/// Score a contiguous row range against the query
fn score_range(
    table: &EmbeddingTable,
    query: &[f32],
    start: usize,
    end: usize,
) -> Vec<(usize, f32)> {
    (start..end)
        .map(|row| (row, dot_product(query, table.row(row))))
        .collect()
}

/// Sort by score (descending), row number breaking ties, keep the top `k`
fn rank(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_table(rows: usize) -> EmbeddingTable {
        // Row i points along x with magnitude i+1, so raw-dot ranking
        // against [1, 0] is simply descending row order.
        let words = (0..rows).map(|i| format!("w{}", i)).collect();
        let values = (0..rows)
            .flat_map(|i| [(i + 1) as f32, 0.0])
            .collect();
        EmbeddingTable::new(words, values).unwrap()
    }

    #[test]
    fn test_serial_top_k() {
        let table = axis_table(10);
        let top = top_k(&table, &[1.0, 0.0], 3, 1, usize::MAX);
        let rows: Vec<usize> = top.iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![9, 8, 7]);
        assert!((top[0].1 - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let table = axis_table(257);
        let serial = top_k(&table, &[1.0, 0.0], 5, 1, usize::MAX);
        let parallel = top_k(&table, &[1.0, 0.0], 5, 4, 0);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_tie_break_prefers_lower_row() {
        let table = EmbeddingTable::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        let top = top_k(&table, &[1.0, 0.0], 2, 1, usize::MAX);
        assert_eq!(top[0].0, 0);
        assert_eq!(top[1].0, 1);
    }

    #[test]
    fn test_k_larger_than_table() {
        let table = axis_table(4);
        let top = top_k(&table, &[1.0, 0.0], 10, 1, usize::MAX);
        assert_eq!(top.len(), 4);
    }
}
