// latest.rs — "Latest row wins" selection over an append log.
//
// Both gateway implementations read rows in append order and reduce them
// here, so the tie-break rule lives in one place: the row with the greatest
// `created_at` wins, and among equal timestamps the later append wins.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};

/// The latest row among `rows` (given in append order).
///
/// `Iterator::max_by_key` returns the *last* of several equal maxima, which
/// is exactly the append-order tie-break.
pub fn latest<'a, T, I, F>(rows: I, created_at: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.into_iter().max_by_key(|row| created_at(row))
}

/// The latest row per key, ordered by when each key was first seen.
pub fn latest_per_key<'a, T, K, I, KF, TF>(rows: I, key: KF, created_at: TF) -> Vec<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    TF: Fn(&T) -> DateTime<Utc>,
{
    let mut order: Vec<K> = Vec::new();
    let mut winners: HashMap<K, &'a T> = HashMap::new();

    for row in rows {
        let k = key(row);
        let replace = match winners.get(&k) {
            Some(current) => created_at(row) >= created_at(current),
            None => {
                order.push(key(row));
                true
            }
        };
        if replace {
            winners.insert(k, row);
        }
    }

    order
        .iter()
        .filter_map(|k| winners.get(k).copied())
        .collect()
}
