//! Sentence-window trimming
//!
//! Picks a window of exactly `max_length` tokens that keeps both
//! entities of a relation instance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a sentence cannot be trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CannotTrim {
    #[error("sentence of {length} tokens already fits in {max_length}")]
    WithinLimit { length: usize, max_length: usize },

    #[error("entities {distance} tokens apart cannot share a window of {max_length}")]
    EntitiesTooFarApart { distance: usize, max_length: usize },

    #[error("no window of {max_length} tokens contains positions {entity1} and {entity2}")]
    NoWindow {
        entity1: usize,
        entity2: usize,
        max_length: usize,
    },
}

/// A trimmed window with entity positions relative to its start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimmedWindow<'a, T> {
    /// Window start in the original sentence
    pub start: usize,
    pub tokens: &'a [T],
    pub entity1: usize,
    pub entity2: usize,
}

/// Select the `max_length` window holding both entities
///
/// Every start `i` whose window `[i, i + max_length - 1]` contains both
/// positions is scored `|left - right|`, with `left = entity1 - i` and
/// `right = -|entity2 - (i + max_length - 1)|`. The lowest score wins and
/// ties go to the lowest start. Positions are used exactly as passed, so
/// `entity1` may come after `entity2`.
pub fn trim_long_sentence<T>(
    sentence: &[T],
    max_length: usize,
    entity1: usize,
    entity2: usize,
) -> Result<TrimmedWindow<'_, T>, CannotTrim> {
    let length = sentence.len();
    if length <= max_length {
        return Err(CannotTrim::WithinLimit { length, max_length });
    }

    let distance = entity1.abs_diff(entity2);
    if distance >= max_length {
        return Err(CannotTrim::EntitiesTooFarApart {
            distance,
            max_length,
        });
    }

    let first = entity1.min(entity2);
    let last = entity1.max(entity2);
    let e1 = entity1 as isize;
    let e2 = entity2 as isize;

    let mut best: Option<(usize, isize)> = None;
    for start in 0..=(length - max_length) {
        let end = start + max_length - 1;
        if first < start || last > end {
            continue;
        }

        let left_margin = e1 - start as isize;
        let right_margin = -(e2 - end as isize).abs();
        let score = (left_margin - right_margin).abs();

        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((start, score));
        }
    }

    let (start, _) = best.ok_or(CannotTrim::NoWindow {
        entity1,
        entity2,
        max_length,
    })?;

    Ok(TrimmedWindow {
        start,
        tokens: &sentence[start..start + max_length],
        entity1: entity1 - start,
        entity2: entity2 - start,
    })
}
