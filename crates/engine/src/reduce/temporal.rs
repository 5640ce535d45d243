//! Temporal narrowing: keep the most recent N time buckets.

use super::{Applied, choose_candidate};
use crate::token::TokenEstimator;
use chrono::{Datelike, NaiveDate};
use datasift_core::{Result, Table, TimeBucket};
use std::collections::BTreeSet;

/// Sortable bucket key: (year, ordinal/week/month).
type BucketKey = (i32, u32);

fn bucket_key(date: NaiveDate, bucket: TimeBucket) -> BucketKey {
    match bucket {
        TimeBucket::Day => (date.year(), date.ordinal()),
        TimeBucket::Week => {
            let week = date.iso_week();
            (week.year(), week.week())
        }
        TimeBucket::Month => (date.year(), date.month()),
    }
}

fn bucket_label(bucket: TimeBucket) -> &'static str {
    match bucket {
        TimeBucket::Day => "day",
        TimeBucket::Week => "week",
        TimeBucket::Month => "month",
    }
}

pub(super) fn apply(
    table: &Table,
    estimator: &TokenEstimator,
    limit: usize,
    column: &str,
    bucket: TimeBucket,
    windows: &[usize],
) -> Result<Applied> {
    let idx = table.require_column(column)?;
    let keys: Vec<Option<BucketKey>> = table
        .column_values(idx)
        .map(|v| v.as_date().map(|d| bucket_key(d, bucket)))
        .collect();

    // most recent first
    let distinct: Vec<BucketKey> = keys
        .iter()
        .flatten()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();

    let footprint = estimator.footprint(table)?;
    let kept_rows = |window: usize| -> Option<Vec<usize>> {
        if window >= distinct.len() {
            return None;
        }
        let cutoff = distinct[window - 1];
        Some(
            keys.iter()
                .enumerate()
                .filter(|(_, k)| k.is_some_and(|k| k >= cutoff))
                .map(|(i, _)| i)
                .collect(),
        )
    };
    let fits = |window: usize| match kept_rows(window) {
        Some(rows) => estimator.tokens(footprint.rows_chars(rows)) <= limit,
        None => estimator.tokens(footprint.total_chars()) <= limit,
    };

    let window = choose_candidate(windows, fits);
    let label = bucket_label(bucket);
    Ok(match kept_rows(window) {
        Some(rows) => Applied {
            table: table.with_rows(&rows),
            detail: format!(
                "kept most recent {window} of {} {label} buckets in '{column}'",
                distinct.len()
            ),
        },
        None => Applied {
            table: table.clone(),
            detail: format!(
                "window of {window} {label}s covers all {} buckets in '{column}'",
                distinct.len()
            ),
        },
    })
}
