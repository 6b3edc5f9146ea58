use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::DGError;
use crate::grid::column::{ColumnSet, FilterKind};
use crate::grid::record::{Record, Value};

/// One active per-column condition. Text predicates match on the value's
/// string form, range predicates on its numeric form.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    Text { needle: String },
    Range { min: Option<f64>, max: Option<f64> },
}

impl ColumnPredicate {
    /// Parse filter-line input for a column of the given kind.
    ///
    /// Empty input clears the predicate. Number columns accept `a..b`,
    /// `a..`, `..b` or a bare number (an exact match). Rejected input
    /// leaves whatever predicate was active before untouched; the caller
    /// only applies the `Ok` results.
    pub fn parse(kind: FilterKind, input: &str) -> Result<Option<ColumnPredicate>, DGError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match kind {
            FilterKind::None => Err(DGError::InvalidFilterPredicate(
                "column does not accept filters".to_string(),
            )),
            FilterKind::Text => Ok(Some(ColumnPredicate::Text {
                needle: input.to_lowercase(),
            })),
            FilterKind::Number => {
                let (min, max) = match input.split_once("..") {
                    Some((low, high)) => (parse_bound(low)?, parse_bound(high)?),
                    None => {
                        let exact = parse_number(input)?;
                        (Some(exact), Some(exact))
                    }
                };
                if let (Some(low), Some(high)) = (min, max)
                    && low > high
                {
                    return Err(DGError::InvalidFilterPredicate(format!(
                        "empty range: {low} > {high}"
                    )));
                }
                Ok(Some(ColumnPredicate::Range { min, max }))
            }
        }
    }

    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            ColumnPredicate::Text { needle } => match value {
                Some(v) => v.to_string().to_lowercase().contains(needle),
                None => false,
            },
            ColumnPredicate::Range { min, max } => match value.and_then(Value::as_num) {
                Some(n) => min.is_none_or(|low| n >= low) && max.is_none_or(|high| n <= high),
                None => false,
            },
        }
    }
}

fn parse_bound(raw: &str) -> Result<Option<f64>, DGError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_number(raw)?))
}

fn parse_number(raw: &str) -> Result<f64, DGError> {
    raw.trim()
        .parse()
        .map_err(|_| DGError::InvalidFilterPredicate(format!("not a number: \"{raw}\"")))
}

/// The combined filter condition: an optional global query plus any number
/// of per-column predicates, all of which must hold.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    query: String,
    by_column: HashMap<String, ColumnPredicate>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.by_column.is_empty()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Install or (with `None`) drop the predicate of one column.
    pub fn set_column(&mut self, key: &str, predicate: Option<ColumnPredicate>) {
        match predicate {
            Some(p) => {
                self.by_column.insert(key.to_string(), p);
            }
            None => {
                self.by_column.remove(key);
            }
        }
    }

    pub fn column(&self, key: &str) -> Option<&ColumnPredicate> {
        self.by_column.get(key)
    }

    pub fn active_columns(&self) -> usize {
        self.by_column.len()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.by_column.clear();
    }
}

/// Reduce the store to the indices of records passing the global query and
/// every active predicate. Non-destructive; the indices come back in store
/// order, so an empty filter is the identity.
pub fn apply(records: &[Record], state: &FilterState, columns: &ColumnSet) -> Vec<usize> {
    if state.is_empty() {
        return (0..records.len()).collect();
    }

    let query = state.query.trim().to_lowercase();
    // Predicates keyed to columns without a bound field cannot match
    // anything concrete; they are skipped rather than wiping the view.
    let predicates: Vec<(&str, &ColumnPredicate)> = state
        .by_column
        .iter()
        .filter_map(|(key, predicate)| columns.field_of(key).map(|field| (field, predicate)))
        .collect();

    let mut matches: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| {
            (query.is_empty() || matches_query(record, &query))
                && predicates
                    .iter()
                    .all(|(field, predicate)| predicate.matches(record.get(field)))
        })
        .map(|(idx, _)| idx)
        .collect();
    // Store order independent of how the scan was scheduled.
    matches.sort_unstable();
    matches
}

fn matches_query(record: &Record, query: &str) -> bool {
    record
        .fields()
        .any(|(_, value)| value.to_string().to_lowercase().contains(query))
}
