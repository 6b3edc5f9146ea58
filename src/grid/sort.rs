use std::cmp::Ordering;

use crate::grid::column::ColumnSet;
use crate::grid::record::{Record, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

/// The ordered list of active sort keys. Earlier keys take precedence;
/// later ones only break ties.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// The header-click gesture: ascending, then descending, then gone.
    /// The non-additive form drops every other key first; the additive
    /// form appends a new key after the existing ones.
    pub fn toggle(&mut self, column: &str, additive: bool) {
        if !additive {
            self.keys.retain(|k| k.column == column);
        }
        match self.keys.iter().position(|k| k.column == column) {
            Some(idx) => {
                if self.keys[idx].descending {
                    self.keys.remove(idx);
                } else {
                    self.keys[idx].descending = true;
                }
            }
            None => self.keys.push(SortKey {
                column: column.to_string(),
                descending: false,
            }),
        }
    }

    /// Precedence index and direction of a column's key, for header
    /// markers.
    pub fn position(&self, column: &str) -> Option<(usize, bool)> {
        self.keys
            .iter()
            .position(|k| k.column == column)
            .map(|idx| (idx, self.keys[idx].descending))
    }
}

/// Total order over optional cell values; absent fields sort after every
/// present value.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

// Numbers compare numerically across Int/Float, strings lexicographically
// and case-sensitively, booleans false < true. Mixed kinds fall back to a
// fixed kind rank (numbers, strings, booleans) to keep the order total.
fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => match (a.as_num(), b.as_num()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Int(_) | Value::Float(_) => 0,
        Value::Str(_) => 1,
        Value::Bool(_) => 2,
    }
}

/// Order a filtered index list by the active sort keys. The sort is
/// stable: records tying on every key keep their relative input order,
/// and with no keys at all the input comes back untouched.
pub fn apply(
    records: &[Record],
    mut indices: Vec<usize>,
    state: &SortState,
    columns: &ColumnSet,
) -> Vec<usize> {
    if state.is_empty() {
        return indices;
    }

    let fields: Vec<(Option<&str>, bool)> = state
        .keys
        .iter()
        .map(|k| (columns.field_of(&k.column), k.descending))
        .collect();

    indices.sort_by(|&a, &b| {
        for (field, descending) in &fields {
            let Some(field) = field else { continue };
            let ord = compare_values(records[a].get(field), records[b].get(field));
            let ord = if *descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::ColumnDescriptor;

    fn columns(fields: &[&str]) -> ColumnSet {
        ColumnSet::new(
            fields
                .iter()
                .map(|f| ColumnDescriptor {
                    field: Some(f.to_string()),
                    sortable: true,
                    ..Default::default()
                })
                .collect(),
        )
        .unwrap()
    }

    fn sorted_by(records: &[Record], state: &SortState, fields: &[&str]) -> Vec<i64> {
        let indices = (0..records.len()).collect();
        apply(records, indices, state, &columns(fields))
            .into_iter()
            .map(|i| records[i].id())
            .collect()
    }

    #[test]
    fn toggle_cycles_ascending_descending_removed() {
        let mut state = SortState::default();
        state.toggle("price", false);
        assert_eq!(state.position("price"), Some((0, false)));
        state.toggle("price", false);
        assert_eq!(state.position("price"), Some((0, true)));
        state.toggle("price", false);
        assert!(state.is_empty());
    }

    #[test]
    fn plain_toggle_replaces_other_keys_additive_appends() {
        let mut state = SortState::default();
        state.toggle("category", false);
        state.toggle("price", true);
        assert_eq!(state.position("category"), Some((0, false)));
        assert_eq!(state.position("price"), Some((1, false)));

        state.toggle("year", false);
        assert_eq!(state.keys().len(), 1);
        assert_eq!(state.position("year"), Some((0, false)));
        assert_eq!(state.position("price"), None);
    }

    #[test]
    fn numbers_sort_numerically_across_int_and_float() {
        let records = vec![
            Record::new(1).with("price", 33850_i64),
            Record::new(2).with("price", 4.5),
            Record::new(3).with("price", 125000_i64),
        ];
        let mut state = SortState::default();
        state.toggle("price", false);
        assert_eq!(sorted_by(&records, &state, &["price"]), vec![2, 1, 3]);

        state.toggle("price", false);
        assert_eq!(sorted_by(&records, &state, &["price"]), vec![3, 1, 2]);
    }

    #[test]
    fn ties_keep_their_incoming_order() {
        let records = vec![
            Record::new(1).with("year", 2023_i64).with("make", "Tesla"),
            Record::new(2).with("year", 2023_i64).with("make", "Ford"),
            Record::new(3).with("year", 2024_i64).with("make", "BMW"),
            Record::new(4).with("year", 2023_i64).with("make", "Honda"),
        ];
        let mut state = SortState::default();
        state.toggle("year", false);
        assert_eq!(sorted_by(&records, &state, &["year", "make"]), vec![1, 2, 4, 3]);
    }

    #[test]
    fn secondary_key_breaks_ties_only() {
        let records = vec![
            Record::new(1).with("category", "SUV").with("price", 75900_i64),
            Record::new(2).with("category", "Sedan").with("price", 29600_i64),
            Record::new(3).with("category", "SUV").with("price", 38900_i64),
            Record::new(4).with("category", "Sedan").with("price", 31900_i64),
        ];
        let mut state = SortState::default();
        state.toggle("category", false);
        state.toggle("price", true);
        assert_eq!(
            sorted_by(&records, &state, &["category", "price"]),
            vec![3, 1, 2, 4]
        );
    }

    #[test]
    fn missing_fields_sort_after_present_values() {
        let records = vec![
            Record::new(1),
            Record::new(2).with("price", 10_i64),
            Record::new(3).with("price", 5_i64),
        ];
        let mut state = SortState::default();
        state.toggle("price", false);
        assert_eq!(sorted_by(&records, &state, &["price"]), vec![3, 2, 1]);

        // Descending reverses the whole per-key comparison, absent cells
        // included.
        state.toggle("price", false);
        assert_eq!(sorted_by(&records, &state, &["price"]), vec![1, 2, 3]);
    }

    #[test]
    fn mixed_kinds_rank_numbers_strings_booleans() {
        let records = vec![
            Record::new(1).with("v", true),
            Record::new(2).with("v", "abc"),
            Record::new(3).with("v", 12_i64),
        ];
        let mut state = SortState::default();
        state.toggle("v", false);
        assert_eq!(sorted_by(&records, &state, &["v"]), vec![3, 2, 1]);
    }

    #[test]
    fn strings_compare_case_sensitively() {
        assert_eq!(
            compare_values(
                Some(&Value::Str("Tesla".into())),
                Some(&Value::Str("audi".into()))
            ),
            Ordering::Less
        );
    }
}
