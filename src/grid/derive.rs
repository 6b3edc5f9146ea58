use crate::grid::record::{Record, Value};

/// Display-side transformations of a raw field value. Derivations never
/// touch the stored records; sorting and filtering on the bound field
/// keep operating on the raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    /// "RM 64,950" style rendering with a thousands-grouped amount.
    Currency { prefix: String },
    /// Fraction of a fixed ceiling, for bar-style rendering.
    PercentOfCeiling { ceiling: f64 },
    /// One star per full rating point, with the numeric value appended.
    Stars,
    /// Two-state marker on a boolean field.
    Badge { on: String, off: String },
}

/// What a cell resolves to for presentation. `Text` covers raw and most
/// derived cells; the other shapes let the presentation layer pick its
/// own glyphs.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Text(String),
    Bar { percent: u8 },
    Marker { selected: bool },
}

impl Derivation {
    /// Resolve one cell. Pure, and total over malformed input: a missing
    /// or non-numeric source field degrades to the derivation's zero form
    /// instead of failing the render pass.
    pub fn resolve(&self, record: &Record, field: Option<&str>) -> DisplayValue {
        let value = field.and_then(|f| record.get(f));
        match self {
            Derivation::Currency { prefix } => {
                let amount = value.and_then(Value::as_num).unwrap_or(0.0);
                DisplayValue::Text(format!("{prefix} {}", thousands(amount.round() as i64)))
            }
            Derivation::PercentOfCeiling { ceiling } => {
                let amount = value.and_then(Value::as_num).unwrap_or(0.0);
                DisplayValue::Bar {
                    percent: percent_of(amount, *ceiling),
                }
            }
            Derivation::Stars => {
                let rating = value.and_then(Value::as_num).unwrap_or(0.0).max(0.0);
                let stars = "★".repeat(rating.floor() as usize);
                if stars.is_empty() {
                    DisplayValue::Text(format!("{rating}"))
                } else {
                    DisplayValue::Text(format!("{stars} {rating}"))
                }
            }
            Derivation::Badge { on, off } => {
                let state = matches!(value, Some(Value::Bool(true)));
                DisplayValue::Text(if state { on.clone() } else { off.clone() })
            }
        }
    }
}

fn percent_of(value: f64, ceiling: f64) -> u8 {
    if ceiling <= 0.0 {
        return 0;
    }
    (value / ceiling * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Group an integer amount with `,` every three digits.
fn thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency() -> Derivation {
        Derivation::Currency { prefix: "RM".into() }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(950), "950");
        assert_eq!(thousands(64950), "64,950");
        assert_eq!(thousands(125000), "125,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-64950), "-64,950");
    }

    #[test]
    fn currency_renders_prefix_and_grouped_amount() {
        let record = Record::new(1).with("price", 64950_i64);
        assert_eq!(
            currency().resolve(&record, Some("price")),
            DisplayValue::Text("RM 64,950".into())
        );
    }

    #[test]
    fn currency_degrades_to_zero_on_missing_or_non_numeric_input() {
        let record = Record::new(1).with("price", "n/a");
        let zero = DisplayValue::Text("RM 0".into());
        assert_eq!(currency().resolve(&record, Some("price")), zero);
        assert_eq!(currency().resolve(&record, Some("absent")), zero);
        assert_eq!(currency().resolve(&record, None), zero);
    }

    #[test]
    fn percent_of_ceiling_rounds_and_clamps() {
        let derive = Derivation::PercentOfCeiling { ceiling: 150_000.0 };
        let record = Record::new(1).with("price", 64950_i64);
        assert_eq!(
            derive.resolve(&record, Some("price")),
            DisplayValue::Bar { percent: 43 }
        );

        let record = Record::new(2).with("price", 400_000_i64);
        assert_eq!(
            derive.resolve(&record, Some("price")),
            DisplayValue::Bar { percent: 100 }
        );

        let record = Record::new(3);
        assert_eq!(
            derive.resolve(&record, Some("price")),
            DisplayValue::Bar { percent: 0 }
        );
    }

    #[test]
    fn zero_ceiling_never_divides() {
        let derive = Derivation::PercentOfCeiling { ceiling: 0.0 };
        let record = Record::new(1).with("price", 64950_i64);
        assert_eq!(
            derive.resolve(&record, Some("price")),
            DisplayValue::Bar { percent: 0 }
        );
    }

    #[test]
    fn stars_floor_the_rating_and_append_the_value() {
        let record = Record::new(1).with("rating", 4.8);
        assert_eq!(
            Derivation::Stars.resolve(&record, Some("rating")),
            DisplayValue::Text("★★★★ 4.8".into())
        );

        let record = Record::new(2).with("rating", 3.0);
        assert_eq!(
            Derivation::Stars.resolve(&record, Some("rating")),
            DisplayValue::Text("★★★ 3".into())
        );

        let record = Record::new(3);
        assert_eq!(
            Derivation::Stars.resolve(&record, Some("rating")),
            DisplayValue::Text("0".into())
        );
    }

    #[test]
    fn badge_is_on_only_for_true_booleans() {
        let derive = Derivation::Badge {
            on: "✓ Yes".into(),
            off: "✗ No".into(),
        };
        let on = DisplayValue::Text("✓ Yes".into());
        let off = DisplayValue::Text("✗ No".into());

        assert_eq!(derive.resolve(&Record::new(1).with("inStock", true), Some("inStock")), on);
        assert_eq!(derive.resolve(&Record::new(2).with("inStock", false), Some("inStock")), off.clone());
        // Missing and non-boolean fields read as off.
        assert_eq!(derive.resolve(&Record::new(3), Some("inStock")), off.clone());
        assert_eq!(derive.resolve(&Record::new(4).with("inStock", "yes"), Some("inStock")), off);
    }
}
