use std::cmp::Ordering;

use shared::domain::{NonValue, NonValuePlacement, OptionEntry, OptionValue, ValueOrdering};

/// Total order over option tokens. Under `Natural`, numeric tokens rank ahead
/// of all other tokens and compare by magnitude; the rest compare as text.
pub fn compare_values(a: &OptionValue, b: &OptionValue, ordering: ValueOrdering) -> Ordering {
    let text = || a.as_str().cmp(b.as_str());
    match ordering {
        ValueOrdering::Lexicographic => text(),
        ValueOrdering::Natural => match (parse_number(a), parse_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y).then_with(text),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => text(),
        },
    }
}

fn parse_number(value: &OptionValue) -> Option<f64> {
    value
        .as_str()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn compare_labels(a: &OptionEntry, b: &OptionEntry) -> Ordering {
    a.label.to_lowercase().cmp(&b.label.to_lowercase())
}

/// Stable order of `entries` by value.
pub fn order_by_value(
    entries: &[OptionEntry],
    non_value: &NonValue,
    ordering: ValueOrdering,
    placement: NonValuePlacement,
) -> Vec<OptionValue> {
    order_with(entries, non_value, placement, |a, b| {
        compare_values(&a.value, &b.value, ordering)
    })
}

/// Stable, case-insensitive order of `entries` by label.
pub fn order_by_label(
    entries: &[OptionEntry],
    non_value: &NonValue,
    placement: NonValuePlacement,
) -> Vec<OptionValue> {
    order_with(entries, non_value, placement, compare_labels)
}

fn order_with(
    entries: &[OptionEntry],
    non_value: &NonValue,
    placement: NonValuePlacement,
    compare: impl Fn(&OptionEntry, &OptionEntry) -> Ordering,
) -> Vec<OptionValue> {
    let mut sorted: Vec<&OptionEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        if placement == NonValuePlacement::Pinned {
            match (non_value.matches(&a.value), non_value.matches(&b.value)) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
        compare(a, b)
    });
    sorted.into_iter().map(|e| e.value.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[&str]) -> Vec<OptionValue> {
        raw.iter().map(|v| OptionValue::from(*v)).collect()
    }

    fn entries(raw: &[(&str, &str)]) -> Vec<OptionEntry> {
        raw.iter().map(|(l, v)| OptionEntry::new(*l, *v)).collect()
    }

    #[test]
    fn natural_ordering_compares_numbers_numerically() {
        let entries = entries(&[("Ten", "10"), ("Two", "2"), ("None", "-1"), ("One", "1")]);
        let order = order_by_value(
            &entries,
            &NonValue::default(),
            ValueOrdering::Natural,
            NonValuePlacement::Sorted,
        );
        assert_eq!(order, values(&["-1", "1", "2", "10"]));
    }

    #[test]
    fn lexicographic_ordering_compares_raw_tokens() {
        let entries = entries(&[("Ten", "10"), ("Two", "2"), ("None", "-1"), ("One", "1")]);
        let order = order_by_value(
            &entries,
            &NonValue::default(),
            ValueOrdering::Lexicographic,
            NonValuePlacement::Sorted,
        );
        assert_eq!(order, values(&["-1", "1", "10", "2"]));
    }

    #[test]
    fn pinned_sentinel_stays_first_even_when_it_sorts_last() {
        let non_value = NonValue {
            label: "Please Choose".into(),
            value: OptionValue::from("zzz"),
        };
        let entries = entries(&[("B", "b"), ("Please Choose", "zzz"), ("A", "a")]);
        let order = order_by_value(
            &entries,
            &non_value,
            ValueOrdering::Natural,
            NonValuePlacement::Pinned,
        );
        assert_eq!(order, values(&["zzz", "a", "b"]));
    }

    #[test]
    fn numeric_tokens_rank_ahead_of_text_tokens() {
        let cmp = |a: &str, b: &str| compare_values(&a.into(), &b.into(), ValueOrdering::Natural);
        assert_eq!(cmp("10", "abc"), Ordering::Less);
        assert_eq!(cmp("1a", "9"), Ordering::Greater);
        assert_eq!(cmp("9", "10"), Ordering::Less);
        assert_eq!(cmp("10", "1a"), Ordering::Less);
        assert_eq!(cmp("1.0", "1"), Ordering::Greater);
        assert_eq!(cmp("1a", "1b"), Ordering::Less);
    }

    #[test]
    fn mixed_pool_sorts_into_a_consistent_order() {
        let entries: Vec<OptionEntry> = (0..120)
            .map(|i| {
                let value = if i % 2 == 0 { format!("{i}") } else { format!("{i}x") };
                OptionEntry::new(format!("Option {i}"), value)
            })
            .collect();
        let order = order_by_value(
            &entries,
            &NonValue::default(),
            ValueOrdering::Natural,
            NonValuePlacement::Sorted,
        );
        assert_eq!(order.len(), 120);
        for pair in order.windows(2) {
            assert_ne!(
                compare_values(&pair[0], &pair[1], ValueOrdering::Natural),
                Ordering::Greater,
                "{} sorted ahead of {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(order[0], OptionValue::from("0"));
        assert_eq!(order[59], OptionValue::from("118"));
        assert_eq!(order[60], OptionValue::from("101x"));
    }

    #[test]
    fn label_ordering_ignores_case() {
        let entries = entries(&[("banana", "1"), ("Apple", "2"), ("None", "-1"), ("cherry", "3")]);
        let order = order_by_label(&entries, &NonValue::default(), NonValuePlacement::Pinned);
        assert_eq!(order, values(&["-1", "2", "1", "3"]));
    }
}
