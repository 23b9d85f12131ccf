use std::cmp::Ordering;

/// Transient numeric coercion used by the sort comparator. Cells are never
/// stored as numbers; parsing happens per sort pass only.
pub fn try_parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Caseless string comparison standing in for locale collation: compare the
/// Unicode-lowercased forms first, then the raw cells so the ordering stays
/// total.
pub fn compare_strings(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Compare two cells under the column's resolved semantics. `numeric` must
/// come from [`column_is_numeric`] over the row set being sorted.
pub fn compare_cells(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        match (try_parse_number(a), try_parse_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => compare_strings(a, b),
        }
    } else {
        compare_strings(a, b)
    }
}

/// A column compares numerically only when every cell in the candidate row
/// set parses as a number; a single odd cell (including an empty one) makes
/// the whole column compare as strings. Deciding this per column keeps the
/// comparator a total order.
pub fn column_is_numeric<'a, I>(mut cells: I) -> bool
where
    I: Iterator<Item = &'a str>,
{
    cells.all(|cell| try_parse_number(cell).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_parse_number() {
        assert_eq!(try_parse_number("42"), Some(42.0));
        assert_eq!(try_parse_number("-3.25"), Some(-3.25));
        assert_eq!(try_parse_number("1e3"), Some(1000.0));
        assert_eq!(try_parse_number("  7 "), Some(7.0));
        assert_eq!(try_parse_number(""), None);
        assert_eq!(try_parse_number("   "), None);
        assert_eq!(try_parse_number("abc"), None);
        assert_eq!(try_parse_number("12abc"), None);
        // Non-finite values never win a numeric comparison
        assert_eq!(try_parse_number("inf"), None);
        assert_eq!(try_parse_number("NaN"), None);
    }

    #[test]
    fn test_compare_strings_caseless() {
        assert_eq!(compare_strings("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_strings("Apple", "apple"), Ordering::Less);
        assert_eq!(compare_strings("same", "same"), Ordering::Equal);
        // Lexicographic, not numeric
        assert_eq!(compare_strings("10", "2"), Ordering::Less);
    }

    #[test]
    fn test_compare_cells_numeric() {
        assert_eq!(compare_cells("2", "10", true), Ordering::Less);
        assert_eq!(compare_cells("2.5", "2.5", true), Ordering::Equal);
        assert_eq!(compare_cells("-1", "0", true), Ordering::Less);
    }

    #[test]
    fn test_column_is_numeric() {
        assert!(column_is_numeric(["1", "2.5", "-3"].into_iter()));
        assert!(!column_is_numeric(["1", "abc", "3"].into_iter()));
        assert!(!column_is_numeric(["1", "", "3"].into_iter()));
        // Empty column trivially numeric; sorting it is a no-op either way
        assert!(column_is_numeric(std::iter::empty()));
    }
}
