//! Numeric helpers and skill-extraction quality metrics

use std::collections::HashSet;

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Precision, recall and F1 of extracted skills against a labelled set.
///
/// Inputs are treated as sets. Each value is rounded to two places.
pub fn precision_recall<S: AsRef<str>>(matched: &[S], actual: &[S]) -> (f64, f64, f64) {
    let matched: HashSet<&str> = matched.iter().map(AsRef::as_ref).collect();
    let actual: HashSet<&str> = actual.iter().map(AsRef::as_ref).collect();

    let true_positives = matched.intersection(&actual).count() as f64;
    let precision = true_positives / matched.len().max(1) as f64;
    let recall = true_positives / actual.len().max(1) as f64;
    let f1 = 2.0 * precision * recall / (precision + recall).max(0.01);

    (round2(precision), round2(recall), round2(f1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(47.8391), 47.84);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_precision_recall() {
        let (p, r, f) = precision_recall(&["python", "sql", "excel"], &["python", "sql"]);
        assert_eq!(p, 0.67);
        assert_eq!(r, 1.0);
        assert_eq!(f, 0.8);
    }

    #[test]
    fn test_precision_recall_duplicates_are_sets() {
        let (p, r, _) = precision_recall(&["python", "python"], &["python"]);
        assert_eq!((p, r), (1.0, 1.0));
    }

    #[test]
    fn test_precision_recall_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(precision_recall(&empty, &empty), (0.0, 0.0, 0.0));
        assert_eq!(precision_recall(&empty, &["python"]), (0.0, 0.0, 0.0));
    }
}
