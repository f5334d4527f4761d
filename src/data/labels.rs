//! Label encodings
//!
//! Binary labels arrive either as {0, 1} or as {-1, +1}. Every solver works
//! on {-1, +1}; `normalize` converts a whole label vector, `to_signed` a
//! single value.

use crate::core::{KMethodError, Result};

/// Convert a label vector to the {-1, +1} encoding
///
/// Exactly one of -1 or 0 must mark the negative class: 0 becomes -1,
/// every other value is kept. Labels already in {-1, +1} are returned
/// unchanged.
pub fn normalize(labels: &[f64]) -> Result<Vec<f64>> {
    if labels.is_empty() {
        return Err(KMethodError::EmptyDataset);
    }
    check_values(labels)?;

    let has_minus_one = labels.iter().any(|&y| y == -1.0);
    let has_zero = labels.iter().any(|&y| y == 0.0);

    match (has_minus_one, has_zero) {
        (true, true) => Err(KMethodError::InvalidLabels(
            "both -1 and 0 are used as the negative class".to_string(),
        )),
        (false, false) => Err(KMethodError::InvalidLabels(
            "no negative class marker (-1 or 0) found".to_string(),
        )),
        (true, false) => Ok(labels.to_vec()),
        (false, true) => Ok(labels
            .iter()
            .map(|&y| if y == 0.0 { -1.0 } else { y })
            .collect()),
    }
}

/// Swap the negative-class marker: -1 becomes 0 if present, otherwise 0 becomes -1
pub fn invert_encoding(labels: &[f64]) -> Result<Vec<f64>> {
    check_values(labels)?;
    if labels.iter().any(|&y| y == -1.0) {
        Ok(labels
            .iter()
            .map(|&y| if y == -1.0 { 0.0 } else { y })
            .collect())
    } else if labels.iter().any(|&y| y == 0.0) {
        Ok(labels
            .iter()
            .map(|&y| if y == 0.0 { -1.0 } else { y })
            .collect())
    } else {
        Err(KMethodError::InvalidLabels(
            "no negative class marker (-1 or 0) found".to_string(),
        ))
    }
}

/// Map an evaluation label vector to {-1, +1}
///
/// Unlike `normalize`, a vector holding a single class is accepted, but
/// mixing -1 and 0 as negative markers is still an error.
pub fn to_signed_all(labels: &[f64]) -> Result<Vec<f64>> {
    check_values(labels)?;
    if labels.contains(&-1.0) && labels.contains(&0.0) {
        return Err(KMethodError::InvalidLabels(
            "both -1 and 0 are used as the negative class".to_string(),
        ));
    }
    Ok(labels
        .iter()
        .map(|&y| if y == 1.0 { 1.0 } else { -1.0 })
        .collect())
}

/// Map a single label to {-1, +1}
pub fn to_signed(label: f64) -> Result<f64> {
    if label == 1.0 {
        Ok(1.0)
    } else if label == -1.0 || label == 0.0 {
        Ok(-1.0)
    } else {
        Err(KMethodError::InvalidLabels(format!(
            "expected -1, 0 or +1, got {label}"
        )))
    }
}

fn check_values(labels: &[f64]) -> Result<()> {
    match labels
        .iter()
        .find(|&&y| y != 1.0 && y != -1.0 && y != 0.0)
    {
        Some(bad) => Err(KMethodError::InvalidLabels(format!(
            "expected -1, 0 or +1, got {bad}"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_labels_unchanged() {
        let y = vec![1.0, -1.0, -1.0, 1.0];
        assert_eq!(normalize(&y).unwrap(), y);
        // idempotent
        assert_eq!(normalize(&normalize(&y).unwrap()).unwrap(), y);
    }

    #[test]
    fn test_zero_one_labels_mapped() {
        let y = vec![0.0, 1.0, 1.0, 0.0];
        assert_eq!(normalize(&y).unwrap(), vec![-1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_mixed_negative_markers_rejected() {
        let result = normalize(&[0.0, -1.0, 1.0]);
        assert!(matches!(result, Err(KMethodError::InvalidLabels(_))));
    }

    #[test]
    fn test_missing_negative_marker_rejected() {
        let result = normalize(&[1.0, 1.0]);
        assert!(matches!(result, Err(KMethodError::InvalidLabels(_))));
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let result = normalize(&[0.0, 2.0]);
        assert!(matches!(result, Err(KMethodError::InvalidLabels(_))));
    }

    #[test]
    fn test_empty_labels() {
        assert!(matches!(normalize(&[]), Err(KMethodError::EmptyDataset)));
    }

    #[test]
    fn test_invert_encoding() {
        assert_eq!(
            invert_encoding(&[-1.0, 1.0]).unwrap(),
            vec![0.0, 1.0]
        );
        assert_eq!(
            invert_encoding(&[0.0, 1.0]).unwrap(),
            vec![-1.0, 1.0]
        );
        assert!(invert_encoding(&[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_to_signed_all() {
        assert_eq!(to_signed_all(&[0.0, 1.0]).unwrap(), vec![-1.0, 1.0]);
        assert_eq!(to_signed_all(&[1.0, 1.0]).unwrap(), vec![1.0, 1.0]);
        assert_eq!(to_signed_all(&[-1.0]).unwrap(), vec![-1.0]);
        assert!(matches!(
            to_signed_all(&[-1.0, 0.0, 1.0]),
            Err(KMethodError::InvalidLabels(_))
        ));
        assert!(to_signed_all(&[3.0]).is_err());
    }

    #[test]
    fn test_to_signed() {
        assert_eq!(to_signed(0.0).unwrap(), -1.0);
        assert_eq!(to_signed(-1.0).unwrap(), -1.0);
        assert_eq!(to_signed(1.0).unwrap(), 1.0);
        assert!(to_signed(0.5).is_err());
    }
}
