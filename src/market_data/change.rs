/// Percent change from the previous good price to the current one,
/// rounded to 2 decimal places.
///
/// Returns 0.0 when no usable previous price exists (first observation,
/// or a non-positive previous value) and clamps a non-finite result to
/// 0.0 so display state never carries NaN or infinity.
pub fn percent_change(previous: Option<f64>, current: f64) -> f64 {
    let Some(prev) = previous else {
        return 0.0;
    };
    if prev <= 0.0 {
        return 0.0;
    }
    let change = ((current - prev) / prev) * 100.0;
    if !change.is_finite() {
        return 0.0;
    }
    (change * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_zero() {
        assert_eq!(percent_change(None, 3500.0), 0.0);
    }

    #[test]
    fn non_positive_previous_is_zero() {
        assert_eq!(percent_change(Some(0.0), 3500.0), 0.0);
        assert_eq!(percent_change(Some(-1.0), 3500.0), 0.0);
    }

    #[test]
    fn rounds_to_two_decimal_places() {
        // ((3550 - 3500) / 3500) * 100 = 1.4285…
        assert_eq!(percent_change(Some(3500.0), 3550.0), 1.43);
    }

    #[test]
    fn negative_moves_round_away_from_zero() {
        // ((3450 - 3500) / 3500) * 100 = -1.4285…
        assert_eq!(percent_change(Some(3500.0), 3450.0), -1.43);
        assert_eq!(percent_change(Some(800.0), 798.0), -0.25);
    }

    #[test]
    fn exact_moves_are_exact() {
        assert_eq!(percent_change(Some(3500.0), 3570.0), 2.0);
        assert_eq!(percent_change(Some(0.65), 0.65), 0.0);
    }

    #[test]
    fn non_finite_results_are_clamped() {
        assert_eq!(percent_change(Some(1.0), f64::NAN), 0.0);
        assert_eq!(percent_change(Some(1.0), f64::INFINITY), 0.0);
    }
}
