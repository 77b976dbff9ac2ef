/// Extract a short type name from the full module path.
///
/// Given `"my_crate::some_module::MyType"`, returns `"MyType"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Round to two decimal places, the precision of reported scores.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimal places, used for recorded multipliers.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_strips_path() {
        assert_eq!(short_type_name("a::b::QualityFilter"), "QualityFilter");
        assert_eq!(short_type_name("Bare"), "Bare");
    }

    #[test]
    fn rounding_precision() {
        assert!((round2(3.14159) - 3.14).abs() < 1e-9);
        assert!((round2(-1.239) + 1.24).abs() < 1e-9);
        assert!((round3(0.6427) - 0.643).abs() < 1e-9);
    }
}
