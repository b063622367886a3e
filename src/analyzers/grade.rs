/// Converts a quality signal (0.0–1.0) into a qualitative label.
///
/// | Range       | Label     |
/// |-------------|-----------|
/// | >= 0.95     | excellent |
/// | >= 0.85     | very good |
/// | >= 0.70     | good      |
/// | >= 0.50     | fair      |
/// | < 0.50      | poor      |
pub fn grade(p: f64) -> String {
    match p {
        p if p >= 0.95 => "excellent".into(),
        p if p >= 0.85 => "very good".into(),
        p if p >= 0.70 => "good".into(),
        p if p >= 0.50 => "fair".into(),
        _ => "poor".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(1.00), "excellent");
        assert_eq!(grade(0.95), "excellent");
        assert_eq!(grade(0.94), "very good");
        assert_eq!(grade(0.85), "very good");
        assert_eq!(grade(0.84), "good");
        assert_eq!(grade(0.70), "good");
        assert_eq!(grade(0.69), "fair");
        assert_eq!(grade(0.50), "fair");
        assert_eq!(grade(0.49), "poor");
        assert_eq!(grade(0.00), "poor");
    }
}
