/// Check whether two floats have a relative difference of at most 5e-9 times the larger value.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($val1:expr, $val2:expr, $msg:expr) => {{
        let a: f64 = $val1;
        let b: f64 = $val2;
        let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
        let relative_diff = (a - b).abs() / scale;
        assert!(relative_diff < 5e-9, "{}: {} vs {}", $msg, a, b);
    }};
}
