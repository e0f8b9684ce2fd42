use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?} at 1");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn input_is_clamped() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
    }
}

#[test]
fn linear_is_identity_and_default() {
    assert_eq!(Ease::default(), Ease::Linear);
    assert_eq!(Ease::Linear.apply(0.3), 0.3);
}
