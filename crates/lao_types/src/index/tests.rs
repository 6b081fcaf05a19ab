use super::*;

#[test]
fn test_classification_by_sign() {
    assert!(StackIndex::new(-1).is_from_top());
    assert!(!StackIndex::new(-1).is_from_bottom());
    assert!(StackIndex::new(3).is_from_bottom());
    assert!(!StackIndex::new(3).is_from_top());
}

#[test]
fn test_zero_is_neither_top_nor_bottom() {
    let zero = StackIndex::new(0);
    assert!(!zero.is_from_top());
    assert!(!zero.is_from_bottom());
}

#[test]
fn test_zero_never_resolves() {
    for depth in [0, 1, 5, i32::MAX] {
        assert_eq!(StackIndex::new(0).resolve(depth), None);
    }
}

#[test]
fn test_resolve_from_bottom() {
    assert_eq!(StackIndex::new(1).resolve(3), Some(1));
    assert_eq!(StackIndex::new(3).resolve(3), Some(3));
    assert_eq!(StackIndex::new(4).resolve(3), None);
}

#[test]
fn test_resolve_from_top() {
    assert_eq!(StackIndex::TOP.resolve(3), Some(3));
    assert_eq!(StackIndex::new(-3).resolve(3), Some(1));
    assert_eq!(StackIndex::new(-4).resolve(3), None);
}

#[test]
fn test_resolve_on_empty_stack() {
    assert_eq!(StackIndex::TOP.resolve(0), None);
    assert_eq!(StackIndex::new(1).resolve(0), None);
}

#[test]
fn test_resolve_extreme_values() {
    assert_eq!(StackIndex::new(i32::MIN).resolve(i32::MAX), None);
    assert_eq!(StackIndex::new(i32::MIN).resolve(1), None);
    assert_eq!(StackIndex::new(i32::MAX).resolve(i32::MAX), Some(i32::MAX));
}

#[test]
fn test_raw_conversions() {
    let index = StackIndex::from(-2);
    assert_eq!(index.get(), -2);
    assert_eq!(i32::from(index), -2);
    assert_eq!(StackIndex::default(), StackIndex::TOP);
}

#[test]
fn test_display_shows_sign() {
    assert_eq!(StackIndex::new(4).to_string(), "+4");
    assert_eq!(StackIndex::TOP.to_string(), "-1");
}

mod proptest_resolve {
    use super::super::StackIndex;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn resolved_slot_is_always_live(raw in any::<i32>(), depth in 0..10_000i32) {
            if let Some(slot) = StackIndex::new(raw).resolve(depth) {
                prop_assert!(slot >= 1 && slot <= depth);
            }
        }

        #[test]
        fn top_relative_mirrors_bottom_relative(depth in 1..10_000i32, offset in 0..10_000i32) {
            prop_assume!(offset < depth);
            let from_bottom = StackIndex::new(depth - offset).resolve(depth);
            let from_top = StackIndex::new(-(offset + 1)).resolve(depth);
            prop_assert_eq!(from_bottom, from_top);
        }
    }
}
