//! Tests for collection type descriptors.
use proptest::prelude::*;
use setsuzoku::collection::CollectionTypeDescription;

fn segments() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(vec!["list", "paired", "record"]), 1..4)
}

fn describe(segments: &[&str]) -> CollectionTypeDescription {
    CollectionTypeDescription::new(&segments.join(":"))
}

proptest! {
    #[test]
    fn descriptor_equals_itself_but_never_maps_over_itself(s in segments()) {
        let d = describe(&s);
        prop_assert!(d.equal(&d));
        prop_assert!(!d.can_map_over(&d));
        prop_assert!(d.can_match(&d));
    }

    #[test]
    fn deeper_nesting_maps_over_its_suffix(outer in segments(), inner in segments()) {
        let full: Vec<&str> = outer.iter().chain(inner.iter()).copied().collect();
        let full = describe(&full);
        let outer = describe(&outer);
        let inner = describe(&inner);

        prop_assert!(full.can_map_over(&inner));
        prop_assert!(!inner.can_map_over(&full));
        prop_assert_eq!(full.effective_map_over(&inner), outer.clone());
        prop_assert_eq!(full.strip_outer(&outer), inner.clone());
        prop_assert_eq!(outer.append(&inner), full);
    }

    #[test]
    fn any_matches_every_concrete_type(s in segments()) {
        let d = describe(&s);
        prop_assert!(CollectionTypeDescription::Any.can_match(&d));
        prop_assert!(d.can_match(&CollectionTypeDescription::Any));
        prop_assert!(!CollectionTypeDescription::Null.can_match(&d));
        prop_assert!(!d.can_match(&CollectionTypeDescription::Null));
    }
}

#[test]
fn test_null_matches_nothing() {
    let null = CollectionTypeDescription::Null;
    assert!(!null.can_match(&CollectionTypeDescription::Null));
    assert!(!null.can_match(&CollectionTypeDescription::Any));
    assert!(!null.is_collection());
    assert!(CollectionTypeDescription::Any.is_collection());
}

#[test]
fn test_any_never_maps_over() {
    let any = CollectionTypeDescription::Any;
    assert!(!any.can_map_over(&CollectionTypeDescription::list()));
    assert!(!CollectionTypeDescription::list().can_map_over(&any));
}

#[test]
fn test_append_list_and_paired() {
    let appended = CollectionTypeDescription::list().append(&CollectionTypeDescription::paired());
    assert_eq!(appended.collection_type().as_deref(), Some("list:paired"));
    assert_eq!(appended.rank(), 2);
}

#[test]
fn test_append_with_null_and_any() {
    let list = CollectionTypeDescription::list();
    assert_eq!(CollectionTypeDescription::Null.append(&list), list);
    assert_eq!(list.append(&CollectionTypeDescription::Null), list);
    assert_eq!(
        list.append(&CollectionTypeDescription::Any),
        CollectionTypeDescription::Any
    );
}

#[test]
fn test_list_cannot_map_over_paired() {
    assert!(!CollectionTypeDescription::new("list").can_map_over(&CollectionTypeDescription::new("paired")));
    assert!(CollectionTypeDescription::new("list:paired").can_map_over(&CollectionTypeDescription::new("paired")));
}

#[test]
fn test_equal_is_identity_across_categories() {
    let list = CollectionTypeDescription::list();
    assert!(list.equal(&CollectionTypeDescription::from("list")));
    assert!(!list.equal(&CollectionTypeDescription::paired()));
    assert!(CollectionTypeDescription::Any.equal(&CollectionTypeDescription::Any));
    assert!(CollectionTypeDescription::Null.equal(&CollectionTypeDescription::Null));
    assert!(!CollectionTypeDescription::Any.equal(&CollectionTypeDescription::Null));
}

#[test]
fn test_malformed_types_are_null() {
    assert_eq!(CollectionTypeDescription::new(""), CollectionTypeDescription::Null);
    assert_eq!(CollectionTypeDescription::new("list:"), CollectionTypeDescription::Null);
    assert_eq!(
        CollectionTypeDescription::from_first(&["list:paired", "list"]),
        CollectionTypeDescription::new("list:paired")
    );
    let empty: [&str; 0] = [];
    assert_eq!(CollectionTypeDescription::from_first(&empty), CollectionTypeDescription::Null);
}

#[test]
fn test_display() {
    assert_eq!(CollectionTypeDescription::Null.to_string(), "NullCollectionType[]");
    assert_eq!(CollectionTypeDescription::Any.to_string(), "AnyCollectionType[]");
    assert_eq!(
        CollectionTypeDescription::new("list:paired").to_string(),
        "CollectionType[list:paired]"
    );
}
