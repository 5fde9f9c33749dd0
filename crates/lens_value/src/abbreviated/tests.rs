use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_truncate_keeps_prefix_and_last() {
    let abbr = Abbreviated::truncate((0..10).collect::<Vec<u32>>(), 3);
    assert_eq!(abbr.len(), 10);
    assert_eq!(abbr.prefix(), &[0, 1, 2]);
    assert_eq!(abbr.last(), Some(&9));
    assert_eq!(abbr.included_len(), 4);
    assert_eq!(abbr.elided_len(), 6);
    assert!(abbr.is_elided());
}

#[test]
fn test_truncate_short_sequence_is_complete() {
    // limit + 1 items fit exactly: prefix plus last would cover everything.
    let abbr = Abbreviated::truncate(vec![1, 2, 3, 4], 3);
    assert!(!abbr.is_elided());
    assert_eq!(abbr.prefix(), &[1, 2, 3, 4]);
    assert_eq!(abbr.last(), None);
}

#[test]
fn test_get_respects_elision() {
    let abbr = Abbreviated::truncate((0..10).collect::<Vec<u32>>(), 2);
    assert_eq!(abbr.get(0), Some(&0));
    assert_eq!(abbr.get(1), Some(&1));
    assert_eq!(abbr.get(2), None);
    assert_eq!(abbr.get(9), Some(&9));
    assert_eq!(abbr.get(10), None);
}

#[test]
fn test_iter_included_reports_original_indices() {
    let abbr = Abbreviated::truncate(vec!['a', 'b', 'c', 'd', 'e'], 2);
    let seen: Vec<(usize, char)> = abbr.iter_included().map(|(i, c)| (i, *c)).collect();
    assert_eq!(seen, vec![(0, 'a'), (1, 'b'), (4, 'e')]);
}

#[test]
fn test_from_parts_rejects_short_length() {
    let err = Abbreviated::from_parts(vec![1, 2, 3], Some(4), 3);
    assert_eq!(err, Err(AbbreviatedError { included: 4, len: 3 }));
}

#[test]
fn test_from_parts_normalizes_complete_sequence() {
    let Ok(abbr) = Abbreviated::from_parts(vec![1, 2], Some(3), 3) else {
        panic!("complete parts should be accepted");
    };
    assert_eq!(abbr, Abbreviated::all(vec![1, 2, 3]));
    assert!(!abbr.is_elided());
}

#[test]
fn test_wire_all() {
    let Ok(json) = serde_json::to_string(&Abbreviated::all(vec![1u32, 2])) else {
        panic!("serialization failed");
    };
    assert_eq!(json, r#"{"type":"All","value":[1,2]}"#);
}

#[test]
fn test_wire_only() {
    let abbr = Abbreviated::truncate(vec![1u32, 2, 3, 4, 5], 1);
    let Ok(json) = serde_json::to_string(&abbr) else {
        panic!("serialization failed");
    };
    assert_eq!(
        json,
        r#"{"type":"Only","value":{"prefix":[1],"last":5,"len":5}}"#
    );
    let Ok(back) = serde_json::from_str::<Abbreviated<u32>>(&json) else {
        panic!("deserialization failed");
    };
    assert_eq!(back, abbr);
}

#[test]
fn test_wire_rejects_length_shorter_than_prefix() {
    let json = r#"{"type":"Only","value":{"prefix":[1,2,3],"last":null,"len":2}}"#;
    let result = serde_json::from_str::<Abbreviated<u32>>(json);
    let Err(err) = result else {
        panic!("expected length violation to be rejected");
    };
    assert!(err.to_string().contains("claims length 2"));
}

#[test]
fn test_wire_only_without_elision_normalizes() {
    let json = r#"{"type":"Only","value":{"prefix":[1,2],"last":null,"len":2}}"#;
    let Ok(abbr) = serde_json::from_str::<Abbreviated<u32>>(json) else {
        panic!("deserialization failed");
    };
    assert!(!abbr.is_elided());
    assert_eq!(abbr.len(), 2);
}

#[test]
fn test_map_preserves_shape() {
    let abbr = Abbreviated::truncate(vec![1u32, 2, 3, 4, 5], 2);
    let doubled = abbr.map(|x| x * 2);
    assert_eq!(doubled.prefix(), &[2, 4]);
    assert_eq!(doubled.last(), Some(&10));
    assert_eq!(doubled.len(), 5);
}

#[test]
fn test_get_max_index_on_elided_sequence() {
    let abbr = Abbreviated::truncate(vec![1, 2, 3, 4, 5], 1);
    assert_eq!(abbr.get(usize::MAX), None);
    assert_eq!(abbr.get(4), Some(&5));
}
