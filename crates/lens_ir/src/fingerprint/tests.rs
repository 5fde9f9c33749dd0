use super::*;

#[test]
fn test_fingerprint_same_text_same_revision() {
    let a = Fingerprint::of(Revision::new(3), "fn main() {}");
    let b = Fingerprint::of(Revision::new(3), "fn main() {}");
    assert!(a.matches(&b));
}

#[test]
fn test_fingerprint_revision_bump_is_stale() {
    // Same contents, but the document was edited and edited back.
    let a = Fingerprint::of(Revision::new(3), "fn main() {}");
    let b = Fingerprint::of(Revision::new(5), "fn main() {}");
    assert!(!a.matches(&b));
}

#[test]
fn test_fingerprint_content_change_is_stale() {
    let a = Fingerprint::of(Revision::INITIAL, "fn main() {}");
    let b = Fingerprint::of(Revision::INITIAL, "fn main() { }");
    assert!(!a.matches(&b));
}

#[test]
fn test_revision_next_and_display() {
    let r = Revision::INITIAL.next().next();
    assert_eq!(r.raw(), 2);
    assert_eq!(format!("{r}"), "r2");
    assert!(Revision::INITIAL < r);
}
