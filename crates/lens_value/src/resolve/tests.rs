use super::*;
use pretty_assertions::assert_eq;

/// A snapshot with one frame holding `v` and `s`, and two heap cells.
struct Fixture {
    locals: Vec<(String, Value)>,
    heap: Vec<Value>,
}

impl Snapshot for Fixture {
    fn frame_count(&self) -> usize {
        1
    }

    fn local(&self, frame: usize, name: &str) -> Option<&Value> {
        if frame != 0 {
            return None;
        }
        self.locals.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn heap(&self, index: usize) -> Option<&Value> {
        self.heap.get(index)
    }
}

fn fixture() -> Fixture {
    Fixture {
        locals: vec![
            ("v".to_string(), Value::pointer(Path::heap(0))),
            ("s".to_string(), Value::string("hello")),
            (
                "p".to_string(),
                Value::record("Point", vec![("x", Value::int(1)), ("y", Value::int(2))]),
            ),
        ],
        heap: vec![
            Value::list(vec![Value::uint(1u32), Value::uint(2u32), Value::uint(3u32)]),
            Value::Array(Abbreviated::truncate(
                (0u32..100).map(Value::uint).collect(),
                2,
            )),
        ],
    }
}

fn reason(result: Result<Target<'_>, ResolveError>) -> DanglingReason {
    let Err(err) = result else {
        panic!("expected a dangling reference");
    };
    err.reason()
}

#[test]
fn test_resolve_local_and_heap() {
    let snap = fixture();
    assert_eq!(
        resolve(&snap, &Path::stack(0, "v")),
        Ok(Target::Value(&Value::pointer(Path::heap(0))))
    );
    assert_eq!(
        resolve(&snap, &Path::heap(0).index(2)),
        Ok(Target::Value(&Value::uint(3u32)))
    );
}

#[test]
fn test_resolve_field() {
    let snap = fixture();
    assert_eq!(
        resolve(&snap, &Path::stack(0, "p").field(1)),
        Ok(Target::Value(&Value::int(2)))
    );
    assert_eq!(
        reason(resolve(&snap, &Path::stack(0, "p").field(2))),
        DanglingReason::FieldOutOfRange
    );
}

#[test]
fn test_resolve_code_unit() {
    let snap = fixture();
    assert_eq!(
        resolve(&snap, &Path::stack(0, "s").index(1)),
        Ok(Target::CodeUnit(u32::from('e')))
    );
}

#[test]
fn test_resolve_subslice_then_index() {
    let snap = fixture();
    let path = Path::stack(0, "s").subslice(1, 4).index(2);
    assert_eq!(resolve(&snap, &path), Ok(Target::CodeUnit(u32::from('l'))));

    let past_window = Path::stack(0, "s").subslice(1, 3).index(2);
    assert_eq!(reason(resolve(&snap, &past_window)), DanglingReason::IndexOutOfRange);
}

#[test]
fn test_resolve_unknown_roots() {
    let snap = fixture();
    assert_eq!(reason(resolve(&snap, &Path::stack(3, "v"))), DanglingReason::UnknownFrame);
    assert_eq!(reason(resolve(&snap, &Path::stack(0, "w"))), DanglingReason::UnknownLocal);
    assert_eq!(reason(resolve(&snap, &Path::heap(9))), DanglingReason::UnknownHeap);
}

#[test]
fn test_resolve_elided_element() {
    let snap = fixture();
    assert_eq!(
        resolve(&snap, &Path::heap(1).index(99)),
        Ok(Target::Value(&Value::uint(99u32)))
    );
    assert_eq!(reason(resolve(&snap, &Path::heap(1).index(50))), DanglingReason::Elided);
    assert_eq!(
        reason(resolve(&snap, &Path::heap(1).index(100))),
        DanglingReason::IndexOutOfRange
    );
}

#[test]
fn test_resolve_not_indexable() {
    let snap = fixture();
    assert_eq!(
        reason(resolve(&snap, &Path::stack(0, "v").index(0))),
        DanglingReason::NotIndexable
    );
    assert_eq!(
        reason(resolve(&snap, &Path::stack(0, "s").index(0).index(0))),
        DanglingReason::NotIndexable
    );
}

#[test]
fn test_error_message_names_path() {
    let snap = fixture();
    let Err(err) = resolve(&snap, &Path::heap(7).field(0)) else {
        panic!("expected a dangling reference");
    };
    assert_eq!(err.to_string(), "dangling reference heap#7.0: no such heap allocation");
    assert_eq!(err.path(), &Path::heap(7).field(0));
}
