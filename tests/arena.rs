use colstore::{Arena, Cell};

#[test]
fn set_get_and_reset() {
    let mut arena = Arena::with_capacity(16);
    assert_eq!(arena.capacity(), 16);
    assert!(arena.get(0).is_nil());

    arena.set(3, Cell::I8(7));
    arena.set(4, Cell::F64(1.5));
    arena.set(5, Cell::Str("abc".into()));
    assert_eq!(arena.get(3).as_i8(), Some(7));
    assert_eq!(arena.get(4).as_f64(), Some(1.5));
    assert_eq!(arena.get(5).as_str(), Some("abc"));

    arena.reset(3, 4);
    assert!(arena.get(3).is_nil());
    assert!(arena.get(4).is_nil());
    // reset is inclusive and must not touch neighbors
    assert_eq!(arena.get(5).as_str(), Some("abc"));
}

#[test]
fn sort_range_only_touches_the_window() {
    let mut arena = Arena::with_capacity(8);
    for (i, v) in [5i8, 4, 3, 2, 1, 0].iter().enumerate() {
        arena.set(i, Cell::I8(*v));
    }
    arena.sort_range(1, 4, |a, b| a.as_i8().cmp(&b.as_i8()));

    let codes: Vec<i8> = (0..6).map(|i| arena.get(i).as_i8().unwrap()).collect();
    assert_eq!(codes, vec![5, 1, 2, 3, 4, 0]);
}

#[test]
fn workspaces_are_disjoint_and_sized() {
    let mut arena = Arena::with_capacity(2000);
    let workspaces = arena.workspaces_mut(4, 500);
    assert_eq!(workspaces.len(), 4);
    for ws in &workspaces {
        assert_eq!(ws.len(), 500);
    }
}

#[test]
#[should_panic]
fn out_of_range_get_panics() {
    let arena = Arena::with_capacity(4);
    let _ = arena.get(4);
}

#[test]
#[should_panic]
fn oversized_workspace_split_panics() {
    let mut arena = Arena::with_capacity(100);
    let _ = arena.workspaces_mut(4, 500);
}

#[test]
fn cell_accessors_reject_foreign_variants() {
    assert_eq!(Cell::Bool(true).as_f64(), None);
    assert_eq!(Cell::F64(2.0).as_i8(), None);
    assert_eq!(Cell::Nil.as_str(), None);
    assert!(Cell::Nil.is_nil());
    assert!(!Cell::Bool(false).is_nil());
}
