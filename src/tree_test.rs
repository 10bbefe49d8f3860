use super::*;

use crate::DictAvl;

// Snapshot of every link and height, to detect structural changes.
fn shape(arena: &Arena<u32, u32>, tree: &AvlTree) -> Vec<(u32, Option<u32>, Option<u32>, isize)> {
    let key = |id: Option<NodeId>| id.map(|id| *arena[id].as_key());
    in_order_ids(arena, tree.to_root())
        .into_iter()
        .map(|id| {
            let n = &arena[id];
            (*n.as_key(), key(n.to_left()), key(n.to_right()), n.to_height())
        })
        .collect()
}

fn seven(arena: &mut Arena<u32, u32>) -> DictAvl {
    DictAvl::build(arena, (1..=7).map(|k| (k, k * 10))).unwrap()
}

fn link_left(arena: &mut Arena<u32, u32>, parent: NodeId, child: NodeId) {
    arena[parent].left = Some(child);
    arena[child].parent = Some(parent);
}

fn link_right(arena: &mut Arena<u32, u32>, parent: NodeId, child: NodeId) {
    arena[parent].right = Some(child);
    arena[child].parent = Some(parent);
}

#[test]
fn test_height() {
    let mut arena: Arena<u32, u32> = Arena::new();
    assert_eq!(height(&arena, None), EMPTY_HEIGHT);

    let index = DictAvl::build(&mut arena, vec![(1, 1), (2, 2), (3, 3)]).unwrap();
    let root = index.to_root().unwrap();
    assert_eq!(*arena[root].as_key(), 2);
    assert_eq!(height(&arena, Some(root)), 1);
    assert_eq!(balance(&arena, root), 0);

    let left = arena[root].to_left().unwrap();
    assert_eq!(height(&arena, Some(left)), 0);

    arena[root].height = 7;
    update_height(&mut arena, root);
    assert_eq!(arena[root].to_height(), 1);
}

#[test]
fn test_rotate_four_cases() {
    // (chain of three keys, expected subtree root)
    let cases: Vec<(Vec<u32>, u32)> = vec![
        (vec![3, 2, 1], 2), // left-left
        (vec![1, 2, 3], 2), // right-right
        (vec![3, 1, 2], 2), // left-right
        (vec![1, 3, 2], 2), // right-left
    ];

    for (keys, expected) in cases.into_iter() {
        let mut arena: Arena<u32, u32> = Arena::new();
        let ids: Vec<NodeId> = keys.iter().map(|k| arena.alloc(*k, *k)).collect();
        for i in 1..ids.len() {
            if keys[i] < keys[i - 1] {
                link_left(&mut arena, ids[i - 1], ids[i]);
            } else {
                link_right(&mut arena, ids[i - 1], ids[i]);
            }
        }
        for id in ids.iter().rev() {
            update_height(&mut arena, *id);
        }

        let mut tree = AvlTree::from_root(arena.to_id(), Some(ids[0]));
        assert_eq!(balance(&arena, ids[0]).abs(), 2, "{:?}", keys);

        let top = tree.rotate(&mut arena, ids[0]);
        assert_eq!(*arena[top].as_key(), expected, "{:?}", keys);
        assert_eq!(tree.to_root(), Some(top));
        assert_eq!(tree.validate(&arena).unwrap(), 3);
        let items: Vec<u32> = tree.iter(&arena).unwrap().map(|(k, _)| *k).collect();
        assert_eq!(items, vec![1, 2, 3]);
    }
}

#[test]
fn test_rotate_idempotent() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let mut index = seven(&mut arena);
    let before = shape(&arena, index.as_tree());

    for id in in_order_ids(&arena, index.to_root()) {
        let top = index.rotate(&mut arena, id).unwrap();
        assert_eq!(top, id);
        let top = index.rotate(&mut arena, id).unwrap();
        assert_eq!(top, id);
    }
    assert_eq!(before, shape(&arena, index.as_tree()));
    index.validate(&arena).unwrap();
}

#[test]
fn test_rebalance_after_graft() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let index = seven(&mut arena);
    let mut tree = index.into_tree();

    // hang 8 -> 9 under the leaf 7, leaving 7 right heavy by two.
    let n7 = in_order_ids(&arena, tree.to_root())[6];
    let (eight, nine) = (arena.alloc(8, 80), arena.alloc(9, 90));
    link_right(&mut arena, n7, eight);
    link_right(&mut arena, eight, nine);
    assert!(tree.validate(&arena).is_err());

    tree.rebalance(&mut arena, Some(eight));

    assert_eq!(tree.validate(&arena).unwrap(), 9);
    assert_eq!(tree.to_height(&arena).unwrap(), 3);
    assert_eq!(arena[eight].to_left(), Some(n7));
    assert_eq!(arena[eight].to_right(), Some(nine));
    let items: Vec<u32> = tree.iter(&arena).unwrap().map(|(k, _)| *k).collect();
    assert_eq!(items, (1..=9).collect::<Vec<u32>>());
}

#[test]
fn test_cut_and_graft() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let index = seven(&mut arena);
    let mut tree = index.into_tree();
    let root = tree.to_root().unwrap();
    assert_eq!(*arena[root].as_key(), 4);

    let left = tree.cut_left(&mut arena, root).unwrap();
    let lroot = left.to_root().unwrap();
    assert_eq!(*arena[lroot].as_key(), 2);
    assert_eq!(arena[lroot].to_parent(), None);
    assert_eq!(arena[root].to_left(), None);
    assert_eq!(left.validate(&arena).unwrap(), 3);
    assert!(!tree.contains_node(&arena, lroot));

    match tree.cut_left(&mut arena, root) {
        Err(Error::EmptySubtree(_, _)) => (),
        Err(err) => panic!("unexpected {}", err),
        Ok(_) => panic!("cut_left on absent child"),
    }

    tree.insert_as_left_subtree(&mut arena, root, left).unwrap();
    assert_eq!(arena[lroot].to_parent(), Some(root));
    assert!(tree.contains_node(&arena, lroot));
    assert_eq!(tree.validate(&arena).unwrap(), 7);

    let right = tree.cut_right(&mut arena, root).unwrap();
    let items: Vec<u32> = right.iter(&arena).unwrap().map(|(k, _)| *k).collect();
    assert_eq!(items, vec![5, 6, 7]);
    match tree.cut_right(&mut arena, root) {
        Err(Error::EmptySubtree(_, _)) => (),
        Err(err) => panic!("unexpected {}", err),
        Ok(_) => panic!("cut_right on absent child"),
    }
    tree.insert_as_right_subtree(&mut arena, root, right).unwrap();
    assert_eq!(tree.validate(&arena).unwrap(), 7);
}

#[test]
fn test_foreign_node() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let mut a = seven(&mut arena).into_tree();
    let b = DictAvl::build(&mut arena, vec![(100, 100), (200, 200)]).unwrap();
    let broot = b.to_root().unwrap();

    match a.cut_left(&mut arena, broot) {
        Err(Error::InvalidNode(_, _)) => (),
        Err(err) => panic!("unexpected {}", err),
        Ok(_) => panic!("cut_left on foreign node"),
    }

    let mut other: Arena<u32, u32> = Arena::new();
    let c = DictAvl::build(&mut other, vec![(1, 1)]).unwrap();
    assert!(c.as_tree().validate(&arena).is_err());
    let root = a.to_root().unwrap();
    match a.insert_as_left_subtree(&mut arena, root, c.into_tree()) {
        Err(Error::InvalidNode(_, _)) => (),
        Err(err) => panic!("unexpected {}", err),
        Ok(_) => panic!("graft across arenas"),
    }
}

#[test]
fn test_stale_and_foreign_arena() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let mut other: Arena<u32, u32> = Arena::new();
    let mut index = seven(&mut arena);
    let b = DictAvl::build(&mut arena, vec![(100, 100), (200, 200)]).unwrap();
    let _c = DictAvl::build(&mut other, (100..=110).map(|k| (k, k))).unwrap();

    let leaf = index.find(&arena, &1).unwrap();
    index.delete_node(&mut arena, leaf).unwrap();
    let tree = index.as_tree();

    check_invalid(tree.to_height(&other), "to_height");
    check_invalid(tree.iter(&other), "iter");
    check_invalid(tree.dfs(&other, tree.to_root()), "dfs arena");
    check_invalid(tree.dfs(&arena, Some(leaf)), "dfs stale");
    check_invalid(tree.dfs(&arena, b.to_root()), "dfs foreign");
    check_invalid(tree.range(&other, 1_u32..), "range");
    check_invalid(tree.reverse(&other, ..=5_u32), "reverse");

    assert_eq!(tree.to_height(&arena).unwrap(), 2);
    assert_eq!(tree.iter(&arena).unwrap().count(), 6);
    assert_eq!(tree.validate(&arena).unwrap(), 6);
}

fn check_invalid<T>(res: Result<T>, what: &str) {
    match res {
        Err(Error::InvalidNode(_, _)) => (),
        Err(err) => panic!("{} unexpected {}", what, err),
        Ok(_) => panic!("{} accepted a stale or foreign handle", what),
    }
}

#[test]
fn test_dfs() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let index = seven(&mut arena);
    let tree = index.as_tree();

    let all: Vec<(u32, u32)> = tree.iter(&arena).unwrap().map(|(k, v)| (*k, *v)).collect();
    let refs: Vec<(u32, u32)> = (1..=7).map(|k| (k, k * 10)).collect();
    assert_eq!(all, refs);

    let root = tree.to_root().unwrap();
    let six = arena[root].to_right().unwrap();
    let mut iter = tree.dfs(&arena, Some(six)).unwrap();
    assert_eq!(iter.next(), Some((&5, &50)));

    // clone restarts from the same point.
    let rest: Vec<u32> = iter.clone().map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![6, 7]);
    let rest: Vec<u32> = iter.map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![6, 7]);

    assert_eq!(tree.dfs(&arena, None).unwrap().next(), None);
}

#[test]
fn test_validate_detects_corruption() {
    let mut arena: Arena<u32, u32> = Arena::new();
    let index = seven(&mut arena);
    let tree = index.as_tree();
    let root = tree.to_root().unwrap();
    assert_eq!(tree.validate(&arena).unwrap(), 7);

    // stale height cache.
    arena[root].height = 5;
    assert!(tree.validate(&arena).is_err());
    update_height(&mut arena, root);
    assert_eq!(tree.validate(&arena).unwrap(), 7);

    // broken parent link.
    let left = arena[root].to_left().unwrap();
    arena[left].parent = None;
    assert!(tree.validate(&arena).is_err());
    arena[left].parent = Some(root);

    // broken sort order.
    arena[left].key = 100;
    assert!(tree.validate(&arena).is_err());
    arena[left].key = 2;

    // unbalanced.
    let right = arena[root].right.take().unwrap();
    arena[right].parent = None;
    update_height(&mut arena, root);
    assert!(tree.validate(&arena).is_err());
}
