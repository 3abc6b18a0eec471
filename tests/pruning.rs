//! Pruning: subtree removal, block surgery at the cut, stale paths


use test_helpers::*;
use timeloom::{HistoryError, Path, Rounding, Segment, Tree};

#[test]
fn prune_removes_exactly_the_subtree() {
    let mut tree = Tree::new();
    let root = tree.add_root(Tick(0.0));
    let trunk = grow_chain(&mut tree, root, &[1.0, 2.0, 3.0]);
    let branch = grow_chain(&mut tree, trunk[0], &[2.0, 3.0, 4.0]);

    let removed = tree.prune(branch[0]).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(tree.live_nodes(), 4);
    for &id in &branch {
        assert!(!tree.contains_node(id));
    }
    for &id in &trunk {
        assert!(tree.contains_node(id));
    }
    // The fork collapsed back to a single child.
    assert_eq!(tree.node(trunk[0]).unwrap().children(), &[trunk[1]]);
}

#[test]
fn prune_mid_block_keeps_a_valid_prefix() {
    let (mut tree, ids) = chain_tree(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    tree.prune(ids[3]).unwrap();

    let Segment::Block(bid) = tree.soft_get_block(ids[0]).unwrap() else {
        panic!("surviving prefix should stay blocked");
    };
    assert_eq!(tree.block(bid).unwrap().nodes(), &ids[..3]);

    let mut path = Path::new(ids[0]);
    assert_eq!(path.length(&tree).unwrap(), 3);
    assert_eq!(path.last_node(&tree, None).unwrap(), ids[2]);
}

#[test]
fn prune_just_below_root_dissolves_the_tiny_prefix() {
    let (mut tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);

    tree.prune(ids[1]).unwrap();

    // A 1-node leftover is a bare node, not a degenerate block.
    assert_eq!(tree.soft_get_block(ids[0]).unwrap(), Segment::Node(ids[0]));
    let mut path = Path::new(ids[0]);
    assert_eq!(path.length(&tree).unwrap(), 1);
}

#[test]
fn stale_path_decisions_fail_instead_of_dangling() {
    let mut tree = Tree::new();
    let root = tree.add_root(Tick(0.0));
    let keep = grow_chain(&mut tree, root, &[1.0]);
    let doomed = grow_chain(&mut tree, root, &[1.0, 2.0]);

    // The fresh path commits to the newest branch, which then vanishes.
    let mut path = Path::new(root);
    walk(&mut path, &tree);
    assert_eq!(path.decided(root), Some(doomed[0]));

    tree.prune(doomed[0]).unwrap();

    let results: Vec<_> = path.iter(&tree).collect();
    assert!(matches!(
        results.last(),
        Some(Err(HistoryError::Pruned(_)))
    ));
    assert!(matches!(
        path.last_node(&tree, None),
        Err(HistoryError::Pruned(_))
    ));
    assert!(matches!(
        path.by_clock(&tree, 1.5, Rounding::Closest),
        Err(HistoryError::Pruned(_))
    ));

    // A fresh path recovers by defaulting to the surviving branch.
    let mut fresh = Path::new(root);
    assert_eq!(walk(&mut fresh, &tree), vec![root, keep[0]]);
}

#[test]
fn pruned_root_invalidates_paths_rooted_there() {
    let (mut tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);
    tree.prune(ids[0]).unwrap();

    assert!(tree.roots().is_empty());
    let mut path = Path::new(ids[0]);
    let results: Vec<_> = path.iter(&tree).collect();
    assert!(matches!(results[0], Err(HistoryError::Pruned(_))));
}

#[test]
fn regrowth_after_prune_uses_fresh_ids() {
    let (mut tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);
    tree.prune(ids[1]).unwrap();

    let regrown = grow_chain(&mut tree, ids[0], &[1.0, 2.0]);
    // Tombstoned slots are never reused, so stale ids stay dead.
    assert!(!tree.contains_node(ids[1]));
    assert_ne!(regrown[0], ids[1]);
    assert_ne!(regrown[0], ids[2]);

    let mut path = Path::new(ids[0]);
    assert_eq!(
        walk(&mut path, &tree),
        vec![ids[0], regrown[0], regrown[1]]
    );
}
