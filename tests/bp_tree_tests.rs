use bptree::{BPlusTree, NodeId, TreeError};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn keys_of(tree: &BPlusTree<i32>, id: NodeId) -> Vec<i32> {
    tree.node(id).expect("node exists").keys().to_vec()
}

fn permutations(items: &[i32]) -> Vec<Vec<i32>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_reference_sequence_degree_four() {
    info!("[TEST] inserting 0..16 at degree 4");

    let mut tree = BPlusTree::new(4).expect("valid degree");
    for key in 0..4 {
        tree.insert(key).expect("insert");
    }
    debug!("after 0..4:\n{}", tree);

    let root = tree.node(tree.root()).expect("root");
    assert!(!root.is_leaf());
    assert_eq!(root.keys(), &[2]);
    assert_eq!(keys_of(&tree, root.children()[0]), vec![0, 1, 2]);
    assert_eq!(keys_of(&tree, root.children()[1]), vec![3]);

    for key in 4..16 {
        tree.insert(key).expect("insert");
        tree.check_invariants().expect("consistent after every insert");
    }
    debug!("after 0..16:\n{}", tree);

    let root = tree.node(tree.root()).expect("root");
    assert!(!root.is_leaf());
    assert!(root.keys().len() >= 2);
    assert_eq!(tree.height().expect("height"), 3);

    let expected = "\
[ 5 11 ]
[ 2 ][ 8 ][ 14 ]
[ 0 1 2 ][ 3 4 5 ][ 6 7 8 ][ 9 10 11 ][ 12 13 14 ][ 15 ]
";
    assert_eq!(tree.to_string(), expected);

    info!("[TEST] reference sequence produced the expected shape");
}

#[test]
fn test_root_grows_after_degree_keys() {
    for degree in 3..=9 {
        let mut tree = BPlusTree::new(degree).expect("valid degree");
        for key in 0..degree as i32 - 1 {
            tree.insert(key).expect("insert");
        }
        assert!(tree.node(tree.root()).expect("root").is_leaf());

        tree.insert(degree as i32).expect("insert");

        let root = tree.node(tree.root()).expect("root");
        assert!(!root.is_leaf(), "degree {degree}: root should have split");
        assert_eq!(root.keys().len(), 1, "degree {degree}: exactly one split");
        assert_eq!(root.children().len(), 2);
        assert_eq!(tree.levels().len(), 2);
        tree.check_invariants().expect("consistent");
    }
}

#[test]
fn test_small_degrees_are_rejected() {
    for degree in 0..3 {
        let err = BPlusTree::<i32>::new(degree).expect_err("degree too small");
        assert_eq!(err, TreeError::Configuration { degree, min: 3 });
    }
    assert!(BPlusTree::<i32>::new(3).is_ok());
}

#[test]
fn test_every_inserted_key_is_found_by_descent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for degree in 3..=10 {
        let mut keys: Vec<i32> = (0..400).collect();
        keys.shuffle(&mut rng);
        info!("[TEST] degree {} with {} shuffled keys", degree, keys.len());

        let mut tree = BPlusTree::new(degree).expect("valid degree");
        for &key in &keys {
            tree.insert(key).expect("insert");
        }
        tree.check_invariants().expect("consistent");

        for key in &keys {
            let leaf = tree.descend_to_leaf(key).expect("descent");
            let node = tree.node(leaf).expect("leaf exists");
            assert!(node.is_leaf());
            assert!(node.keys().contains(key), "degree {degree}: key {key} not in its leaf");
        }
    }
}

#[test]
fn test_duplicates_are_kept_and_found() {
    let mut rng = StdRng::seed_from_u64(42);

    for degree in [3, 4, 5, 7] {
        let mut tree = BPlusTree::new(degree).expect("valid degree");
        let mut inserted = Vec::new();
        for _ in 0..300 {
            let key = rng.gen_range(0..25);
            tree.insert(key).expect("insert");
            inserted.push(key);
        }
        tree.check_invariants().expect("consistent with duplicates");

        inserted.sort();
        let chained: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(chained, inserted, "degree {degree}: multiset preserved");

        for key in 0..25 {
            if inserted.binary_search(&key).is_ok() {
                let leaf = tree.descend_to_leaf(&key).expect("descent");
                assert!(keys_of(&tree, leaf).contains(&key), "degree {degree}: duplicate key {key} lost");
            }
        }
    }
}

#[test]
fn test_structure_holds_after_every_insert() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = BPlusTree::new(4).expect("valid degree");

    for _ in 0..500 {
        tree.insert(rng.gen_range(-1000..1000)).expect("insert");
        tree.check_invariants().expect("consistent");
    }
}

#[test]
fn test_node_capacity_bounds() {
    let mut rng = StdRng::seed_from_u64(11);

    for degree in 3..=8 {
        let mut tree = BPlusTree::new(degree).expect("valid degree");
        for _ in 0..250 {
            tree.insert(rng.gen_range(0..10_000)).expect("insert");

            for node in tree.levels().into_iter().flatten() {
                if node.is_leaf() {
                    assert!(node.len() < degree);
                } else {
                    assert!(node.len() < degree - 1);
                    assert_eq!(node.children().len(), node.len() + 1);
                }
            }
        }
    }
}

#[test]
fn test_separators_bound_their_children() {
    let mut tree = BPlusTree::new(5).expect("valid degree");
    for key in (0..200).map(|k| (k * 37) % 211) {
        tree.insert(key).expect("insert");
    }

    fn subtree_keys(tree: &BPlusTree<i32>, id: NodeId, out: &mut Vec<i32>) {
        let node = tree.node(id).expect("node exists");
        if node.is_leaf() {
            out.extend_from_slice(node.keys());
        }
        for &child in node.children() {
            subtree_keys(tree, child, out);
        }
    }

    for node in tree.levels().into_iter().flatten() {
        for (i, &child) in node.children().iter().enumerate() {
            let mut below = Vec::new();
            subtree_keys(&tree, child, &mut below);
            if let Some(bound) = node.keys().get(i) {
                assert!(below.iter().all(|k| k <= bound));
            }
        }
    }
}

#[test]
fn test_leaf_chain_is_complete_and_ordered() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut keys: Vec<i32> = (0..1000).collect();
    keys.shuffle(&mut rng);

    let mut tree = BPlusTree::new(6).expect("valid degree");
    for &key in &keys {
        tree.insert(key).expect("insert");
    }

    let leaf_level: Vec<NodeId> = {
        let levels = tree.levels();
        let last = levels.last().expect("leaf level");
        let chained: Vec<NodeId> = tree.leaves().map(|(id, _)| id).collect();
        assert_eq!(chained.len(), last.len(), "no leaf skipped");
        chained
    };
    assert_eq!(leaf_level.first().copied(), tree.leftmost_leaf().ok());

    let chained: Vec<i32> = tree.iter().copied().collect();
    assert_eq!(chained, (0..1000).collect::<Vec<_>>());
    assert_eq!(tree.len(), 1000);
}

#[test]
fn test_insertion_order_does_not_change_membership() {
    let base = [5, 3, 8, 1];
    for degree in 3..=5 {
        for order in permutations(&base) {
            let mut tree = BPlusTree::new(degree).expect("valid degree");
            for &key in &order {
                tree.insert(key).expect("insert");
            }
            tree.check_invariants().expect("consistent");
            let keys: Vec<i32> = tree.iter().copied().collect();
            assert_eq!(keys, vec![1, 3, 5, 8], "order {order:?} at degree {degree}");
        }
    }
}

#[test]
fn test_string_keys() {
    let mut tree = BPlusTree::new(3).expect("valid degree");
    for word in ["pear", "apple", "fig", "kiwi", "banana", "cherry", "date"] {
        tree.insert(word.to_string()).expect("insert");
    }
    tree.check_invariants().expect("consistent");

    let words: Vec<&str> = tree.iter().map(String::as_str).collect();
    assert_eq!(words, vec!["apple", "banana", "cherry", "date", "fig", "kiwi", "pear"]);

    let leaf = tree.descend_to_leaf(&"kiwi".to_string()).expect("descent");
    assert!(tree.node(leaf).expect("leaf").keys().iter().any(|k| k == "kiwi"));
}

#[test]
fn test_many_duplicates_at_smallest_degree() {
    info!("[TEST] 800 copies of one key at degree 3");

    let mut tree = BPlusTree::new(3).expect("valid degree");
    for _ in 0..800 {
        tree.insert(7i64).expect("duplicates are accepted");
    }
    tree.check_invariants().expect("consistent after a long cascade");

    assert_eq!(tree.len(), 800);
    assert_eq!(tree.iter().count(), 800);
    assert!(tree.iter().all(|&k| k == 7));

    let leaf = tree.descend_to_leaf(&7).expect("descent");
    assert!(tree.node(leaf).expect("leaf").keys().contains(&7));
    debug!("height after 800 duplicates: {}", tree.height().expect("height"));
}

#[test]
fn test_height_at_smallest_degree() {
    // an internal split at degree 3 leaves the sibling with no keys, so a
    // run of equal keys stacks one level per insert
    for n in 2..=40 {
        let mut tree = BPlusTree::new(3).expect("valid degree");
        for _ in 0..n {
            tree.insert(1u8).expect("insert");
        }
        assert_eq!(tree.height().expect("height"), n - 1, "{n} duplicates");
    }

    // ascending distinct keys stay logarithmic
    let n = 4096usize;
    let mut tree = BPlusTree::new(3).expect("valid degree");
    for key in 0..n {
        tree.insert(key).expect("insert");
    }
    tree.check_invariants().expect("consistent");
    let log2 = (usize::BITS - n.leading_zeros()) as usize;
    let height = tree.height().expect("height");
    info!("[TEST] {} ascending keys at degree 3 -> height {}", n, height);
    assert!(height <= 2 * log2 + 2, "height {height} for {n} ascending keys");
}
