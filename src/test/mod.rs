//! Whole-tree scenarios and randomized checks against brute force and `rstar`.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::AABB;

use crate::rtree::node::NodeId;
use crate::{BBox, RTree, SplitStrategy};

const STRATEGIES: [SplitStrategy; 2] = [SplitStrategy::Linear, SplitStrategy::Quadratic];

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn random_boxes(seed: u64, n: usize) -> Vec<BBox<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0.0..100.0);
            let y = rng.gen_range(0.0..100.0);
            let w = rng.gen_range(0.0..5.0);
            let h = rng.gen_range(0.0..5.0);
            BBox::new(x, y, x + w, y + h)
        })
        .collect()
}

fn build(max_elements: usize, strategy: SplitStrategy, boxes: &[BBox<f64>]) -> RTree<f64, usize> {
    let mut tree = RTree::try_new(max_elements, strategy).unwrap();
    for (i, bbox) in boxes.iter().enumerate() {
        tree.insert(*bbox, i);
    }
    tree
}

fn ids<'a>(entries: impl IntoIterator<Item = &'a crate::Entry<f64, usize>>) -> Vec<usize> {
    let mut ids = entries.into_iter().map(|e| *e.data()).collect::<Vec<_>>();
    ids.sort();
    ids
}

/// Walk the whole tree and check every structural invariant.
pub(crate) fn check_invariants<T>(tree: &RTree<f64, T>) {
    fn visit<T>(tree: &RTree<f64, T>, id: NodeId, parent: Option<NodeId>) -> (BBox<f64>, usize) {
        let node = &tree.nodes[id];
        assert_eq!(node.parent, parent, "parent link of {:?}", id);
        assert!(
            node.kind.direct_len() <= tree.max_elements(),
            "{:?} holds {} elements",
            id,
            node.kind.direct_len()
        );

        let (bbox, len) = if node.is_leaf() {
            let bbox = crate::rtree::minimum_covering_box(node.entries().iter().map(|e| e.bbox()));
            (bbox, node.entries().len())
        } else {
            assert!(node.children().len() >= 2, "{:?} has a single child", id);
            node.children()
                .iter()
                .fold((BBox::empty(), 0), |(bbox, len), child| {
                    let (child_bbox, child_len) = visit(tree, *child, Some(id));
                    (bbox.union(&child_bbox), len + child_len)
                })
        };
        assert_eq!(node.bbox, bbox, "box of {:?} is not tight", id);
        assert_eq!(node.len, len, "cached length of {:?}", id);
        (bbox, len)
    }

    let (_, len) = visit(tree, tree.root, None);
    assert_eq!(len, tree.len());
}

#[test]
fn scenario_quadratic_root_split() {
    init_logger();
    let mut tree = RTree::try_new(4, SplitStrategy::Quadratic).unwrap();
    let boxes = [
        BBox::new(0., 0., 1., 1.),
        BBox::new(100., 0., 101., 1.),
        BBox::new(0., 100., 1., 101.),
        BBox::new(100., 100., 101., 101.),
        BBox::new(50., 50., 51., 51.),
    ];
    for (i, bbox) in boxes.iter().enumerate() {
        tree.insert(*bbox, i);
        if i < 4 {
            assert!(tree.root().is_leaf());
        }
    }

    let root = tree.root();
    assert!(root.is_parent());
    assert_eq!(root.children().count(), 2);
    assert_eq!(ids(tree.search(0., 0., 101., 101.)), vec![0, 1, 2, 3, 4]);
    check_invariants(&tree);
}

#[test]
fn scenario_linear_overlapping_search() {
    let tree = build(
        3,
        SplitStrategy::Linear,
        &[
            BBox::new(0., 0., 1., 1.),
            BBox::new(10., 10., 11., 11.),
            BBox::new(0.5, 0.5, 1.5, 1.5),
            BBox::new(20., 20., 21., 21.),
        ],
    );
    assert_eq!(ids(tree.search(0., 0., 2., 2.)), vec![0, 2]);
    check_invariants(&tree);
}

#[test]
fn scenario_empty_tree() {
    let mut tree = RTree::<f64, usize>::try_new(4, SplitStrategy::Linear).unwrap();
    assert!(tree.search(-1e9, -1e9, 1e9, 1e9).is_empty());
    assert!(tree.search(0., 0., 0., 0.).is_empty());
    assert!(tree.remove(&BBox::new(0., 0., 1., 1.), &0).is_none());
    assert!(tree.is_empty());
    check_invariants(&tree);
}

#[test]
fn scenario_insert_then_remove() {
    let mut tree = RTree::try_new(4, SplitStrategy::Quadratic).unwrap();
    let bbox = BBox::new(3., 4., 5., 6.);
    tree.insert(bbox, 42);
    assert_eq!(tree.remove(&bbox, &42).map(|e| e.into_data()), Some(42));
    assert!(tree.search(3., 4., 5., 6.).is_empty());
    assert!(tree.is_empty());
    assert!(tree.root().is_leaf());
    assert!(tree.root().entries().is_empty());
    check_invariants(&tree);
}

#[test]
fn one_overflow_splits_the_root_leaf() {
    for strategy in STRATEGIES {
        for max_elements in 2..10 {
            let boxes = random_boxes(max_elements as u64, max_elements + 1);
            let tree = build(max_elements, strategy, &boxes);
            let root = tree.root();
            assert_eq!(root.children().count(), 2);
            let min_occupancy = (max_elements / 3).max(1);
            for child in root.children() {
                assert!(child.len() >= min_occupancy);
            }
            check_invariants(&tree);
        }
    }
}

#[test]
fn every_inserted_box_is_found_by_itself() {
    for strategy in STRATEGIES {
        for max_elements in [2, 3, 4, 8, 16] {
            let boxes = random_boxes(7, 300);
            let tree = build(max_elements, strategy, &boxes);
            assert_eq!(tree.len(), boxes.len());
            check_invariants(&tree);
            for (i, bbox) in boxes.iter().enumerate() {
                let found = tree.search(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
                assert!(found.iter().any(|e| *e.data() == i));
            }
            assert_eq!(ids(tree.iter()), (0..boxes.len()).collect::<Vec<_>>());
        }
    }
}

#[test]
fn search_matches_brute_force() {
    let boxes = random_boxes(11, 500);
    let queries = random_boxes(12, 50);
    for strategy in STRATEGIES {
        let tree = build(6, strategy, &boxes);
        for query in &queries {
            let mut found = vec![];
            tree.search_into(query, &mut found);
            let expected = (0..boxes.len())
                .filter(|i| boxes[*i].intersects(query))
                .collect::<Vec<_>>();
            assert_eq!(ids(found), expected);
        }
    }
}

fn rstar_rect(bbox: &BBox<f64>, i: usize) -> GeomWithData<Rectangle<[f64; 2]>, usize> {
    let aabb = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
    GeomWithData::new(Rectangle::from_aabb(aabb), i)
}

#[test]
fn search_agrees_with_rstar() {
    let boxes = random_boxes(21, 400);
    let queries = random_boxes(22, 60);
    let data = rstar::RTree::bulk_load(
        boxes
            .iter()
            .enumerate()
            .map(|(i, bbox)| rstar_rect(bbox, i))
            .collect(),
    );
    let query_tree = rstar::RTree::bulk_load(
        queries
            .iter()
            .enumerate()
            .map(|(i, bbox)| rstar_rect(bbox, i))
            .collect(),
    );
    let expected: HashSet<(usize, usize)> = data
        .intersection_candidates_with_other_tree(&query_tree)
        .map(|(entry, query)| (entry.data, query.data))
        .collect();

    for strategy in STRATEGIES {
        let tree = build(5, strategy, &boxes);
        let mut found = HashSet::new();
        for (q, query) in queries.iter().enumerate() {
            for entry in tree.search(query.min_x, query.min_y, query.max_x, query.max_y) {
                found.insert((*entry.data(), q));
            }
        }
        assert_eq!(found, expected);

        let query_rtree = build(5, strategy, &queries);
        let pairs: HashSet<(usize, usize)> = tree
            .intersection_candidates_with_other_tree(&query_rtree)
            .map(|(entry, query)| (*entry.data(), *query.data()))
            .collect();
        assert_eq!(pairs, expected);
    }
}

#[test]
fn random_inserts_and_removes_keep_invariants() {
    init_logger();
    for strategy in STRATEGIES {
        for max_elements in [2, 3, 5, 9] {
            let boxes = random_boxes(31 + max_elements as u64, 200);
            let mut tree = build(max_elements, strategy, &boxes);
            let mut live = (0..boxes.len()).collect::<HashSet<_>>();

            let mut rng = StdRng::seed_from_u64(max_elements as u64);
            for round in 0..300 {
                let i = rng.gen_range(0..boxes.len());
                if live.remove(&i) {
                    assert!(tree.remove(&boxes[i], &i).is_some());
                } else {
                    tree.insert(boxes[i], i);
                    live.insert(i);
                }
                assert_eq!(tree.len(), live.len());
                if round % 25 == 0 {
                    check_invariants(&tree);
                }
            }
            check_invariants(&tree);

            let mut expected = live.into_iter().collect::<Vec<_>>();
            expected.sort();
            assert_eq!(ids(tree.search(-1., -1., 200., 200.)), expected);
        }
    }
}

#[test]
fn removed_entries_are_not_found() {
    let boxes = random_boxes(41, 150);
    let mut tree = build(4, SplitStrategy::Linear, &boxes);
    for (i, bbox) in boxes.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
        assert!(tree.remove(bbox, &i).is_some());
        assert!(tree.remove(bbox, &i).is_none());
    }
    check_invariants(&tree);
    for (i, bbox) in boxes.iter().enumerate() {
        let found = tree.search(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
        assert_eq!(found.iter().any(|e| *e.data() == i), i % 2 == 1);
    }
}

#[test]
fn neighbors_match_brute_force() {
    let boxes = random_boxes(51, 300);
    let tree = build(8, SplitStrategy::Quadratic, &boxes);
    let mut rng = StdRng::seed_from_u64(52);
    for _ in 0..20 {
        let (x, y) = (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
        let results = tree.neighbors(x, y, Some(10), None);
        assert_eq!(results.len(), 10);

        let mut distances = boxes
            .iter()
            .map(|bbox| bbox.distance_squared_to_point(x, y))
            .collect::<Vec<_>>();
        distances.sort_by(|a, b| a.total_cmp(b));
        let found = results
            .iter()
            .map(|e| e.bbox().distance_squared_to_point(x, y))
            .collect::<Vec<_>>();
        assert_eq!(found, distances[..10].to_vec());
    }
}

#[test]
fn integer_coordinates() {
    let mut tree = RTree::<i32, u32>::try_new(4, SplitStrategy::Linear).unwrap();
    for i in 0..100 {
        let v = i * 1_000_000;
        tree.insert(BBox::new(v, -v, v + 10, -v + 10), i as u32);
    }
    assert_eq!(tree.len(), 100);
    assert_eq!(tree.bounds(), Some(BBox::new(0, -99_000_000, 99_000_010, 10)));
    let found = tree.search(5_000_000, -5_000_000, 5_000_005, -4_999_995);
    assert_eq!(found.len(), 1);
    assert_eq!(*found[0].data(), 5);

    let mut unsigned = RTree::<u8, ()>::try_new(2, SplitStrategy::Quadratic).unwrap();
    for v in [0u8, 250, 10, 240] {
        unsigned.insert(BBox::new(v, v, v.saturating_add(5), v.saturating_add(5)), ());
    }
    assert_eq!(unsigned.search(0, 0, 255, 255).len(), 4);
}
