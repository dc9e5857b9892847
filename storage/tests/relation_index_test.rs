use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reldb_storage::key::{pack, RelationKey};
use reldb_storage::RelationIndex;

fn sample_orders() -> Vec<Vec<(u64, u64, u16, f64)>> {
    let a = (1, 10, 0, 0.1);
    let b = (1, 20, 0, 0.2);
    let c = (2, 30, 0, 0.3);
    vec![
        vec![a, b, c],
        vec![a, c, b],
        vec![b, a, c],
        vec![b, c, a],
        vec![c, a, b],
        vec![c, b, a],
    ]
}

#[test]
fn prefix_scan_is_complete_in_any_insert_order() {
    for order in sample_orders() {
        let mut index = RelationIndex::new();
        for (s, t, ty, w) in order {
            index.insert(s, t, ty, w);
        }

        assert_eq!(index.get(1), vec![pack(1, 10, 0), pack(1, 20, 0)]);
        assert_eq!(index.get(2), vec![pack(2, 30, 0)]);
        assert_eq!(index.reverse_get(10), vec![pack(10, 1, 0)]);
        assert_eq!(index.reverse_get(30), vec![pack(30, 2, 0)]);
    }
}

#[test]
fn remove_is_exact() {
    let mut index = RelationIndex::new();
    index.insert(1, 10, 0, 1.0);
    index.insert(1, 10, 1, 2.0);
    index.insert(1, 20, 0, 3.0);
    index.insert(5, 10, 0, 4.0);

    index.remove(1, 10, 0);

    assert_eq!(index.get(1), vec![pack(1, 10, 1), pack(1, 20, 0)]);
    assert_eq!(index.reverse_get(10), vec![pack(10, 1, 1), pack(10, 5, 0)]);
    assert_eq!(index.get_weight(&pack(1, 10, 0)), None);
    assert_eq!(index.get_weight(&pack(1, 10, 1)), Some(2.0));
}

#[test]
fn absent_lookups_default() {
    let mut index = RelationIndex::new();
    index.insert(1, 2, 3, 4.0);

    assert!(index.get(999).is_empty());
    assert!(index.reverse_get(999).is_empty());
    assert_eq!(index.weight_or_default(&pack(7, 8, 9)), 0.0);
    assert_eq!(index.get_weight(&pack(7, 8, 9)), None);
}

#[test]
fn weight_tracks_latest_insert() {
    let mut index = RelationIndex::new();
    for weight in [0.5, -3.75, 1e-9, -0.0, 123_456.789] {
        index.insert(42, 43, 7, weight);
        assert_eq!(index.get_weight(&pack(42, 43, 7)), Some(weight));
        assert_eq!(index.reverse_weight(&pack(43, 42, 7)), Some(weight));
    }
    assert_eq!(index.len(), 1);
}

#[test]
fn returned_keys_decode_with_codec() {
    let mut index = RelationIndex::new();
    index.insert(3, 4, 5, 1.0);
    index.insert(6, 4, 2, 1.0);

    let forward: Vec<_> = index.get(3).iter().map(RelationKey::unpack).collect();
    assert_eq!(forward, vec![(3, 4, 5)]);

    let reverse: Vec<_> = index.reverse_get(4).iter().map(RelationKey::unpack).collect();
    assert_eq!(reverse, vec![(4, 3, 5), (4, 6, 2)]);

    for key in index.reverse_get(4) {
        assert!(index.contains(&key.mirrored()));
    }
}

#[test]
fn every_relation_has_its_mirror() {
    let mut index = RelationIndex::new();
    let mut rng = StdRng::seed_from_u64(7);
    for i in 0..500u64 {
        let source = rng.random_range(0..50u64);
        let target = rng.random_range(0..50u64);
        index.insert(source, target, (i % 3) as u16, i as f64);
        if i % 7 == 0 {
            index.remove(target, source, (i % 3) as u16);
        }
    }

    let mut reverse_total = 0;
    for node in 0..50 {
        for key in index.reverse_get(node) {
            let (target, source, rel_type) = key.unpack();
            assert_eq!(target, node);
            let forward = pack(source, target, rel_type);
            assert_eq!(index.get_weight(&forward), index.reverse_weight(&key));
            reverse_total += 1;
        }
    }
    assert_eq!(reverse_total, index.len());
}
