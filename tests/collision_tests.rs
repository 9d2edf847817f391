use bucketmap::{BucketMap, BucketStats, Key};

// Primary is the first byte, secondary the byte sum of the rest, so keys
// sharing a first letter share a bucket.
fn collision_hash(key: &[u8]) -> u64 {
    let primary = key[0] as u64;
    let secondary: u32 = key[1..].iter().map(|&b| b as u32).sum();
    primary | ((secondary as u64) << 32)
}

#[test_log::test]
fn test_collisions_and_bucket_growth() {
    let mut map = BucketMap::with_hasher(1, collision_hash).unwrap();

    for i in 0..10 {
        map.set(format!("a_key_{}", i), format!("value_{}", i)).unwrap();
    }

    for i in 0..10 {
        assert_eq!(
            map.get(format!("a_key_{}", i)).unwrap(),
            Some(&format!("value_{}", i)),
            "key {} lost after growth",
            i
        );
    }

    assert_eq!(
        map.bucket_stats("a").unwrap(),
        BucketStats {
            capacity: 16,
            count: 10
        }
    );
}

#[test_log::test]
fn test_growth_sequence_in_one_bucket() {
    let mut map = BucketMap::with_hasher(3, |k: &[u8]| (k.len() as u64) << 32).unwrap();
    let mut capacities = vec![map.bucket_stats("x").unwrap().capacity];

    for n in 1..=70 {
        map.set(vec![b'x'; n], n).unwrap();
        let stats = map.bucket_stats("x").unwrap();
        assert!(stats.count < stats.capacity);
        if capacities.last() != Some(&stats.capacity) {
            capacities.push(stats.capacity);
        }
    }

    assert_eq!(capacities, vec![0, 8, 16, 32, 64, 128]);
    for n in 1..=70 {
        assert_eq!(map.get(vec![b'x'; n]).unwrap(), Some(&n));
    }
}

#[test]
fn test_buckets_are_independent() {
    let mut map = BucketMap::with_hasher(128, collision_hash).unwrap();

    for i in 0..9 {
        map.set(format!("a{}", i), i).unwrap();
    }
    map.set("b1", 100).unwrap();

    assert_eq!(map.bucket_stats("a").unwrap().capacity, 16);
    assert_eq!(
        map.bucket_stats("b").unwrap(),
        BucketStats {
            capacity: 8,
            count: 1
        }
    );
    assert_eq!(map.bucket_stats("c").unwrap(), BucketStats::default());
}

#[test]
fn test_full_hash_collision_is_same_key() {
    // same first byte and same byte sum
    let mut map = BucketMap::with_hasher(8, collision_hash).unwrap();
    map.set("abc", 1).unwrap();
    map.set("acb", 2).unwrap();

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("abc").unwrap(), Some(&2));
    assert_eq!(map.derive_key(b"abc").unwrap(), map.derive_key(b"acb").unwrap());
    assert_eq!(
        map.derive_key(b"abc").unwrap(),
        Key {
            primary: b'a' as u32,
            secondary: (b'b' + b'c') as u32
        }
    );
}

#[test]
fn test_iteration_reports_derived_keys() {
    let mut map = BucketMap::with_hasher(4, collision_hash).unwrap();
    map.set("xy", ()).unwrap();

    let keys: Vec<Key> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![Key {
            primary: b'x' as u32,
            secondary: b'y' as u32
        }]
    );
}
