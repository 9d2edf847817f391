use bucketmap::BucketMap;

#[test]
fn test_get_after_delete() {
    let mut map = BucketMap::with_capacity(16).unwrap();

    for i in 0..10 {
        map.set(format!("key_{}", i), format!("value_{}", i)).unwrap();
    }

    println!("Initial data inserted");

    for i in (0..10).step_by(2) {
        let removed = map.delete(format!("key_{}", i)).unwrap();
        assert_eq!(removed, Some(format!("value_{}", i)));
    }

    println!("even keys deleted");

    for i in 0..10 {
        let result = map.get(format!("key_{}", i)).unwrap();
        println!("get({}) = {:?}", i, result);

        if i % 2 == 0 {
            assert_eq!(result, None, "Deleted key {} should not exist", i);
        } else {
            assert_eq!(result, Some(&format!("value_{}", i)), "Key {} should still exist", i);
        }
    }
    assert_eq!(map.len(), 5);
}

#[test]
fn test_delete_missing_is_noop() {
    let mut map = BucketMap::with_capacity(4).unwrap();
    map.set("present", 1).unwrap();

    assert_eq!(map.delete("absent").unwrap(), None);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("present").unwrap(), Some(&1));

    // never-touched bucket
    let empty: BucketMap<i32> = BucketMap::with_capacity(4).unwrap();
    assert_eq!(empty.get("anything").unwrap(), None);
}

#[test]
fn test_delete_then_reinsert() {
    let mut map = BucketMap::with_capacity(1).unwrap();
    for i in 0..50 {
        map.set(format!("k{}", i), i).unwrap();
    }
    for i in 0..50 {
        assert_eq!(map.delete(format!("k{}", i)).unwrap(), Some(i));
        map.set(format!("k{}", i), i + 100).unwrap();
    }
    assert_eq!(map.len(), 50);
    for i in 0..50 {
        assert_eq!(map.get(format!("k{}", i)).unwrap(), Some(&(i + 100)));
    }
}
