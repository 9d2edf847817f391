//! BucketMap: a string-keyed two-level hash map. A fixed primary table of
//! buckets, each bucket its own growable open-addressed table.
//!
//! Single-threaded; wrap it in a mutex to share it.

use std::fmt;

use tracing::{debug, warn};

pub mod bucket;
pub mod dispose;
pub mod error;
pub mod key;

pub use bucket::{BucketStats, INITIAL_BUCKET_CAPACITY};
pub use dispose::{DropValue, Dispose};
pub use error::{Error, InsertError};
pub use key::{derive_key, AHashKeys, Key, KeyHasher, Xxh3Keys};

use bucket::{Bucket, Slot};

/// Primary capacity used by [`BucketMap::new`].
pub const DEFAULT_PRIMARY_CAPACITY: usize = 1024;

pub struct BucketMap<V, H = AHashKeys, D = DropValue>
where
    D: Dispose<V>,
{
    buckets: Vec<Bucket<V>>, // length fixed at creation
    hasher: H,
    disposer: D,
    scratch: Vec<Slot<V>>, // reused by every rehash, always empty between calls
    len: usize,
}

impl<V> BucketMap<V> {
    /// Creates a map with [`DEFAULT_PRIMARY_CAPACITY`] buckets, the default
    /// hasher, and values dropped in place.
    pub fn new() -> Self {
        let mut buckets = Vec::with_capacity(DEFAULT_PRIMARY_CAPACITY);
        buckets.resize_with(DEFAULT_PRIMARY_CAPACITY, Bucket::new);
        Self {
            buckets,
            hasher: AHashKeys::default(),
            disposer: DropValue,
            scratch: Vec::new(),
            len: 0,
        }
    }

    /// Creates a map with `primary_capacity` buckets.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroCapacity`] if `primary_capacity` is 0,
    /// [`Error::Alloc`] if the primary table cannot be allocated.
    pub fn with_capacity(primary_capacity: usize) -> Result<Self, Error> {
        Self::create(primary_capacity, Some(AHashKeys::default()), DropValue)
    }
}

impl<V> Default for BucketMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H: KeyHasher> BucketMap<V, H> {
    pub fn with_hasher(primary_capacity: usize, hasher: H) -> Result<Self, Error> {
        Self::create(primary_capacity, Some(hasher), DropValue)
    }
}

impl<V, H, D> BucketMap<V, H, D>
where
    H: KeyHasher,
    D: Dispose<V>,
{
    pub fn with_hasher_and_disposer(
        primary_capacity: usize,
        hasher: H,
        disposer: D,
    ) -> Result<Self, Error> {
        Self::create(primary_capacity, Some(hasher), disposer)
    }

    /// Creates a map of `primary_capacity` buckets hashing keys with `hasher`
    /// and handing overwritten or leftover values to `disposer`.
    ///
    /// Buckets start empty and allocate on their first insertion.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroCapacity`] - `primary_capacity` is 0.
    /// * [`Error::MissingHasher`] - `hasher` is `None`.
    /// * [`Error::Alloc`] - the primary table could not be allocated.
    pub fn create(primary_capacity: usize, hasher: Option<H>, disposer: D) -> Result<Self, Error> {
        if primary_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let hasher = hasher.ok_or(Error::MissingHasher)?;

        let mut buckets = Vec::new();
        if let Err(e) = buckets.try_reserve_exact(primary_capacity) {
            warn!(primary_capacity, error = %e, "primary table allocation failed");
            return Err(e.into());
        }
        buckets.resize_with(primary_capacity, Bucket::new);

        Ok(Self {
            buckets,
            hasher,
            disposer,
            scratch: Vec::new(),
            len: 0,
        })
    }

    /// Number of buckets in the primary table. Fixed for the map's lifetime.
    #[inline]
    pub fn primary_capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Hash `key` into its two-part form.
    #[inline]
    pub fn derive_key(&self, key: &[u8]) -> Result<Key, Error> {
        derive_key(&self.hasher, key)
    }

    #[inline]
    fn bucket_index(&self, key: Key) -> usize {
        key.primary as usize % self.buckets.len()
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyKey`] if `key` is empty. An absent key is `Ok(None)`.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<&V>, Error> {
        let key = self.derive_key(key.as_ref())?;
        Ok(self.buckets[self.bucket_index(key)].get(key))
    }

    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Result<Option<&mut V>, Error> {
        let key = self.derive_key(key.as_ref())?;
        let idx = self.bucket_index(key);
        Ok(self.buckets[idx].get_mut(key))
    }

    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Stores `value` under `key`.
    ///
    /// A value already stored under `key` is passed to the disposer. The
    /// bucket grows first if it is at its load threshold.
    ///
    /// # Errors
    ///
    /// Returns the value back inside [`InsertError`] when the key is empty
    /// or growth fails; the map is unchanged in both cases.
    pub fn set<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Result<(), InsertError<V>> {
        let key = match self.derive_key(key.as_ref()) {
            Ok(key) => key,
            Err(error) => return Err(InsertError { error, value }),
        };
        let idx = self.bucket_index(key);

        if let Err(error) = self.grow_if_needed(idx) {
            return Err(InsertError { error, value });
        }

        match self.buckets[idx].insert(key, value) {
            Some(old) => self.disposer.dispose(old),
            None => self.len += 1,
        }
        Ok(())
    }

    fn grow_if_needed(&mut self, idx: usize) -> Result<(), Error> {
        let bucket = &mut self.buckets[idx];
        if !bucket.needs_grow() {
            return Ok(());
        }

        let old_capacity = bucket.capacity();
        let new_capacity = bucket.next_capacity();
        match bucket.grow(&mut self.scratch, new_capacity) {
            Ok(()) => {
                debug!(
                    bucket = idx,
                    count = bucket.count(),
                    old_capacity,
                    new_capacity,
                    "bucket grown"
                );
                Ok(())
            }
            Err(e) => {
                warn!(bucket = idx, old_capacity, new_capacity, error = %e, "bucket growth failed");
                Err(e.into())
            }
        }
    }

    /// Removes `key`, returning its value. The disposer is not called; the
    /// caller owns the value again.
    pub fn delete<K: AsRef<[u8]>>(&mut self, key: K) -> Result<Option<V>, Error> {
        let key = self.derive_key(key.as_ref())?;
        let idx = self.bucket_index(key);
        let removed = self.buckets[idx].remove(key);
        if removed.is_some() {
            self.len -= 1;
        }
        Ok(removed)
    }

    /// Calls `f` once for every stored entry. Order is unspecified.
    pub fn for_each<F: FnMut(Key, &V)>(&self, mut f: F) {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Iterates over stored entries in bucket order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: Box::new(self.buckets.iter().flat_map(|b| b.iter())),
            remaining: self.len,
        }
    }

    /// Capacity and occupancy of the bucket that `key` routes to.
    pub fn bucket_stats<K: AsRef<[u8]>>(&self, key: K) -> Result<BucketStats, Error> {
        let key = self.derive_key(key.as_ref())?;
        Ok(self.buckets[self.bucket_index(key)].stats())
    }

    /// Consumes the map, disposing of every value it still holds.
    pub fn destroy(self) {
        drop(self)
    }
}

impl<V, H, D> fmt::Debug for BucketMap<V, H, D>
where
    D: Dispose<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketMap")
            .field("primary_capacity", &self.buckets.len())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<V, H, D> Drop for BucketMap<V, H, D>
where
    D: Dispose<V>,
{
    fn drop(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.dispose_all(&mut self.disposer);
        }
        self.len = 0;
    }
}

/// Borrowing iterator over `(Key, &V)` pairs, from [`BucketMap::iter`].
pub struct Iter<'a, V> {
    inner: Box<dyn Iterator<Item = (Key, &'a V)> + 'a>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V, H, D> IntoIterator for &'a BucketMap<V, H, D>
where
    H: KeyHasher,
    D: Dispose<V>,
{
    type Item = (Key, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
