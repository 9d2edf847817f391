/// Disposal strategy for values the map still owns when they are
/// overwritten by [`set`](crate::BucketMap::set) or when the map is dropped.
///
/// Values removed with [`delete`](crate::BucketMap::delete) go back to the
/// caller and never reach the disposer.
pub trait Dispose<V> {
    fn dispose(&mut self, value: V);
}

/// Drops values in place. Used when no disposer is registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct DropValue;

impl<V> Dispose<V> for DropValue {
    #[inline]
    fn dispose(&mut self, value: V) {
        drop(value);
    }
}

impl<V, F> Dispose<V> for F
where
    F: FnMut(V),
{
    #[inline]
    fn dispose(&mut self, value: V) {
        self(value)
    }
}
