use std::marker::PhantomData;

/// A strict "less-than" ordering over keys.
///
/// Two keys are considered equal when neither is less than the other, so a
/// comparator fully determines both ordering and key identity inside a list.
pub trait Comparator<K>: Send + Sync {
    fn less(&self, a: &K, b: &K) -> bool;

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug)]
pub struct Natural<K>(PhantomData<fn(&K)>);

impl<K> Default for Natural<K> {
    fn default() -> Self {
        Natural(PhantomData)
    }
}

impl<K: Ord> Comparator<K> for Natural<K> {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> bool + Send + Sync,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}
