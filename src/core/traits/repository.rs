use std::collections::HashMap;

/// Synchronous lookup capability injected into the calculation core.
///
/// Implementations may be backed by storage, a remote service, or a
/// caller-owned request-scoped map. `None` means the entity no longer exists.
pub trait Resolver<T>: Send + Sync {
    fn resolve(&self, id: &str) -> Option<T>;
}

impl<T: Clone + Send + Sync> Resolver<T> for HashMap<String, T> {
    fn resolve(&self, id: &str) -> Option<T> {
        self.get(id).cloned()
    }
}

impl<T, R: Resolver<T> + ?Sized> Resolver<T> for &R {
    fn resolve(&self, id: &str) -> Option<T> {
        (**self).resolve(id)
    }
}
