/// Capability contract for resources managed by a [`Pool`](crate::Pool).
///
/// The pool drives these methods at fixed points in a resource's lifecycle;
/// the implementation decides what liveness, cleanup, and teardown mean for
/// the underlying handle (a connection, buffer, file handle, etc).
pub trait Resource: Send + 'static {
    /// Cheap liveness probe, checked before a parked resource is handed out
    /// again. Returning `false` causes the pool to dispose of the resource
    /// and fetch or create another.
    fn is_usable(&self) -> bool;

    /// Restore the resource to a clean reusable state. Called after every
    /// borrow, just before the resource re-enters the free-list.
    fn reset(&mut self);

    /// Irreversibly release the underlying system resources.
    ///
    /// The pool calls this exactly once per instance: on a failed usability
    /// probe, on eviction by the reaper, or at shutdown. Taking `self` by
    /// value makes a second call unrepresentable.
    fn dispose(self);
}
