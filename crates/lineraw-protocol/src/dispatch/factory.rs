//! Handler factories backing the dispatch tables.

use std::sync::Arc;

/// Produces the handler to invoke for a dispatched token.
///
/// `H` is kept unsized so one factory trait serves both handler roles
/// through `dyn` tables.
pub trait HandlerFactory<H: ?Sized>: Send + Sync {
    /// Returns the handler for the current command.
    fn handler(&self) -> Arc<H>;
}

/// Factory that hands out the same handler instance for every command.
///
/// The common case: handlers here are stateless or internally synchronised,
/// so one instance serves the whole session.
pub struct SharedHandler<H: ?Sized> {
    handler: Arc<H>,
}

impl<H: ?Sized> SharedHandler<H> {
    /// Wraps `handler` as a singleton factory.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

impl<H: ?Sized + Send + Sync> HandlerFactory<H> for SharedHandler<H> {
    fn handler(&self) -> Arc<H> {
        Arc::clone(&self.handler)
    }
}

/// Convenience for registering a singleton handler in a dispatch table.
pub fn shared<H: ?Sized + Send + Sync + 'static>(handler: Arc<H>) -> Arc<dyn HandlerFactory<H>> {
    Arc::new(SharedHandler::new(handler))
}
