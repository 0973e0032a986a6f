//! Message routing: the outer dispatch table and the handler contract.
//!
//! Dispatch is two-level: the channel resolves a handler through a
//! caller-supplied [`Dispatch`] table keyed however the caller likes
//! (message id, session id, …), and the resolved [`MessageHandler`]
//! interprets the message id and arguments. [`Router`] is the ready-made
//! id-keyed table.

use std::collections::HashMap;

use wirechan_transport::Transport;
use wirechan_wire::WireValue;

use crate::channel::Channel;

/// Handles one dispatched message.
///
/// The argument slice is only valid for the duration of the call; copy out
/// anything needed afterwards. The returned status is opaque to the channel
/// and passed through [`Channel::receive`] verbatim.
pub trait MessageHandler<T: Transport> {
    fn on_message(&mut self, msg_id: u32, channel: &mut Channel<T>, args: &[WireValue]) -> usize;
}

impl<T, F> MessageHandler<T> for F
where
    T: Transport,
    F: FnMut(u32, &mut Channel<T>, &[WireValue]) -> usize,
{
    fn on_message(&mut self, msg_id: u32, channel: &mut Channel<T>, args: &[WireValue]) -> usize {
        self(msg_id, channel, args)
    }
}

/// The caller-supplied outer routing table.
pub trait Dispatch<T: Transport> {
    /// Resolve a handler for a decoded message id, or `None` if the id is
    /// unroutable.
    fn resolve(&mut self, msg_id: u32) -> Option<&mut (dyn MessageHandler<T> + 'static)>;
}

/// Id-keyed dispatch table backed by a `HashMap`.
pub struct Router<T: Transport> {
    routes: HashMap<u32, Box<dyn MessageHandler<T>>>,
}

impl<T: Transport> Router<T> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register a handler for `msg_id`, replacing any previous one.
    /// Builder-style; see [`Router::add_route`] for the in-place form.
    pub fn route(mut self, msg_id: u32, handler: impl MessageHandler<T> + 'static) -> Self {
        self.add_route(msg_id, handler);
        self
    }

    /// Register a handler for `msg_id` in place.
    pub fn add_route(&mut self, msg_id: u32, handler: impl MessageHandler<T> + 'static) {
        self.routes.insert(msg_id, Box::new(handler));
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<T: Transport> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Dispatch<T> for Router<T> {
    fn resolve(&mut self, msg_id: u32) -> Option<&mut (dyn MessageHandler<T> + 'static)> {
        self.routes.get_mut(&msg_id).map(|handler| handler.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use wirechan_transport::LoopbackTransport;

    use super::*;

    #[test]
    fn router_resolves_registered_ids() {
        let mut router: Router<LoopbackTransport> = Router::new()
            .route(1, |_id: u32, _ch: &mut Channel<LoopbackTransport>, _args: &[WireValue]| 0)
            .route(2, |_id: u32, _ch: &mut Channel<LoopbackTransport>, _args: &[WireValue]| 0);

        assert_eq!(router.len(), 2);
        assert!(router.resolve(1).is_some());
        assert!(router.resolve(2).is_some());
        assert!(router.resolve(3).is_none());
    }

    #[test]
    fn later_route_replaces_earlier() {
        let mut router: Router<LoopbackTransport> = Router::new();
        router.add_route(7, |_id: u32, _ch: &mut Channel<LoopbackTransport>, _args: &[WireValue]| 1);
        router.add_route(7, |_id: u32, _ch: &mut Channel<LoopbackTransport>, _args: &[WireValue]| 2);
        assert_eq!(router.len(), 1);
    }
}
