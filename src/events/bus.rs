use std::{borrow::Cow, rc::Rc};

use smallvec::SmallVec;

/// Well-known event asking visual components to burst apart.
pub const EXPLODE: &str = "prism-explode";
/// Well-known event asking visual components to settle back to rest.
pub const REFORM: &str = "panels-reform";

/// A named, payload-free signal passed between components within one frame.
///
/// Cloning never allocates: names are either `'static` or shared.
#[derive(Clone)]
pub struct SceneEvent {
    name: EventName,
}

#[derive(Clone)]
enum EventName {
    Static(&'static str),
    Shared(Rc<str>),
}

impl SceneEvent {
    pub fn new(name: impl Into<SceneEvent>) -> Self {
        name.into()
    }

    pub fn name(&self) -> &str {
        match &self.name {
            EventName::Static(name) => name,
            EventName::Shared(name) => name,
        }
    }
}

impl From<&'static str> for SceneEvent {
    fn from(name: &'static str) -> Self {
        Self {
            name: EventName::Static(name),
        }
    }
}

impl From<Rc<str>> for SceneEvent {
    fn from(name: Rc<str>) -> Self {
        Self {
            name: EventName::Shared(name),
        }
    }
}

impl From<String> for SceneEvent {
    fn from(name: String) -> Self {
        Rc::<str>::from(name).into()
    }
}

impl From<Cow<'static, str>> for SceneEvent {
    fn from(name: Cow<'static, str>) -> Self {
        match name {
            Cow::Borrowed(name) => name.into(),
            Cow::Owned(name) => name.into(),
        }
    }
}

impl PartialEq for SceneEvent {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for SceneEvent {}

impl std::hash::Hash for SceneEvent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl std::fmt::Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SceneEvent").field(&self.name()).finish()
    }
}

/// A component that reacts to scene events (surfaces, morph sets).
pub trait EventSink {
    fn on_event(&mut self, event: &SceneEvent);
}

/// Handle returned by [`EventBus::on`] / [`EventBus::on_any`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SceneEvent)>;

struct ListenerEntry {
    id: ListenerId,
    filter: Option<String>,
    callback: Listener,
}

/// Queued in-process publish/subscribe.
///
/// `emit` only enqueues; nothing runs until [`EventBus::dispatch`], which the scene calls once
/// per frame after every timeline has ticked.
#[derive(Default)]
pub struct EventBus {
    pending: SmallVec<[SceneEvent; 8]>,
    draining: SmallVec<[SceneEvent; 8]>,
    listeners: Vec<ListenerEntry>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: impl Into<SceneEvent>) {
        self.pending.push(event.into());
    }

    /// Events emitted since the last dispatch, in emission order.
    pub fn pending(&self) -> &[SceneEvent] {
        &self.pending
    }

    /// Subscribe `callback` to events named `name`.
    pub fn on(
        &mut self,
        name: impl Into<String>,
        callback: impl FnMut(&SceneEvent) + 'static,
    ) -> ListenerId {
        self.add_listener(Some(name.into()), Box::new(callback))
    }

    /// Subscribe `callback` to every event.
    pub fn on_any(&mut self, callback: impl FnMut(&SceneEvent) + 'static) -> ListenerId {
        self.add_listener(None, Box::new(callback))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    fn add_listener(&mut self, filter: Option<String>, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(ListenerEntry {
            id,
            filter,
            callback,
        });
        id
    }

    /// Deliver every pending event to `sinks` and then to matching listeners.
    ///
    /// Returns the number of events delivered.
    pub fn dispatch(&mut self, sinks: &mut [&mut dyn EventSink]) -> usize {
        std::mem::swap(&mut self.pending, &mut self.draining);
        let Self {
            draining,
            listeners,
            ..
        } = self;

        for event in draining.iter() {
            tracing::debug!(event = event.name(), "dispatch scene event");
            for sink in sinks.iter_mut() {
                sink.on_event(event);
            }
            for listener in listeners.iter_mut() {
                let matches = listener
                    .filter
                    .as_deref()
                    .is_none_or(|name| name == event.name());
                if matches {
                    (listener.callback)(event);
                }
            }
        }

        let delivered = draining.len();
        draining.clear();
        delivered
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/bus.rs"]
mod tests;
