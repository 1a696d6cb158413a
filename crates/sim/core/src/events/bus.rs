//! Tag-keyed subscriber registry.
//!
//! The bus only stores handlers. Delivery lives on
//! [`Simulation`](crate::Simulation) because handlers need mutable access to
//! the whole simulation while they run.

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use super::{Event, EventTag};
use crate::engine::Simulation;

/// Event handler. Returning `true` unsubscribes it.
pub type Handler = Rc<dyn Fn(&mut Simulation, &Event) -> bool>;

type SubscriberId = Cow<'static, str>;

struct Subscription {
    id: SubscriberId,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventTag, Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `(tag, id)`.
    ///
    /// An existing registration with the same id is replaced in place and
    /// keeps its position. Returns `true` when a registration was replaced.
    pub fn subscribe(
        &mut self,
        tag: EventTag,
        id: impl Into<Cow<'static, str>>,
        handler: Handler,
    ) -> bool {
        let id = id.into();
        let subs = self.subscribers.entry(tag).or_default();
        if let Some(existing) = subs.iter_mut().find(|s| s.id == id) {
            existing.handler = handler;
            true
        } else {
            subs.push(Subscription { id, handler });
            false
        }
    }

    /// Removes the registration `(tag, id)`. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, tag: EventTag, id: &str) -> bool {
        let Some(subs) = self.subscribers.get_mut(&tag) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.id != id);
        before != subs.len()
    }

    pub fn subscriber_count(&self, tag: EventTag) -> usize {
        self.subscribers.get(&tag).map_or(0, Vec::len)
    }

    pub fn is_subscribed(&self, tag: EventTag, id: &str) -> bool {
        self.subscribers
            .get(&tag)
            .is_some_and(|subs| subs.iter().any(|s| s.id == id))
    }

    /// Copy of the current subscriber list for `tag`, in registration order.
    pub(crate) fn snapshot(&self, tag: EventTag) -> Vec<(SubscriberId, Handler)> {
        self.subscribers
            .get(&tag)
            .map(|subs| {
                subs.iter()
                    .map(|s| (s.id.clone(), Rc::clone(&s.handler)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes `(tag, id)` only if it still holds `handler`.
    ///
    /// A handler that asked to be removed may have been replaced by a new
    /// registration under the same id while it ran; that one stays.
    pub(crate) fn remove_if_same(&mut self, tag: EventTag, id: &str, handler: &Handler) {
        if let Some(subs) = self.subscribers.get_mut(&tag) {
            subs.retain(|s| s.id != id || !Rc::ptr_eq(&s.handler, handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::events::{Event, EventArg, EventTag};
    use crate::Simulation;

    fn ping() -> Event {
        Event::Custom {
            tag: "ping",
            args: vec![EventArg::Int(1)],
        }
    }

    const PING: EventTag = EventTag::Custom("ping");

    #[test]
    fn subscribers_run_in_registration_order() {
        let mut sim = Simulation::for_tests();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let l = Rc::clone(&log);
            sim.subscribe(PING, name, move |_, _| {
                l.borrow_mut().push(name);
                false
            });
        }
        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_id_replaces_in_place() {
        let mut sim = Simulation::for_tests();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (id, label) in [("a", "a1"), ("b", "b1"), ("a", "a2")] {
            let l = Rc::clone(&log);
            sim.subscribe(PING, id, move |_, _| {
                l.borrow_mut().push(label);
                false
            });
        }
        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["a2", "b1"]);
        assert_eq!(sim.bus().subscriber_count(PING), 2);
    }

    #[test]
    fn returning_true_unsubscribes() {
        let mut sim = Simulation::for_tests();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        sim.subscribe(PING, "once", move |_, _| {
            *c.borrow_mut() += 1;
            true
        });
        sim.publish(ping());
        sim.publish(ping());
        assert_eq!(*count.borrow(), 1);
        assert!(!sim.bus().is_subscribed(PING, "once"));
    }

    #[test]
    fn subscriptions_made_during_publish_wait_for_next_publish() {
        let mut sim = Simulation::for_tests();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        sim.subscribe(PING, "spawner", move |sim, _| {
            l.borrow_mut().push("spawner");
            let inner = Rc::clone(&l);
            sim.subscribe(PING, "late", move |_, _| {
                inner.borrow_mut().push("late");
                false
            });
            false
        });

        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["spawner"]);
        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["spawner", "spawner", "late"]);
    }

    #[test]
    fn unsubscribing_a_later_handler_mid_publish_does_not_skip_it() {
        let mut sim = Simulation::for_tests();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        sim.subscribe(PING, "first", move |sim, _| {
            l.borrow_mut().push("first");
            sim.unsubscribe(PING, "second");
            false
        });
        let l = Rc::clone(&log);
        sim.subscribe(PING, "second", move |_, _| {
            l.borrow_mut().push("second");
            false
        });

        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        sim.publish(ping());
        assert_eq!(*log.borrow(), vec!["first", "second", "first"]);
    }

    #[test]
    fn nested_publish_reaches_the_running_handler() {
        let mut sim = Simulation::for_tests();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        sim.subscribe(PING, "echo", move |sim, event| {
            let depth = {
                let mut c = c.borrow_mut();
                *c += 1;
                *c
            };
            if depth < 3 {
                sim.publish(event.clone());
            }
            false
        });
        sim.publish(ping());
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn other_tags_are_not_delivered() {
        let mut sim = Simulation::for_tests();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        sim.subscribe(EventTag::Custom("pong"), "x", move |_, _| {
            *c.borrow_mut() += 1;
            false
        });
        sim.publish(ping());
        assert_eq!(*count.borrow(), 0);
    }
}
