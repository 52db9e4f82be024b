/*
 *  meter/listener.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Click notifications and the listener registry
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;

/// Receives user clicks on a meter. Calls arrive synchronously on the UI
/// thread, in registration order.
pub trait MeterListener {
    fn clip_light_clicked(&self, channel: usize);

    fn max_level_clicked(&self, channel: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterEvent {
    ClipLightClicked(usize),
    MaxLevelClicked(usize),
}

impl MeterEvent {
    pub fn channel(&self) -> usize {
        match *self {
            MeterEvent::ClipLightClicked(ch) | MeterEvent::MaxLevelClicked(ch) => ch,
        }
    }

    fn deliver(self, listener: &dyn MeterListener) {
        match self {
            MeterEvent::ClipLightClicked(ch) => listener.clip_light_clicked(ch),
            MeterEvent::MaxLevelClicked(ch) => listener.max_level_clicked(ch),
        }
    }
}

#[derive(Default)]
struct Registry {
    listeners: Vec<Rc<dyn MeterListener>>,
    closed: bool,
}

#[inline]
fn same<L: MeterListener + ?Sized>(a: &Rc<dyn MeterListener>, b: &Rc<L>) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// Ordered set of listeners, unique by identity.
///
/// Cloning yields another handle to the same registry, so a listener may keep
/// one and remove itself (or others) while an event is being delivered.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. Returns false if it was already registered or the
    /// registry has been closed.
    pub fn add(&self, listener: Rc<dyn MeterListener>) -> bool {
        let mut reg = self.inner.borrow_mut();
        if reg.closed {
            warn!("listener added to a closed meter, ignored");
            return false;
        }
        if reg.listeners.iter().any(|l| same(l, &listener)) {
            return false;
        }
        reg.listeners.push(listener);
        true
    }

    /// Returns false if the listener was not registered.
    pub fn remove<L: MeterListener + ?Sized>(&self, listener: &Rc<L>) -> bool {
        let mut reg = self.inner.borrow_mut();
        let before = reg.listeners.len();
        reg.listeners.retain(|l| !same(l, listener));
        reg.listeners.len() != before
    }

    pub fn contains<L: MeterListener + ?Sized>(&self, listener: &Rc<L>) -> bool {
        self.inner.borrow().listeners.iter().any(|l| same(l, listener))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Deliver `event` to every listener registered when dispatch starts.
    ///
    /// Listeners removed by an earlier callback of the same dispatch are
    /// skipped; listeners added during it only see later events. Returns the
    /// number of listeners called.
    pub fn notify(&self, event: MeterEvent) -> usize {
        let snapshot: Vec<Rc<dyn MeterListener>> = self.inner.borrow().listeners.clone();
        let mut delivered = 0;
        for listener in snapshot {
            // no borrow is held across the callback
            let live = {
                let reg = self.inner.borrow();
                !reg.closed && reg.listeners.iter().any(|l| same(l, &listener))
            };
            if !live {
                continue;
            }
            event.deliver(listener.as_ref());
            delivered += 1;
        }
        debug!("{:?} delivered to {} listener(s)", event, delivered);
        delivered
    }

    /// Drop every listener and refuse new ones. Used on meter teardown.
    pub fn close(&self) {
        let mut reg = self.inner.borrow_mut();
        reg.closed = true;
        reg.listeners.clear();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reg = self.inner.borrow();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &reg.listeners.len())
            .field("closed", &reg.closed)
            .finish()
    }
}

/// Forwards notifications into a tokio channel, for hosts that handle
/// clicks in an async task.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: UnboundedSender<MeterEvent>,
}

impl ChannelListener {
    pub fn new(tx: UnboundedSender<MeterEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: MeterEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver gone, dropped {:?}", event);
        }
    }
}

impl MeterListener for ChannelListener {
    fn clip_light_clicked(&self, channel: usize) {
        self.send(MeterEvent::ClipLightClicked(channel));
    }

    fn max_level_clicked(&self, channel: usize) {
        self.send(MeterEvent::MaxLevelClicked(channel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        clips: Cell<usize>,
        maxes: Cell<usize>,
    }

    impl MeterListener for Counter {
        fn clip_light_clicked(&self, _channel: usize) {
            self.clips.set(self.clips.get() + 1);
        }
        fn max_level_clicked(&self, _channel: usize) {
            self.maxes.set(self.maxes.get() + 1);
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let reg = ListenerRegistry::new();
        let a = Rc::new(Counter::default());
        assert!(reg.add(a.clone()));
        assert!(!reg.add(a.clone()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.notify(MeterEvent::ClipLightClicked(0)), 1);
        assert_eq!(a.clips.get(), 1);
    }

    #[test]
    fn test_remove() {
        let reg = ListenerRegistry::new();
        let a = Rc::new(Counter::default());
        let b = Rc::new(Counter::default());
        reg.add(a.clone());
        reg.add(b.clone());
        assert!(reg.remove(&a));
        assert!(!reg.remove(&a));
        assert!(!reg.contains(&a));
        assert!(reg.contains(&b));
        reg.notify(MeterEvent::MaxLevelClicked(1));
        assert_eq!(a.maxes.get(), 0);
        assert_eq!(b.maxes.get(), 1);
    }

    #[test]
    fn test_closed_registry_is_silent() {
        let reg = ListenerRegistry::new();
        let a = Rc::new(Counter::default());
        reg.add(a.clone());
        reg.close();
        assert!(reg.is_empty());
        assert!(!reg.add(a.clone()));
        assert_eq!(reg.notify(MeterEvent::ClipLightClicked(0)), 0);
        assert_eq!(a.clips.get(), 0);
    }

    struct RemovesOther {
        reg: ListenerRegistry,
        victim: Rc<Counter>,
    }

    impl MeterListener for RemovesOther {
        fn clip_light_clicked(&self, _channel: usize) {
            self.reg.remove(&self.victim);
        }
        fn max_level_clicked(&self, _channel: usize) {}
    }

    #[test]
    fn test_removed_mid_dispatch_is_skipped() {
        let reg = ListenerRegistry::new();
        let victim = Rc::new(Counter::default());
        let remover = Rc::new(RemovesOther {
            reg: reg.clone(),
            victim: victim.clone(),
        });
        reg.add(remover);
        reg.add(victim.clone());
        assert_eq!(reg.notify(MeterEvent::ClipLightClicked(3)), 1);
        assert_eq!(victim.clips.get(), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_channel_listener_forwards() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let reg = ListenerRegistry::new();
        reg.add(Rc::new(ChannelListener::new(tx)));
        reg.notify(MeterEvent::ClipLightClicked(2));
        reg.notify(MeterEvent::MaxLevelClicked(0));
        assert_eq!(rx.try_recv(), Ok(MeterEvent::ClipLightClicked(2)));
        assert_eq!(rx.try_recv().map(|e| e.channel()), Ok(0));
        assert!(rx.try_recv().is_err());
    }
}
