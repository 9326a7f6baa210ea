use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// State change reported by the playback widget.
///
/// Exactly one event per widget-originated change. `Ended` fires once per
/// completed track and is never repeated without a new `load`. `Error` is
/// advisory: the widget may still be playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Playing,
    Paused,
    Ended,
    Error,
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerEvent::Playing => "PLAYING",
            PlayerEvent::Paused => "PAUSED",
            PlayerEvent::Ended => "ENDED",
            PlayerEvent::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A player event stamped with the epoch of the `load` it belongs to.
///
/// Every `load` opens a new epoch; events still in flight for an older
/// epoch describe content that is no longer on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerUpdate {
    pub epoch: u64,
    pub event: PlayerEvent,
}

impl PlayerUpdate {
    pub fn new(epoch: u64, event: PlayerEvent) -> Self {
        Self { epoch, event }
    }
}

/// Fan-out of player events to every subscriber.
///
/// Subscribers whose receiver was dropped are forgotten on the next
/// broadcast.
#[derive(Clone, Default)]
pub struct PlayerEventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<PlayerUpdate>>>>,
}

impl PlayerEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<PlayerUpdate> {
        let (tx, rx) = unbounded_channel::<PlayerUpdate>();
        {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.push(tx);
        }
        rx
    }

    /// Sends `event` for the load `epoch` to every live subscriber.
    pub fn broadcast(&self, epoch: u64, event: PlayerEvent) {
        let update = PlayerUpdate::new(epoch, event);
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(update).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl fmt::Debug for PlayerEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives_events() {
        let bus = PlayerEventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.broadcast(1, PlayerEvent::Playing);
        bus.broadcast(2, PlayerEvent::Ended);

        assert_eq!(a.try_recv().unwrap(), PlayerUpdate::new(1, PlayerEvent::Playing));
        assert_eq!(a.try_recv().unwrap(), PlayerUpdate::new(2, PlayerEvent::Ended));
        assert_eq!(b.try_recv().unwrap().event, PlayerEvent::Playing);
        assert_eq!(b.try_recv().unwrap().epoch, 2);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = PlayerEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.broadcast(1, PlayerEvent::Paused);
        assert_eq!(bus.subscriber_count(), 1);
        drop(kept);
    }

    #[test]
    fn test_display_uses_widget_names() {
        assert_eq!(PlayerEvent::Playing.to_string(), "PLAYING");
        assert_eq!(PlayerEvent::Error.to_string(), "ERROR");
    }
}
