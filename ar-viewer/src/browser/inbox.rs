use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::ar::geolocation::GeoFix;
use crate::engine::viewer::errors::Capability;

/// Results of browser callbacks, delivered to systems on the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    CameraStream {
        generation: u64,
        result: Result<(), String>,
    },
    PermissionProbe {
        capability: Capability,
        result: Result<(), String>,
    },
    Position(Result<GeoFix, String>),
    Orientation {
        beta: Option<f64>,
        gamma: Option<f64>,
    },
    ContextLost,
}

/// Queue shared with JS callbacks. Callbacks only push; systems drain.
#[derive(Resource, Clone, Default)]
pub struct BrowserInbox(Arc<Mutex<Vec<BrowserEvent>>>);

impl BrowserInbox {
    pub fn push(&self, event: BrowserEvent) {
        match self.0.lock() {
            Ok(mut queue) => queue.push(event),
            Err(_) => error!("Browser inbox poisoned, dropping {:?}", event),
        }
    }

    pub fn drain(&self) -> Vec<BrowserEvent> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

#[derive(Event, Debug, Clone)]
pub struct BrowserEventReceived(pub BrowserEvent);

pub fn dispatch_browser_events(
    inbox: Res<BrowserInbox>,
    mut events: EventWriter<BrowserEventReceived>,
) {
    for event in inbox.drain() {
        events.write(BrowserEventReceived(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let inbox = BrowserInbox::default();
        let callback_side = inbox.clone();
        callback_side.push(BrowserEvent::ContextLost);
        callback_side.push(BrowserEvent::Orientation {
            beta: Some(45.0),
            gamma: None,
        });

        let drained = inbox.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], BrowserEvent::ContextLost);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_dispatch_writes_events() {
        let mut app = App::new();
        app.init_resource::<BrowserInbox>()
            .add_event::<BrowserEventReceived>()
            .add_systems(Update, dispatch_browser_events);

        app.world().resource::<BrowserInbox>().push(BrowserEvent::ContextLost);
        app.update();

        let events = app.world().resource::<Events<BrowserEventReceived>>();
        let mut cursor = events.get_cursor();
        let received: Vec<_> = cursor.read(events).collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, BrowserEvent::ContextLost);
    }
}
