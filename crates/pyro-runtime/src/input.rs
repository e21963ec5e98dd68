//! Per-frame input events

/// Input the driver forwards to an effect's `update`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer click in screen-space pixels
    Click { x: f32, y: f32 },
    /// The drawable surface changed size
    Resize { width: f32, height: f32 },
}

/// A simple event queue the driver pushes to and drains once per frame
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event onto the queue
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all events from the queue, returning them
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut queue = InputQueue::new();
        assert!(queue.is_empty());

        queue.push(InputEvent::Click { x: 10.0, y: 20.0 });
        queue.push(InputEvent::Resize {
            width: 800.0,
            height: 600.0,
        });

        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], InputEvent::Click { x: 10.0, y: 20.0 });
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::Click { x: 0.0, y: 0.0 });

        let _ = queue.drain();
        let events = queue.drain();
        assert!(events.is_empty());
    }
}
