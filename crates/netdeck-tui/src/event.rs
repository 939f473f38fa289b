//! Terminal event reader — keyboard, mouse, resize, tick, and render events.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Events the application loop consumes.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// A key press. Repeats and releases are filtered out.
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Periodic tick for time-based state (toast expiry, data-age display).
    Tick,
    /// Frame-rate heartbeat; the app draws on this event.
    Render,
}

/// Merges crossterm's [`EventStream`] with tick and render intervals into a
/// single channel the app loop can await.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut stream = EventStream::new();
            let mut tick = interval(tick_rate);
            let mut render = interval(render_rate);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            render.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break,

                    maybe = stream.next() => {
                        let event = match maybe {
                            Some(Ok(CrosstermEvent::Key(key)))
                                if key.kind == KeyEventKind::Press =>
                            {
                                Event::Key(key)
                            }
                            Some(Ok(CrosstermEvent::Mouse(mouse))) => Event::Mouse(mouse),
                            Some(Ok(CrosstermEvent::Resize(w, h))) => Event::Resize(w, h),
                            Some(Ok(_)) => continue,
                            Some(Err(_)) | None => break,
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }

                    _ = tick.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }

                    _ = render.tick() => {
                        if tx.send(Event::Render).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Stop the background reader task.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.stop();
    }
}
