use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone)]
pub enum Event {
    /// First event after start-up.
    Init,
    Render,
    /// Terminal was resized; redraw right away.
    Resize,
    Key(KeyEvent),
}

impl Event {
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Terminal key presses plus a render clock, delivered on one channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut render_interval = interval(render_rate);
            tx.send(Event::Init).ok();

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = render_interval.tick() => {
                        tx.send(Event::Render).ok();
                    }
                    Some(Ok(evt)) = reader.next() => match evt {
                        CrosstermEvent::Key(key) if key.kind == event::KeyEventKind::Press => {
                            tx.send(Event::Key(key)).ok();
                        }
                        CrosstermEvent::Resize(..) => {
                            tx.send(Event::Resize).ok();
                        }
                        _ => {}
                    },
                }
            }
        });

        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ctrl_c_quits_unconditionally() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let plain_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(ctrl_c.is_quit());
        assert!(!plain_c.is_quit());
        assert!(!Event::Resize.is_quit());
    }
}
