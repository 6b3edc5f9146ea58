use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::trace;

use crate::domain::{DGConfig, DGError, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DGConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Poll for one terminal event and map it to a Message. While the
    /// command line is active every key press goes through raw, so the
    /// line editor sees the unmapped event.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DGError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width, height)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),

            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveTop),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveBottom),

            KeyCode::PageDown | KeyCode::Char('n') => Some(Message::PageNext),
            KeyCode::PageUp | KeyCode::Char('p') => Some(Message::PagePrev),
            KeyCode::Char('z') => Some(Message::CyclePageSize),

            KeyCode::Char('/') => Some(Message::EnterQuery),
            KeyCode::Char('f') => Some(Message::EnterColumnFilter),
            KeyCode::Char('F') => Some(Message::ClearFilters),
            KeyCode::Char('s') => Some(Message::ToggleSort),
            KeyCode::Char('S') => Some(Message::ToggleSortAdditive),

            KeyCode::Char(' ') => Some(Message::ToggleSelect),
            KeyCode::Char('a') => Some(Message::ToggleSelectAll),
            KeyCode::Char('c') => Some(Message::ClearSelection),
            KeyCode::Enter | KeyCode::Char('e') => Some(Message::EditCell),
            KeyCode::Char('d') => Some(Message::DeleteRow),
            KeyCode::Char('y') => Some(Message::CopyCell),
            KeyCode::Char('Y') => Some(Message::CopyRow),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    fn key(controller: &Controller, code: KeyCode) -> Option<Message> {
        controller.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn arrows_and_vim_keys_map_to_the_same_moves() {
        let controller = Controller::new(&DGConfig::default());
        assert_eq!(key(&controller, KeyCode::Up), Some(Message::MoveUp));
        assert_eq!(key(&controller, KeyCode::Char('k')), Some(Message::MoveUp));
        assert_eq!(key(&controller, KeyCode::Right), Some(Message::MoveRight));
        assert_eq!(key(&controller, KeyCode::Char('l')), Some(Message::MoveRight));
    }

    #[test]
    fn sort_and_filter_keys_distinguish_case() {
        let controller = Controller::new(&DGConfig::default());
        assert_eq!(key(&controller, KeyCode::Char('s')), Some(Message::ToggleSort));
        assert_eq!(
            key(&controller, KeyCode::Char('S')),
            Some(Message::ToggleSortAdditive)
        );
        assert_eq!(
            key(&controller, KeyCode::Char('f')),
            Some(Message::EnterColumnFilter)
        );
        assert_eq!(key(&controller, KeyCode::Char('F')), Some(Message::ClearFilters));
    }

    #[test]
    fn unmapped_keys_produce_nothing() {
        let controller = Controller::new(&DGConfig::default());
        assert_eq!(key(&controller, KeyCode::Char('x')), None);
        assert_eq!(key(&controller, KeyCode::Tab), None);
    }
}
