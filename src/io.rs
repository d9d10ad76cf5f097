use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;

use crate::events::AppEvent;
use crate::events::CursorEvent;
use crate::events::EngineEvent;
use crate::events::Event;

/// Converts a crossterm event into a gameoflife event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        CrossTermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => convert_key(code, modifiers),
        CrossTermEvent::Resize(cols, rows) => Some(Event::AppEvent(AppEvent::Resize { cols, rows })),
        _ => None,
    }
}

fn convert_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Event> {
    let engine = |e| Some(Event::EngineEvent(e));
    let app = |e| Some(Event::AppEvent(e));
    let cursor = |e| Some(Event::AppEvent(AppEvent::CursorEvent(e)));

    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app(AppEvent::Exit),
        KeyCode::Char('q') | KeyCode::Esc => app(AppEvent::Exit),

        KeyCode::Char(' ') => engine(EngineEvent::TogglePlay),
        KeyCode::Char('n') | KeyCode::Char('.') => engine(EngineEvent::Step),
        KeyCode::Enter => engine(EngineEvent::ToggleCell),
        KeyCode::Char('c') => engine(EngineEvent::Clear),
        KeyCode::Char('r') => engine(EngineEvent::Randomize),
        KeyCode::Char('a') => engine(EngineEvent::Center),
        KeyCode::Char('+') | KeyCode::Char('=') => engine(EngineEvent::Faster),
        KeyCode::Char('-') => engine(EngineEvent::Slower),
        KeyCode::Char('p') => engine(EngineEvent::Stamp),

        KeyCode::Tab => app(AppEvent::NextPattern),
        KeyCode::BackTab => app(AppEvent::PrevPattern),

        // movements
        KeyCode::Up | KeyCode::Char('k') => cursor(CursorEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => cursor(CursorEvent::Down),
        KeyCode::Left | KeyCode::Char('h') => cursor(CursorEvent::Left),
        KeyCode::Right | KeyCode::Char('l') => cursor(CursorEvent::Right),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrossTermEvent {
        CrossTermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn quit_keys() {
        let exit = Some(Event::AppEvent(AppEvent::Exit));

        assert_eq!(convert_event(key(KeyCode::Char('q'), KeyModifiers::NONE)), exit);
        assert_eq!(
            convert_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            exit
        );
    }

    #[test]
    fn plain_c_clears() {
        assert_eq!(
            convert_event(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Event::EngineEvent(EngineEvent::Clear))
        );
    }

    #[test]
    fn releases_are_ignored() {
        let release = CrossTermEvent::Key(KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });

        assert_eq!(convert_event(release), None);
    }

    #[test]
    fn resize() {
        assert_eq!(
            convert_event(CrossTermEvent::Resize(100, 40)),
            Some(Event::AppEvent(AppEvent::Resize {
                cols: 100,
                rows: 40
            }))
        );
    }
}
