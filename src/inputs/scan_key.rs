use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means to the scan buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKey {
    /// Burst terminator
    Enter,
    /// A single printable character
    Printable(char),
    /// Modifiers, navigation, function keys, chords
    Other,
}

impl ScanKey {
    /// Classify a terminal key event.
    ///
    /// Returns `None` for key releases, which are not key presses at all.
    /// Shift is allowed on printable keys since scanners emit upper case
    /// through it; Control, Alt and Super chords are not text.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let chord = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
        let scan_key = match key.code {
            KeyCode::Enter => ScanKey::Enter,
            KeyCode::Char(c) if !key.modifiers.intersects(chord) && !c.is_control() => {
                ScanKey::Printable(c)
            }
            _ => ScanKey::Other,
        };
        Some(scan_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::empty(),
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        key(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn test_enter_and_printable_keys() {
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Enter, KeyModifiers::empty())),
            Some(ScanKey::Enter)
        );
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Char('7'), KeyModifiers::empty())),
            Some(ScanKey::Printable('7'))
        );
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Char(' '), KeyModifiers::empty())),
            Some(ScanKey::Printable(' '))
        );
    }

    #[test]
    fn test_shifted_characters_are_printable() {
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(ScanKey::Printable('A'))
        );
    }

    #[test]
    fn test_chords_and_named_keys_are_other() {
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ScanKey::Other)
        );
        assert_eq!(
            ScanKey::from_key_event(&press(KeyCode::Char('x'), KeyModifiers::ALT)),
            Some(ScanKey::Other)
        );
        for code in [KeyCode::Tab, KeyCode::Left, KeyCode::F(5), KeyCode::Backspace] {
            assert_eq!(
                ScanKey::from_key_event(&press(code, KeyModifiers::empty())),
                Some(ScanKey::Other)
            );
        }
    }

    #[test]
    fn test_release_is_not_a_key_press() {
        let release = key(KeyCode::Char('1'), KeyModifiers::empty(), KeyEventKind::Release);
        assert_eq!(ScanKey::from_key_event(&release), None);

        let repeat = key(KeyCode::Char('1'), KeyModifiers::empty(), KeyEventKind::Repeat);
        assert_eq!(ScanKey::from_key_event(&repeat), Some(ScanKey::Printable('1')));
    }
}
