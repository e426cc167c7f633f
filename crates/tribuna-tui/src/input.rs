//! Single-line input box state.

/// User input state: buffer plus a character-indexed cursor.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    /// Cursor position in characters, 0..=char_count.
    cursor: usize,
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Replaces the whole buffer, placing the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.buffer.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.buffer.chars().count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.buffer.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let len = self.buffer.chars().count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Takes the buffer, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(offset, _)| offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_take() {
        let mut input = InputState::default();
        for c in "hola".chars() {
            input.insert(c);
        }
        assert_eq!(input.text(), "hola");
        assert_eq!(input.take(), "hola");
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputState::default();
        input.set_text("educación");
        input.backspace();
        assert_eq!(input.text(), "educació");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "ducació");
        input.insert('¿');
        assert_eq!(input.text(), "¿ducació");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = InputState::default();
        input.move_left();
        input.move_right();
        assert_eq!(input.cursor(), 0);

        input.set_text("ab");
        input.move_right();
        assert_eq!(input.cursor(), 2);
        input.move_home();
        input.insert('x');
        assert_eq!(input.text(), "xab");
    }
}
