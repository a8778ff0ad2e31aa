/// Single-line text editor used by the forms and prompts.
/// The cursor counts characters, not bytes.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct LineEdit {
    pub value: String,
    pub cursor: usize,
}

impl LineEdit {
    pub fn with_value(s: impl Into<String>) -> Self {
        let mut edit = Self::default();
        edit.set(s);
        edit
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn set(&mut self, s: impl Into<String>) {
        self.value = s.into();
        self.cursor = self.char_len();
    }
    pub fn push(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }
    pub fn left(&mut self) {
        if self.cursor > 0 { self.cursor -= 1; }
    }
    pub fn right(&mut self) {
        if self.cursor < self.char_len() { self.cursor += 1; }
    }
    pub fn home(&mut self) {
        self.cursor = 0;
    }
    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
    pub fn as_str(&self) -> &str {
        &self.value
    }
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Text with a `|` marking the cursor, for the focused field.
    pub fn rendered(&self, focused: bool) -> String {
        if !focused {
            return self.value.clone();
        }
        let at = self.byte_offset(self.cursor);
        format!("{}|{}", &self.value[..at], &self.value[at..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_cursor() {
        let mut edit = LineEdit::with_value("Car");
        edit.left();
        edit.push('x');
        assert_eq!(edit.as_str(), "Caxr");
        edit.backspace();
        edit.delete();
        assert_eq!(edit.as_str(), "Ca");
        assert_eq!(edit.rendered(true), "Ca|");
    }

    #[test]
    fn handles_multibyte_chars() {
        let mut edit = LineEdit::with_value("€5");
        edit.home();
        edit.right();
        edit.push('1');
        assert_eq!(edit.as_str(), "€15");
        edit.end();
        edit.backspace();
        edit.backspace();
        edit.backspace();
        assert_eq!(edit.as_str(), "");
        assert_eq!(edit.cursor, 0);
    }
}
