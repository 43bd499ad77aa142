/// Expression field with in-memory history of plotted expressions.
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (byte offset).
    pub cursor: usize,
    /// Successfully plotted expressions, oldest first.
    pub history: Vec<String>,
    /// Current position in history while browsing.
    pub history_pos: Option<usize>,
    /// Saved current input when browsing history.
    pub saved_input: String,
}

impl InputState {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
            history: Vec::new(),
            history_pos: None,
            saved_input: String::new(),
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
        self.history_pos = None;
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn kill_line(&mut self) {
        self.text.truncate(self.cursor);
    }

    pub fn kill_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let trimmed = self.text[..self.cursor].trim_end();
        let new_end = trimmed
            .rfind(|c: char| c.is_whitespace() || "()+-*/^,".contains(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.text.replace_range(new_end..self.cursor, "");
        self.cursor = new_end;
    }

    /// Remember a plotted expression. Repeats of the newest entry are skipped.
    pub fn record(&mut self, text: &str) {
        if !text.trim().is_empty() && self.history.last().map(String::as_str) != Some(text) {
            self.history.push(text.to_string());
        }
        self.history_pos = None;
    }

    pub fn history_up(&mut self) -> bool {
        let pos = match self.history_pos {
            None if !self.history.is_empty() => {
                self.saved_input = self.text.clone();
                self.history.len() - 1
            }
            Some(pos) if pos > 0 => pos - 1,
            _ => return false,
        };
        self.history_pos = Some(pos);
        self.text = self.history[pos].clone();
        self.cursor = self.text.len();
        true
    }

    pub fn history_down(&mut self) -> bool {
        let Some(pos) = self.history_pos else {
            return false;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.text = self.history[pos + 1].clone();
        } else {
            // Back to current input
            self.history_pos = None;
            self.text = std::mem::take(&mut self.saved_input);
        }
        self.cursor = self.text.len();
        true
    }
}
