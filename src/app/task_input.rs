use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

// State of the single-line input field below the list
// The cursor counts chars, not bytes
#[derive(Debug, Default)]
pub struct TaskInput {
    text: String,
    cursor: usize,
}

impl TaskInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    // Replace the content and put the cursor at its end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    // Insert a char at the cursor position and move past it
    pub fn input(&mut self, to_insert: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, to_insert);
        self.cursor += 1;
    }

    // Delete the char before the cursor (backspace)
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

// Build the UI line for the input field.
// An empty field shows the placeholder in gray; when focused the char under the cursor is highlighted.
pub fn get_task_input_ui<'a>(
    input: &'a TaskInput,
    placeholder: &'a str,
    focused: bool,
) -> Line<'a> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(110, 110, 110));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    let mut spans = vec![Span::styled("+ ", WHITE_TEXT)];

    if input.text.is_empty() {
        if focused {
            spans.push(Span::styled(
                placeholder.chars().take(1).collect::<String>(),
                BLACK_ON_WHITE,
            ));
            spans.push(Span::styled(
                placeholder.chars().skip(1).collect::<String>(),
                GRAY_TEXT,
            ));
        } else {
            spans.push(Span::styled(placeholder, GRAY_TEXT));
        }
        return Line::from(spans);
    }

    if !focused {
        spans.push(Span::styled(input.text.as_str(), WHITE_TEXT));
        return Line::from(spans);
    }

    let before: String = input.text.chars().take(input.cursor).collect();
    let under: String = input.text.chars().skip(input.cursor).take(1).collect();
    let after: String = input.text.chars().skip(input.cursor + 1).collect();

    spans.push(Span::styled(before, WHITE_TEXT));
    if under.is_empty() {
        spans.push(Span::styled(" ", BLACK_ON_WHITE));
    } else {
        spans.push(Span::styled(under, BLACK_ON_WHITE));
        spans.push(Span::styled(after, WHITE_TEXT));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TaskInput {
        let mut input = TaskInput::default();
        text.chars().for_each(|c| input.input(c));
        input
    }

    fn rendered(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn typing_appends_and_moves_cursor() {
        let input = typed("milk");
        assert_eq!(input.text(), "milk");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = typed("mlk");
        input.move_cursor_left();
        input.move_cursor_left();
        input.input('i');
        assert_eq!(input.text(), "milk");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_handles_multibyte_chars() {
        let mut input = typed("café");
        input.delete_char();
        assert_eq!(input.text(), "caf");
        input.move_cursor_left();
        input.input('ç');
        assert_eq!(input.text(), "caçf");
        input.delete_char();
        assert_eq!(input.text(), "caf");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = typed("ab");
        input.move_cursor_right();
        assert_eq!(input.cursor(), 2);
        input.clear();
        input.move_cursor_left();
        input.delete_char();
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(typed("   \t").is_blank());
        assert!(TaskInput::default().is_blank());
        assert!(!typed(" x ").is_blank());
    }

    #[test]
    fn set_moves_cursor_to_the_end() {
        let mut input = TaskInput::default();
        input.set("Buy milk");
        assert_eq!(input.cursor(), 8);
        input.input('!');
        assert_eq!(input.text(), "Buy milk!");
    }

    #[test]
    fn ui_shows_placeholder_when_empty() {
        let input = TaskInput::default();
        assert_eq!(rendered(&get_task_input_ui(&input, "Add a task", false)), "+ Add a task");
        assert_eq!(rendered(&get_task_input_ui(&input, "Add a task", true)), "+ Add a task");
    }

    #[test]
    fn ui_adds_a_cursor_cell_at_the_end() {
        let input = typed("milk");
        assert_eq!(rendered(&get_task_input_ui(&input, "Add a task", true)), "+ milk ");
        assert_eq!(rendered(&get_task_input_ui(&input, "Add a task", false)), "+ milk");
    }
}
