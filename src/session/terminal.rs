use std::io::{ self, IsTerminal, Stdout, Write };

use super::ChatView;

const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
/// Carriage return, then erase the whole line.
const ERASE_LINE: &str = "\r\x1b[2K";

/// Line-oriented [`ChatView`]. Answers are printed as Markdown source.
///
/// The terminal cannot refuse keystrokes, so "disabled" input only means no
/// prompt is shown. Lines typed while a request is in flight stay buffered on
/// stdin and are submitted one by one once it finishes; requests never overlap.
///
/// The loading indicator is drawn on the current line and erased in place, so
/// it is only shown when `color` is on (an interactive terminal). Piped output
/// never contains it.
pub struct TerminalView<W: Write = Stdout> {
    out: W,
    color: bool,
    input_enabled: bool,
    loading: bool,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self::new(out, color)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color, input_enabled: true, loading: false }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn prompt(&mut self) {
        let _ = write!(self.out, "> ");
        let _ = self.out.flush();
    }

    fn line(&mut self, style: &str, label: &str, text: &str) {
        let _ = if self.color && !style.is_empty() {
            writeln!(self.out, "{}{} {}{}", style, label, text, RESET)
        } else {
            writeln!(self.out, "{} {}", label, text)
        };
        let _ = self.out.flush();
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn show_user(&mut self, _text: &str) {
        // The question is already on screen from the prompt line.
    }

    fn show_loading(&mut self, text: &str) {
        if !self.color {
            return;
        }
        let _ = write!(self.out, "{}… {}{}", DIM, text, RESET);
        let _ = self.out.flush();
        self.loading = true;
    }

    fn clear_loading(&mut self) {
        if self.loading {
            let _ = write!(self.out, "{}", ERASE_LINE);
            let _ = self.out.flush();
            self.loading = false;
        }
    }

    fn show_answer(&mut self, markdown: &str) {
        self.line("", "bot>", markdown);
    }

    fn show_error(&mut self, message: &str) {
        self.line(RED, "error>", message);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if enabled {
            self.prompt();
        }
    }
}
