use std::io::{self, Write};

use crate::application::services::ChatSession;
use crate::domain::{Message, MessageRole};

pub const EMPTY_STATE: &str = "Start the conversation by typing your message...";
const PENDING: &str = "...";
// Carriage return plus ANSI erase-line, used to redraw the placeholder line.
const REDRAW_LINE: &str = "\r\x1b[2K";

fn label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "You: ",
        MessageRole::Assistant => "AI: ",
        MessageRole::System => "System: ",
    }
}

/// Full transcript, one line per message.
pub fn render_transcript(session: &ChatSession) -> String {
    let messages = session.messages();
    if messages.is_empty() {
        return format!("{}\n", EMPTY_STATE);
    }

    let open = session.conversation().in_progress_index();
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| render_line(message, open == Some(index)))
        .collect()
}

fn display_text(message: &Message, is_open: bool) -> &str {
    if is_open && message.content.is_empty() {
        PENDING
    } else {
        message.content.as_str()
    }
}

fn render_line(message: &Message, is_open: bool) -> String {
    format!("{}{}\n", label(message.role), display_text(message, is_open))
}

/// What is on screen for the reply in progress.
enum OpenLine {
    Pending,
    Partial(String),
}

/// Writes a session to a terminal incrementally: sealed messages once, the
/// reply in progress as its text grows. Output always follows the newest
/// message.
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: usize,
    open_line: Option<OpenLine>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            open_line: None,
        }
    }

    pub fn render(&mut self, session: &ChatSession) -> io::Result<()> {
        let messages = session.messages();
        let open = session.conversation().in_progress_index();

        while self.printed < messages.len() {
            let index = self.printed;
            let message = &messages[index];

            let is_open = open == Some(index);
            let text = display_text(message, is_open);

            match self.open_line.take() {
                None => {
                    write!(self.out, "{}{}", label(message.role), text)?;
                }
                Some(OpenLine::Pending) if is_open && message.content.is_empty() => {}
                Some(OpenLine::Pending) => {
                    write!(self.out, "{}{}{}", REDRAW_LINE, label(message.role), text)?;
                }
                Some(OpenLine::Partial(shown)) if message.content.starts_with(&shown) => {
                    write!(self.out, "{}", &message.content[shown.len()..])?;
                }
                Some(OpenLine::Partial(_)) => {
                    // Reply was replaced, not extended (e.g. by an error).
                    write!(self.out, "\n{}{}", label(message.role), text)?;
                }
            }

            if is_open {
                self.open_line = Some(if message.content.is_empty() {
                    OpenLine::Pending
                } else {
                    OpenLine::Partial(message.content.clone())
                });
                break;
            }

            writeln!(self.out)?;
            self.printed += 1;
        }

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
