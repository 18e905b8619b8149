//! Conversation Thread codec.
//!
//! On disk the conversation is a list of `Entry N` sections, each holding a
//! human paragraph and an assistant paragraph:
//!
//! ```text
//! ### Entry 1
//! Human: Please rename the function.
//!
//! Assistant: Done, see the patch below.
//!
//! ```
//!
//! [`decode`] flattens the entries into an ordered `Vec<Message>`;
//! [`encode`] rebuilds the entries from that list.
//!
//! Message content is written so the document parser reads it back as body
//! text: lines that would parse as headings or paragraph markers are escaped
//! with a leading backslash, and an unbalanced code fence is closed.

use llmd_core::{ConversationError, Message, Role};

use crate::section::{Document, Section, fence_marker, heading, toggle_fence};

/// Title of the section holding the conversation entries.
pub const THREAD_TITLE: &str = "Conversation Thread";
/// Starts a human paragraph.
pub const HUMAN_MARKER: &str = "Human:";
/// Starts an assistant paragraph.
pub const ASSISTANT_MARKER: &str = "Assistant:";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Preamble,
    Human,
    Assistant,
}

/// Extract the message sequence from a Conversation Thread section.
///
/// Each entry yields at most one user message followed by at most one
/// assistant message; empty paragraphs are omitted.
pub fn decode(thread: &Section) -> Vec<Message> {
    let mut messages = Vec::with_capacity(thread.children.len() * 2);
    for entry in &thread.children {
        let (human, assistant) = split_entry(&entry.body);
        if !human.is_empty() {
            messages.push(Message::user(human));
        }
        if !assistant.is_empty() {
            messages.push(Message::assistant(assistant));
        }
    }
    messages
}

fn split_entry(body: &str) -> (String, String) {
    let mut mode = Mode::Preamble;
    let mut fence = None;
    let mut human = String::new();
    let mut assistant = String::new();

    for line in body.split_inclusive('\n') {
        if fence.is_none() {
            if let Some(rest) = line.strip_prefix(HUMAN_MARKER) {
                mode = Mode::Human;
                human.push_str(rest);
                continue;
            }
            if let Some(rest) = line.strip_prefix(ASSISTANT_MARKER) {
                mode = Mode::Assistant;
                assistant.push_str(rest);
                continue;
            }
        }

        let text = if fence.is_none() { unescape(line) } else { line };
        match mode {
            Mode::Preamble => {}
            Mode::Human => human.push_str(text),
            Mode::Assistant => assistant.push_str(text),
        }
        fence = toggle_fence(fence, line);
    }

    (human.trim().to_string(), assistant.trim().to_string())
}

/// Rebuild `Entry N` sections from a message sequence.
///
/// A user message opens an entry and the assistant message right after it
/// completes the entry. A trailing user message produces an entry with only
/// the human paragraph; an assistant message with no user message before it
/// gets an entry of its own.
pub fn encode(messages: &[Message]) -> Vec<Section> {
    let mut entries = Vec::new();
    let mut iter = messages.iter().peekable();

    while let Some(message) = iter.next() {
        let mut body = String::new();
        match message.role {
            Role::User => {
                body.push_str(&paragraph(HUMAN_MARKER, &message.content));
                if let Some(reply) = iter.next_if(|m| m.role == Role::Assistant) {
                    body.push('\n');
                    body.push_str(&paragraph(ASSISTANT_MARKER, &reply.content));
                }
            }
            Role::Assistant => body.push_str(&paragraph(ASSISTANT_MARKER, &message.content)),
        }
        body.push('\n');

        let title = format!("Entry {}", entries.len() + 1);
        entries.push(Section::new(title).with_body(body));
    }

    entries
}

/// Replace the thread's entries with `encode(messages)`, keeping its own body.
pub fn store(document: &mut Document, messages: &[Message]) -> Result<(), ConversationError> {
    let thread = document
        .find_mut(THREAD_TITLE)
        .ok_or_else(|| ConversationError::MissingThread(THREAD_TITLE.into()))?;
    thread.children = encode(messages);
    Ok(())
}

/// One marker-led paragraph, newline terminated.
fn paragraph(marker: &str, content: &str) -> String {
    let content = content.trim();
    let mut out = String::from(marker);
    let mut lines = content.lines().peekable();

    match lines.peek() {
        None => out.push('\n'),
        // A fence must start its own line or the parser will not see it open.
        Some(first) if fence_marker(first).is_some() => out.push('\n'),
        Some(_) => out.push(' '),
    }

    let mut fence = None;
    let mut first = true;
    for line in lines {
        if !first && fence.is_none() && needs_escape(line) {
            out.push('\\');
        }
        out.push_str(line);
        out.push('\n');
        fence = toggle_fence(fence, line);
        first = false;
    }

    if let Some(marker) = fence {
        out.push_str(marker);
        out.push('\n');
    }
    out
}

/// Lines that would be read as structure instead of paragraph text.
fn needs_escape(line: &str) -> bool {
    heading(line).is_some()
        || line.starts_with(HUMAN_MARKER)
        || line.starts_with(ASSISTANT_MARKER)
        || line.strip_prefix('\\').is_some_and(needs_escape)
}

fn unescape(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if needs_escape(rest) => rest,
        _ => line,
    }
}
