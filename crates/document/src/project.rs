//! The project log: a parsed document plus its decoded conversation.
//!
//! One `ProjectLog` is built per run and passed explicitly through
//! parse → decode → reply → patch → encode → unparse.

use llmd_core::{ConversationError, Message, Result, Role};
use tracing::debug;

use crate::conversation::{self, THREAD_TITLE};
use crate::section::{Document, Section};

pub const PROJECT_PREFIX: &str = "Project: ";
pub const MISSION_TITLE: &str = "Mission";
pub const CODE_CONTEXT_TITLE: &str = "Code Context";
pub const CHANGELOG_TITLE: &str = "Changelog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLog {
    /// The section tree. The thread's entries are stale once `messages`
    /// changes; [`ProjectLog::to_text`] re-encodes them.
    pub document: Document,
    /// The conversation, oldest first.
    pub messages: Vec<Message>,
}

impl ProjectLog {
    /// Parse a project log and decode its Conversation Thread.
    pub fn parse(text: &str) -> Result<Self> {
        let document = Document::parse(text)?;
        let thread = document
            .find(THREAD_TITLE)
            .ok_or_else(|| ConversationError::MissingThread(THREAD_TITLE.into()))?;
        let messages = conversation::decode(thread);
        debug!(
            sections = document.count(),
            messages = messages.len(),
            "Loaded project log"
        );
        Ok(Self { document, messages })
    }

    /// Serialize the document with the current messages encoded as entries.
    pub fn to_text(&self) -> Result<String> {
        let mut document = self.document.clone();
        conversation::store(&mut document, &self.messages)?;
        Ok(document.unparse())
    }

    /// The document without conversation entries, as handed to the model.
    pub fn system_context(&self) -> String {
        let mut document = self.document.clone();
        if let Some(thread) = document.find_mut(THREAD_TITLE) {
            thread.children.clear();
        }
        document.unparse()
    }

    /// Name from the `Project: <name>` root heading.
    pub fn project_name(&self) -> Option<&str> {
        self.document
            .sections
            .iter()
            .find_map(|s| s.title.strip_prefix(PROJECT_PREFIX))
    }

    pub fn mission(&self) -> Option<&str> {
        self.document.find(MISSION_TITLE).map(|s| s.body.as_str())
    }

    pub fn changelog(&self) -> Option<&str> {
        self.document.find(CHANGELOG_TITLE).map(|s| s.body.as_str())
    }

    /// `(path, body)` for every Code Context file, in document order.
    pub fn code_files(&self) -> Vec<(&str, &str)> {
        self.document
            .find(CODE_CONTEXT_TITLE)
            .map(|cc| {
                cc.children
                    .iter()
                    .map(|f| (f.title.as_str(), f.body.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True when the newest message is from the user and has no reply yet.
    pub fn awaiting_reply(&self) -> bool {
        self.last_message().is_some_and(|m| m.role == Role::User)
    }

    /// A new, empty project log with every reserved section in place.
    pub fn skeleton(name: &str) -> Self {
        let project = Section::new(format!("{PROJECT_PREFIX}{name}"))
            .with_body("\n")
            .with_child(Section::new(MISSION_TITLE).with_body("\n"))
            .with_child(Section::new(CODE_CONTEXT_TITLE).with_body("\n"))
            .with_child(Section::new(CHANGELOG_TITLE).with_body("\n"))
            .with_child(Section::new(THREAD_TITLE).with_body("\n"));
        Self {
            document: Document {
                sections: vec![project],
            },
            messages: Vec::new(),
        }
    }
}
