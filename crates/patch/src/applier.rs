//! Patch applier: interprets scanned instructions against a project log.
//!
//! Instructions run strictly in order and each sees the effects of the
//! previous ones. A code edit also redacts the edited spans from the newest
//! message so the conversation does not keep whole-file diffs verbatim.

use std::str::FromStr;

use llmd_core::{Message, PatchPreconditionError};
use llmd_document::{
    BodyDefect, CHANGELOG_TITLE, CODE_CONTEXT_TITLE, Document, MISSION_TITLE, ProjectLog,
    check_body,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::instruction::{PatchInstruction, PatchOp};

/// Replaces edited spans in the newest message.
///
/// Contains no ASCII, so after redaction a search or replace span can only
/// remain in the message if it is itself a substring of the marker.
pub const REDACTION_MARKER: &str = "⟦…⟧";

/// What to do when an instruction's precondition does not hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log it, record it in the report and continue with the next instruction.
    #[default]
    Skip,
    /// Stop at the first failure and return it.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown failure policy '{other}' (expected skip or abort)")),
        }
    }
}

/// An instruction that was skipped because its precondition failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFailure {
    pub line: usize,
    /// Short form of the instruction, e.g. `SEARCH/REPLACE app.py (line 4)`.
    pub summary: String,
    pub error: PatchPreconditionError,
}

/// Outcome of one [`PatchApplier::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Instructions that changed the document.
    pub applied: usize,
    /// Unrecognized opcode pairs.
    pub ignored: usize,
    pub failures: Vec<PatchFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies patch instructions to a document and its message list.
#[derive(Debug, Clone)]
pub struct PatchApplier {
    policy: FailurePolicy,
    redaction_marker: String,
}

impl Default for PatchApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchApplier {
    pub fn new() -> Self {
        Self {
            policy: FailurePolicy::default(),
            redaction_marker: REDACTION_MARKER.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_redaction_marker(mut self, marker: impl Into<String>) -> Self {
        self.redaction_marker = marker.into();
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Apply `instructions` in order.
    ///
    /// Every CHANGELOG instruction appends one bullet, even when its entry
    /// is blank. Under [`FailurePolicy::Abort`] the first precondition failure is
    /// returned; instructions before it stay applied.
    pub fn apply(
        &self,
        document: &mut Document,
        messages: &mut [Message],
        instructions: &[PatchInstruction],
    ) -> Result<ApplyReport, PatchPreconditionError> {
        let mut report = ApplyReport::default();

        for instruction in instructions {
            let Some(op) = instruction.op() else {
                debug!(%instruction, "Ignoring unrecognized patch instruction");
                report.ignored += 1;
                continue;
            };

            match self.apply_one(document, messages, op) {
                Ok(()) => {
                    debug!(%instruction, "Applied patch instruction");
                    report.applied += 1;
                }
                Err(error) => match self.policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Skip => {
                        warn!(%instruction, %error, "Skipping patch instruction");
                        report.failures.push(PatchFailure {
                            line: instruction.line,
                            summary: instruction.to_string(),
                            error,
                        });
                    }
                },
            }
        }

        Ok(report)
    }

    /// [`apply`](Self::apply) on a [`ProjectLog`].
    pub fn apply_to_log(
        &self,
        log: &mut ProjectLog,
        instructions: &[PatchInstruction],
    ) -> Result<ApplyReport, PatchPreconditionError> {
        self.apply(&mut log.document, &mut log.messages, instructions)
    }

    /// On error nothing is modified.
    fn apply_one(
        &self,
        document: &mut Document,
        messages: &mut [Message],
        op: PatchOp<'_>,
    ) -> Result<(), PatchPreconditionError> {
        match op {
            PatchOp::Replace {
                target,
                search,
                replace,
            } => {
                let target = target.ok_or(PatchPreconditionError::MissingTarget)?;
                let context = document.find_mut(CODE_CONTEXT_TITLE).ok_or_else(|| {
                    PatchPreconditionError::MissingSection {
                        section: CODE_CONTEXT_TITLE.into(),
                    }
                })?;
                let stripped = target.trim_start_matches("./");
                let index = context
                    .children
                    .iter()
                    .position(|file| file.title == target)
                    .or_else(|| context.children.iter().position(|file| file.title == stripped))
                    .ok_or_else(|| PatchPreconditionError::UnknownTarget {
                        target: target.into(),
                    })?;
                let file = &mut context.children[index];
                replace_in(&mut file.body, &file.title, search, replace)?;

                if let Some(last) = messages.last_mut() {
                    last.content = redact(&last.content, &[search, replace], &self.redaction_marker);
                }
                Ok(())
            }
            PatchOp::ReplaceMission { search, replace } => {
                let mission = document.find_mut(MISSION_TITLE).ok_or_else(|| {
                    PatchPreconditionError::MissingSection {
                        section: MISSION_TITLE.into(),
                    }
                })?;
                replace_in(&mut mission.body, MISSION_TITLE, search, replace)?;
                Ok(())
            }
            PatchOp::Changelog { entry } => {
                let entry = changelog_entry(entry);
                let changelog = document.find_mut(CHANGELOG_TITLE).ok_or_else(|| {
                    PatchPreconditionError::MissingSection {
                        section: CHANGELOG_TITLE.into(),
                    }
                })?;
                append_bullet(&mut changelog.body, &entry);
                Ok(())
            }
        }
    }
}

/// Replace every occurrence of `search` in `body`.
///
/// The result must still parse back as the body of `section`: an edit that
/// opens a fence, exposes a heading or drops the final newline is refused,
/// unless the body already had that defect.
fn replace_in(
    body: &mut String,
    section: &str,
    search: &str,
    replace: &str,
) -> Result<(), PatchPreconditionError> {
    if search.is_empty() {
        return Err(PatchPreconditionError::EmptySearch {
            section: section.into(),
        });
    }
    if !body.contains(search) {
        return Err(PatchPreconditionError::SearchNotFound {
            section: section.into(),
        });
    }

    let patched = body.replace(search, replace);
    if body.ends_with('\n') && !patched.is_empty() && !patched.ends_with('\n') {
        return Err(PatchPreconditionError::MissingFinalNewline {
            section: section.into(),
        });
    }
    if let (Err(defect), Ok(())) = (check_body(&patched), check_body(body.as_str())) {
        return Err(match defect {
            BodyDefect::UnclosedFence => PatchPreconditionError::UnbalancedFence {
                section: section.into(),
            },
            BodyDefect::Heading { line } => PatchPreconditionError::HeadingInBody {
                section: section.into(),
                line,
            },
        });
    }

    *body = patched;
    Ok(())
}

/// Fold a changelog span into one line: trimmed, blank lines dropped, any
/// leading bullet removed.
fn changelog_entry(text: &str) -> String {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    joined
        .strip_prefix("- ")
        .or_else(|| joined.strip_prefix("* "))
        .unwrap_or(&joined)
        .trim()
        .to_string()
}

/// Insert `- entry` after the last non-blank line of `body`.
fn append_bullet(body: &mut String, entry: &str) {
    let bullet = format!("- {entry}\n");
    let content_end = body.trim_end().len();
    if content_end == 0 {
        body.insert_str(0, &bullet);
        return;
    }
    match body[content_end..].find('\n') {
        Some(offset) => body.insert_str(content_end + offset + 1, &bullet),
        None => {
            body.push('\n');
            body.push_str(&bullet);
        }
    }
}

/// Replace each occurrence of any pattern in `content` with `marker`.
///
/// One left-to-right pass; at a given position the longest pattern wins.
/// A pattern ending in a newline keeps that newline after the marker.
pub fn redact(content: &str, patterns: &[&str], marker: &str) -> String {
    let mut patterns: Vec<&str> = patterns.iter().copied().filter(|p| !p.is_empty()).collect();
    patterns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    patterns.dedup();
    if patterns.is_empty() {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(c) = rest.chars().next() {
        if let Some(pattern) = patterns.iter().find(|p| rest.starts_with(**p)) {
            out.push_str(marker);
            if pattern.ends_with('\n') {
                out.push('\n');
            }
            rest = &rest[pattern.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;

    const LOG: &str = "\
# Project: demo

## Mission
Make greetings friendlier.

## Code Context
### app.py
```python
print('hi')
```

## Changelog
- Created project

## Conversation Thread
### Entry 1
Human: Say bye instead.

";

    const REPLY: &str = "\
Sure, here is the change.

app.py
<<<<<< SEARCH
print('hi')
=======
print('bye')
>>>>>> REPLACE

<<<<<< CHANGELOG
Say bye instead of hi
>>>>>> CHANGELOG
";

    fn log_with_reply(reply: &str) -> ProjectLog {
        let mut log = ProjectLog::parse(LOG).unwrap();
        log.push(Message::assistant(reply));
        log
    }

    fn changelog_bullet(entry: &str) -> PatchInstruction {
        PatchInstruction {
            target_label: None,
            opcode_open: "CHANGELOG".into(),
            search_text: format!("{entry}\n"),
            opcode_close: None,
            replace_text: None,
            line: 1,
        }
    }

    #[test]
    fn example_search_replace() {
        let mut doc = Document::parse("# Code Context\n## app.py\nprint('hi')\n").unwrap();
        let mut messages: Vec<Message> = Vec::new();
        let instructions =
            scan("app.py\n<<<<<< SEARCH\nprint('hi')\n=======\nprint('bye')\n>>>>>> REPLACE");
        let report = PatchApplier::new()
            .apply(&mut doc, &mut messages, &instructions)
            .unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(doc.find("app.py").unwrap().body, "print('bye')\n");
    }

    #[test]
    fn reply_applies_and_redacts() {
        let mut log = log_with_reply(REPLY);
        let instructions = scan(REPLY);
        let report = PatchApplier::new().apply_to_log(&mut log, &instructions).unwrap();

        assert_eq!(report.applied, 2);
        assert!(report.is_clean());
        assert_eq!(log.code_files()[0].1, "```python\nprint('bye')\n```\n\n");
        assert_eq!(log.changelog(), Some("- Created project\n- Say bye instead of hi\n\n"));

        let last = &log.last_message().unwrap().content;
        assert!(!last.contains("print('hi')"));
        assert!(!last.contains("print('bye')"));
        assert!(last.contains(&format!("<<<<<< SEARCH\n{REDACTION_MARKER}\n=======\n")));
        // Earlier messages are untouched.
        assert_eq!(log.messages[0].content, "Say bye instead.");
    }

    #[test]
    fn empty_instruction_list_is_a_no_op() {
        let mut log = log_with_reply("Nothing to change.");
        let before = log.to_text().unwrap();
        let report = PatchApplier::new().apply_to_log(&mut log, &[]).unwrap();
        assert_eq!(report, ApplyReport::default());
        assert_eq!(log.to_text().unwrap(), before);
    }

    #[test]
    fn changelog_appends_in_order_without_removing() {
        let mut log = log_with_reply("ok");
        let instructions: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(changelog_bullet)
            .collect();
        let report = PatchApplier::new().apply_to_log(&mut log, &instructions).unwrap();
        assert_eq!(report.applied, 3);
        assert_eq!(
            log.changelog(),
            Some("- Created project\n- first\n- second\n- third\n\n")
        );
    }

    #[test]
    fn changelog_entry_is_normalized() {
        assert_eq!(changelog_entry("  - Renamed x\n\n  and y  \n"), "Renamed x and y");
        assert_eq!(changelog_entry("* Added z\n"), "Added z");
        assert_eq!(changelog_entry(" \n\t\n"), "");
    }

    #[test]
    fn blank_changelog_entry_still_appends() {
        let mut log = log_with_reply("ok");
        let report = PatchApplier::new()
            .apply_to_log(&mut log, &[changelog_bullet("   "), changelog_bullet("next")])
            .unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.ignored, 0);
        assert_eq!(log.changelog(), Some("- Created project\n- \n- next\n\n"));

        let text = log.to_text().unwrap();
        assert_eq!(ProjectLog::parse(&text).unwrap().changelog(), log.changelog());
    }

    #[test]
    fn append_bullet_positions() {
        let mut empty = String::from("\n");
        append_bullet(&mut empty, "a");
        assert_eq!(empty, "- a\n\n");

        let mut unterminated = String::from("- x");
        append_bullet(&mut unterminated, "a");
        assert_eq!(unterminated, "- x\n- a\n");

        let mut nothing = String::new();
        append_bullet(&mut nothing, "a");
        assert_eq!(nothing, "- a\n");
    }

    #[test]
    fn missing_search_text_leaves_document_unchanged() {
        let reply = "app.py\n<<<<<< SEARCH\nprint('hello')\n=======\nprint('bye')\n>>>>>> REPLACE\n";
        let mut log = log_with_reply(reply);
        let before = log.clone();
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::SearchNotFound {
                section: "app.py".into()
            }
        );
        assert_eq!(report.failures[0].line, 2);
        assert_eq!(log, before);
    }

    #[test]
    fn abort_policy_returns_the_error() {
        let reply = "\
<<<<<< CHANGELOG
kept
>>>>>> CHANGELOG
app.py
<<<<<< SEARCH
absent
=======
x
>>>>>> REPLACE
<<<<<< CHANGELOG
never
>>>>>> CHANGELOG
";
        let mut log = log_with_reply(reply);
        let err = PatchApplier::new()
            .with_policy(FailurePolicy::Abort)
            .apply_to_log(&mut log, &scan(reply))
            .unwrap_err();
        assert!(matches!(err, PatchPreconditionError::SearchNotFound { .. }));
        // Applied before the failure, nothing after it.
        assert_eq!(log.changelog(), Some("- Created project\n- kept\n\n"));
    }

    #[test]
    fn skip_policy_continues_after_failure() {
        let reply = "\
nope.py
<<<<<< SEARCH
a
=======
b
>>>>>> REPLACE
<<<<<< CHANGELOG
still logged
>>>>>> CHANGELOG
";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::UnknownTarget {
                target: "nope.py".into()
            }
        );
        assert_eq!(report.failures[0].summary, "SEARCH/REPLACE nope.py (line 2)");
        assert!(log.changelog().unwrap().contains("- still logged\n"));
    }

    #[test]
    fn later_instructions_see_earlier_edits() {
        let reply = "\
app.py
<<<<<< SEARCH
print('hi')
=======
print('bye')
>>>>>> REPLACE
app.py
<<<<<< SEARCH
print('bye')
=======
print('ciao')
>>>>>> REPLACE
";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.applied, 2);
        assert!(log.code_files()[0].1.contains("print('ciao')\n"));
    }

    #[test]
    fn replaces_every_occurrence() {
        let mut doc = Document::parse("# Code Context\n## a.txt\nx\ny\nx\n").unwrap();
        let ins = scan("a.txt\n<<<<<< SEARCH\nx\n=======\nz\n>>>>>> REPLACE\n");
        PatchApplier::new().apply(&mut doc, &mut [], &ins).unwrap();
        assert_eq!(doc.find("a.txt").unwrap().body, "z\ny\nz\n");
    }

    #[test]
    fn target_lookup_tolerates_dot_slash() {
        let reply = "./app.py\n<<<<<< SEARCH\nprint('hi')\n=======\nprint('yo')\n>>>>>> REPLACE\n";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.applied, 1);
    }

    #[test]
    fn code_edit_without_label_fails() {
        let reply = "<<<<<< SEARCH\nprint('hi')\n=======\nx\n>>>>>> REPLACE\n";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.failures[0].error, PatchPreconditionError::MissingTarget);
    }

    #[test]
    fn mission_replace_without_redaction() {
        let reply = "<<<<<< SEARCH_MISSION\nfriendlier.\n=======\nshorter.\n>>>>>> REPLACE_MISSION\n";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(log.mission(), Some("Make greetings shorter.\n\n"));
        assert_eq!(log.last_message().unwrap().content, reply);
    }

    #[test]
    fn missing_sections_are_reported() {
        let mut doc = Document::parse("# Project: bare\n").unwrap();
        let ins = scan(
            "<<<<<< SEARCH_MISSION\na\n=======\nb\n>>>>>> REPLACE_MISSION\n<<<<<< CHANGELOG\nx\n>>>>>> CHANGELOG\n",
        );
        let report = PatchApplier::new().apply(&mut doc, &mut [], &ins).unwrap();
        let errors: Vec<_> = report.failures.iter().map(|f| f.error.clone()).collect();
        assert_eq!(
            errors,
            [
                PatchPreconditionError::MissingSection {
                    section: MISSION_TITLE.into()
                },
                PatchPreconditionError::MissingSection {
                    section: CHANGELOG_TITLE.into()
                },
            ]
        );
    }

    #[test]
    fn unrecognized_pairs_are_ignored() {
        let reply = "x\n<<<<<< DELETE\ny\n=======\nz\n>>>>>> DELETE\n";
        let mut log = log_with_reply(reply);
        let before = log.clone();
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(report.ignored, 1);
        assert_eq!(log, before);
    }

    fn code_edit(target: &str, search: &str, replace: &str) -> PatchInstruction {
        PatchInstruction {
            target_label: Some(target.into()),
            opcode_open: "SEARCH".into(),
            search_text: search.into(),
            opcode_close: Some("REPLACE".into()),
            replace_text: Some(replace.into()),
            line: 2,
        }
    }

    #[test]
    fn edit_that_leaves_fence_open_is_refused() {
        let reply = "app.py\n<<<<<< SEARCH\nprint('hi')\n```\n=======\nprint('bye')\n>>>>>> REPLACE\n";
        let mut log = log_with_reply(reply);
        let before = log.clone();
        let edit = code_edit("app.py", "print('hi')\n```\n", "print('bye')\n");

        let report = PatchApplier::new().apply_to_log(&mut log, &[edit]).unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::UnbalancedFence {
                section: "app.py".into()
            }
        );
        assert_eq!(log, before);

        // The written log still loads with every section in place.
        let reloaded = ProjectLog::parse(&log.to_text().unwrap()).unwrap();
        assert_eq!(reloaded.code_files(), log.code_files());
        assert_eq!(reloaded.changelog(), log.changelog());
    }

    #[test]
    fn abort_policy_surfaces_unbalanced_fence() {
        let mut log = log_with_reply("ok");
        let edit = code_edit("app.py", "```\n\n", "\n");
        let err = PatchApplier::new()
            .with_policy(FailurePolicy::Abort)
            .apply_to_log(&mut log, &[edit])
            .unwrap_err();
        assert!(matches!(err, PatchPreconditionError::UnbalancedFence { .. }));
    }

    #[test]
    fn mission_edit_is_checked_too() {
        let reply = "<<<<<< SEARCH_MISSION\nMake greetings friendlier.\n=======\n~~~\n>>>>>> REPLACE_MISSION\n";
        let mut log = log_with_reply(reply);
        let report = PatchApplier::new().apply_to_log(&mut log, &scan(reply)).unwrap();
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::UnbalancedFence {
                section: MISSION_TITLE.into()
            }
        );
        assert_eq!(log.mission(), Some("Make greetings friendlier.\n\n"));
    }

    #[test]
    fn edit_that_exposes_heading_is_refused() {
        let mut doc = Document::parse("# Code Context\n## app.py\nprint('hi')\n").unwrap();
        let edit = code_edit("app.py", "print('hi')\n", "x = 1\n# Injected\n");
        let report = PatchApplier::new().apply(&mut doc, &mut [], &[edit]).unwrap();
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::HeadingInBody {
                section: "app.py".into(),
                line: 2
            }
        );
        assert_eq!(doc.find("app.py").unwrap().body, "print('hi')\n");
    }

    #[test]
    fn heading_inside_fence_is_accepted() {
        let mut log = log_with_reply("ok");
        let edit = code_edit("app.py", "print('hi')\n", "# greet\nprint('bye')\n");
        let report = PatchApplier::new().apply_to_log(&mut log, &[edit]).unwrap();
        assert_eq!(report.applied, 1);

        let reloaded = ProjectLog::parse(&log.to_text().unwrap()).unwrap();
        assert_eq!(
            reloaded.code_files()[0].1,
            "```python\n# greet\nprint('bye')\n```\n\n"
        );
    }

    #[test]
    fn edit_that_drops_final_newline_is_refused() {
        let text = "# Code Context\n## a.py\nx = 1\n## b.py\ny\n";
        let mut doc = Document::parse(text).unwrap();
        let edit = code_edit("a.py", "1\n", "2");
        let report = PatchApplier::new().apply(&mut doc, &mut [], &[edit]).unwrap();
        assert_eq!(
            report.failures[0].error,
            PatchPreconditionError::MissingFinalNewline {
                section: "a.py".into()
            }
        );
        assert_eq!(doc.unparse(), text);
    }

    #[test]
    fn body_already_open_at_end_can_still_be_edited() {
        let mut doc = Document::parse("# Code Context\n## a.py\n```\nx\n").unwrap();
        let edit = code_edit("a.py", "x\n", "y\n");
        let report = PatchApplier::new().apply(&mut doc, &mut [], &[edit]).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(doc.find("a.py").unwrap().body, "```\ny\n");
    }

    #[test]
    fn marker_never_reintroduces_short_spans() {
        let out = redact("she sells sea shells\n", &["e", "s"], REDACTION_MARKER);
        assert!(!out.contains('e'));
        assert!(!out.contains('s'));
        assert!(out.ends_with('\n'));
        assert!(!REDACTION_MARKER.chars().any(|c| c.is_ascii()));
    }

    #[test]
    fn redact_prefers_longer_pattern() {
        let out = redact("abc ab abc", &["ab", "abc"], "#");
        assert_eq!(out, "# # #");
        assert_eq!(redact("keep", &["", "zzz"], "#"), "keep");
        assert_eq!(redact("a\nb\n", &["a\n"], "[x]"), "[x]\nb\n");
    }

    #[test]
    fn custom_redaction_marker() {
        let mut log = log_with_reply(REPLY);
        PatchApplier::new()
            .with_redaction_marker("[elided]")
            .apply_to_log(&mut log, &scan(REPLY))
            .unwrap();
        assert!(log.last_message().unwrap().content.contains("[elided]\n"));
    }

    #[test]
    fn failure_policy_parses_and_deserializes() {
        assert_eq!("Abort".parse::<FailurePolicy>().unwrap(), FailurePolicy::Abort);
        assert!("retry".parse::<FailurePolicy>().is_err());
        let policy: FailurePolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, FailurePolicy::Skip);
    }
}
