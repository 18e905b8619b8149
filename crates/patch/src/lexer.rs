//! Patch instruction lexer.
//!
//! Scans an assistant reply for instructions of the form:
//!
//! ```text
//! src/app.py                  ← optional label line
//! <<<<<< SEARCH               ← open marker + opcode
//! print('hi')                 ← search span
//! =======                     ← optional divider
//! print('bye')                ← replace span
//! >>>>>> REPLACE              ← close marker + optional opcode
//! ```
//!
//! Grammar (line based, informal):
//! ```text
//! instruction = [label] [fence] open search [divider replace] close
//! open        = "<"{6,} WS? OPCODE
//! divider     = "="{6,}
//! close       = ">"{6,} [WS? OPCODE]
//! OPCODE      = [A-Za-z0-9_]+
//! ```
//!
//! The first close marker ends an instruction; anything else, including
//! marker-like lines, is span content. Lexing never fails: text outside
//! instructions and instructions never closed are skipped.

use tracing::debug;

use crate::instruction::PatchInstruction;

const MARKER_LEN: usize = 6;

/// An instruction whose close marker has not been seen yet.
struct Pending {
    label: Option<String>,
    opcode: String,
    line: usize,
    search: String,
}

impl Pending {
    fn finish(self, replace: Option<String>, close: Option<String>) -> PatchInstruction {
        // Without a divider there is no replace span and no closing pair.
        let opcode_close = if replace.is_some() { close } else { None };
        PatchInstruction {
            target_label: self.label,
            opcode_open: self.opcode,
            search_text: self.search,
            opcode_close,
            replace_text: replace,
            line: self.line,
        }
    }
}

enum State {
    /// Outside an instruction. `label` is the candidate from the previous
    /// line; `fenced` is set once a fence opener has been seen after it.
    Seeking { label: Option<String>, fenced: bool },
    /// Between the open marker and a divider or close marker.
    Search(Pending),
    /// Between the divider and the close marker.
    Replace(Pending, String),
}

/// Extract every instruction in `text`, in order of appearance.
pub fn scan(text: &str) -> Vec<PatchInstruction> {
    let mut out = Vec::new();
    let mut state = State::Seeking {
        label: None,
        fenced: false,
    };

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let bare = line.trim_end_matches(['\n', '\r']);
        state = match state {
            State::Seeking { label, fenced } => seek(label, fenced, bare, idx + 1),
            State::Search(mut pending) => {
                if let Some(close) = close_marker(bare) {
                    out.push(pending.finish(None, close));
                    idle()
                } else if is_divider(bare) {
                    State::Replace(pending, String::new())
                } else {
                    pending.search.push_str(line);
                    State::Search(pending)
                }
            }
            State::Replace(pending, mut replace) => {
                if let Some(close) = close_marker(bare) {
                    out.push(pending.finish(Some(replace), close));
                    idle()
                } else {
                    replace.push_str(line);
                    State::Replace(pending, replace)
                }
            }
        };
    }

    match state {
        State::Search(pending) | State::Replace(pending, _) => {
            debug!(line = pending.line, opcode = %pending.opcode, "Dropping unterminated patch instruction");
        }
        State::Seeking { .. } => {}
    }

    debug!(count = out.len(), "Scanned patch instructions");
    out
}

fn idle() -> State {
    State::Seeking {
        label: None,
        fenced: false,
    }
}

fn seek(label: Option<String>, fenced: bool, bare: &str, line: usize) -> State {
    if let Some(opcode) = open_marker(bare) {
        return State::Search(Pending {
            label,
            opcode,
            line,
            search: String::new(),
        });
    }

    let trimmed = bare.trim();
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        // One fence opener may sit between the label and the marker.
        return State::Seeking {
            label: if fenced { None } else { label },
            fenced: true,
        };
    }

    State::Seeking {
        label: clean_label(trimmed),
        fenced: false,
    }
}

/// Normalize a label line: `**app.py**`, `` `app.py`: `` and `### app.py`
/// all become `app.py`. Blank or marker-like lines are not labels.
fn clean_label(trimmed: &str) -> Option<String> {
    if trimmed.is_empty() || is_divider(trimmed) || close_marker(trimmed).is_some() {
        return None;
    }
    let label = trimmed
        .trim_start_matches('#')
        .trim()
        .trim_end_matches(':')
        .trim_matches(|c| c == '`' || c == '*')
        .trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// `<<<<<< OPCODE` → `Some("OPCODE")`.
fn open_marker(bare: &str) -> Option<String> {
    marker(bare, '<').and_then(|opcode| opcode.map(String::from))
}

/// `>>>>>> OPCODE` → `Some(Some("OPCODE"))`, bare `>>>>>>` → `Some(None)`.
fn close_marker(bare: &str) -> Option<Option<String>> {
    marker(bare, '>').map(|opcode| opcode.map(String::from))
}

/// A run of at least six `ch`, then nothing or a single opcode word.
fn marker(bare: &str, ch: char) -> Option<Option<&str>> {
    let trimmed = bare.trim();
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    if run < MARKER_LEN {
        return None;
    }
    // `ch` is ASCII, so `run` is also a byte offset.
    let opcode = trimmed[run..].trim();
    if opcode.is_empty() {
        return Some(None);
    }
    opcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then_some(Some(opcode))
}

fn is_divider(bare: &str) -> bool {
    let trimmed = bare.trim();
    trimmed.len() >= MARKER_LEN && trimmed.chars().all(|c| c == '=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{CHANGELOG, PatchOp, REPLACE, SEARCH};

    #[test]
    fn scans_labeled_search_replace() {
        let reply = "Here you go:\n\napp.py\n<<<<<< SEARCH\nprint('hi')\n=======\nprint('bye')\n>>>>>> REPLACE\n";
        let found = scan(reply);
        assert_eq!(found.len(), 1);
        let ins = &found[0];
        assert_eq!(ins.target_label.as_deref(), Some("app.py"));
        assert_eq!(ins.opcode_open, SEARCH);
        assert_eq!(ins.search_text, "print('hi')\n");
        assert_eq!(ins.opcode_close.as_deref(), Some(REPLACE));
        assert_eq!(ins.replace_text.as_deref(), Some("print('bye')\n"));
        assert_eq!(ins.line, 4);
    }

    #[test]
    fn close_marker_at_end_of_text_without_newline() {
        let found = scan("app.py\n<<<<<< SEARCH\na\n=======\nb\n>>>>>> REPLACE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].replace_text.as_deref(), Some("b\n"));
    }

    #[test]
    fn missing_divider_is_changelog_shaped() {
        let found = scan("<<<<<< CHANGELOG\nRenamed greeting\n>>>>>> CHANGELOG\n");
        assert_eq!(found.len(), 1);
        let ins = &found[0];
        assert_eq!(ins.opcode_open, CHANGELOG);
        assert_eq!(ins.opcode_close, None);
        assert_eq!(ins.replace_text, None);
        assert_eq!(ins.search_text, "Renamed greeting\n");
        assert_eq!(ins.target_label, None);
        assert_eq!(ins.op(), Some(PatchOp::Changelog { entry: "Renamed greeting\n" }));
    }

    #[test]
    fn search_without_divider_keeps_whole_span() {
        let found = scan("x.py\n<<<<<< SEARCH\none\ntwo\n>>>>>> REPLACE\n");
        assert_eq!(found[0].search_text, "one\ntwo\n");
        assert_eq!(found[0].opcode_close, None);
        assert_eq!(found[0].op(), None);
    }

    #[test]
    fn label_is_optional() {
        let found = scan("\n<<<<<< SEARCH_MISSION\nold\n=======\nnew\n>>>>>> REPLACE_MISSION\n");
        assert_eq!(found[0].target_label, None);
        assert!(matches!(found[0].op(), Some(PatchOp::ReplaceMission { .. })));
    }

    #[test]
    fn label_decorations_are_stripped() {
        for label in ["**src/app.py**", "`src/app.py`:", "### src/app.py", "src/app.py:"] {
            let reply = format!("{label}\n<<<<<< SEARCH\na\n=======\nb\n>>>>>> REPLACE\n");
            assert_eq!(scan(&reply)[0].target_label.as_deref(), Some("src/app.py"), "{label}");
        }
    }

    #[test]
    fn label_survives_fence_opener() {
        let reply = "app.py\n```python\n<<<<<< SEARCH\na\n=======\nb\n>>>>>> REPLACE\n```\n";
        let found = scan(reply);
        assert_eq!(found[0].target_label.as_deref(), Some("app.py"));
        assert_eq!(found[0].search_text, "a\n");
    }

    #[test]
    fn blank_line_breaks_label() {
        let found = scan("app.py\n\n<<<<<< SEARCH\na\n=======\nb\n>>>>>> REPLACE\n");
        assert_eq!(found[0].target_label, None);
    }

    #[test]
    fn multiple_instructions_in_order() {
        let reply = "\
a.py
<<<<<< SEARCH
1
=======
2
>>>>>> REPLACE
Some prose in between.
b.py
<<<<<< SEARCH
3
=======
4
>>>>>> REPLACE

<<<<<< CHANGELOG
Updated a and b
>>>>>> CHANGELOG
";
        let found = scan(reply);
        let labels: Vec<Option<&str>> = found.iter().map(|i| i.target_label.as_deref()).collect();
        assert_eq!(labels, [Some("a.py"), Some("b.py"), None]);
        assert_eq!(found[2].opcode_open, CHANGELOG);
    }

    #[test]
    fn embedded_open_marker_is_search_content() {
        let reply = "f.txt\n<<<<<< SEARCH\n<<<<<< SEARCH\n=======\nx\n>>>>>> REPLACE\n";
        let found = scan(reply);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].search_text, "<<<<<< SEARCH\n");
    }

    #[test]
    fn second_divider_is_replace_content() {
        let found = scan("f\n<<<<<< SEARCH\na\n=======\nb\n=======\nc\n>>>>>> REPLACE\n");
        assert_eq!(found[0].replace_text.as_deref(), Some("b\n=======\nc\n"));
    }

    #[test]
    fn unterminated_instruction_is_dropped() {
        assert!(scan("app.py\n<<<<<< SEARCH\nprint('hi')\n=======\n").is_empty());
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert!(scan("").is_empty());
        assert!(scan("No changes needed.\n<<< not a marker\n>>>>>> \n").is_empty());
        assert!(scan("<<<<<<\nno opcode\n>>>>>> X\n").is_empty());
    }

    #[test]
    fn bare_close_marker_accepted() {
        let found = scan("<<<<<< CHANGELOG\nTidy up\n>>>>>>\n");
        assert_eq!(found[0].op(), Some(PatchOp::Changelog { entry: "Tidy up\n" }));
    }

    #[test]
    fn longer_marker_runs_and_crlf() {
        let found = scan("app.py\r\n<<<<<<< SEARCH\r\na\r\n=======\r\nb\r\n>>>>>>> REPLACE\r\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].search_text, "a\r\n");
        assert_eq!(found[0].target_label.as_deref(), Some("app.py"));
    }
}
