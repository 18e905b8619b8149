use llmd_core::Message;
use llmd_document::conversation::{decode, encode};
use llmd_document::{Document, Section};
use proptest::prelude::*;

/// Plain lines, `#` lines that are not headings, and closed fences whose
/// contents include heading-like lines.
fn body() -> impl Strategy<Value = String> {
    let plain = "[a-z =*:-]{0,24}".prop_map(|l| l + "\n");
    let hashtag = "#[a-z]{1,8}( [a-z]{0,6})?".prop_map(|l| l + "\n");
    let fenced = (
        prop_oneof![Just("```"), Just("~~~")],
        "[a-z]{0,6}",
        proptest::collection::vec("(#{1,3} )?[a-z =]{1,12}", 0..4),
    )
        .prop_map(|(marker, info, inner)| {
            let mut block = format!("{marker}{info}\n");
            for line in inner {
                block.push_str(&line);
                block.push('\n');
            }
            block.push_str(marker);
            block.push('\n');
            block
        });
    proptest::collection::vec(prop_oneof![3 => plain, 1 => hashtag, 1 => fenced], 0..4)
        .prop_map(|chunks| chunks.concat())
}

fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9._/]{0,10}"
}

/// Prefix sibling titles with their index so they are unique and never reserved.
fn number(mut sections: Vec<Section>) -> Vec<Section> {
    for (i, section) in sections.iter_mut().enumerate() {
        section.title = format!("{i} {}", section.title);
    }
    sections
}

fn section_tree() -> impl Strategy<Value = Section> {
    let leaf = (title(), body()).prop_map(|(title, body)| Section::new(title).with_body(body));
    leaf.prop_recursive(3, 32, 4, |inner| {
        (title(), body(), proptest::collection::vec(inner, 0..4)).prop_map(
            |(title, body, children)| {
                let mut section = Section::new(title).with_body(body);
                section.children = number(children);
                section
            },
        )
    })
}

fn document() -> impl Strategy<Value = Document> {
    proptest::collection::vec(section_tree(), 0..4).prop_map(|sections| Document {
        sections: number(sections),
    })
}

fn message_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("[#a-zA-Z:\\\\ ]{1,20}", 1..5).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn prop_unparse_parse_is_identity(doc in document()) {
        let text = doc.unparse();
        let reparsed = Document::parse(&text).unwrap();
        prop_assert_eq!(&reparsed, &doc);
        prop_assert_eq!(reparsed.unparse(), text);
    }

    #[test]
    fn prop_encoded_thread_survives_document_round_trip(
        turns in proptest::collection::vec((message_text(), message_text()), 0..4)
    ) {
        let mut messages = Vec::new();
        for (human, assistant) in turns {
            messages.push(Message::user(human.trim()));
            messages.push(Message::assistant(assistant.trim()));
        }
        messages.retain(|m| !m.content.is_empty());

        let mut thread = Section::new("Conversation Thread");
        thread.children = encode(&messages);
        let doc = Document { sections: vec![Section::new("Project: p").with_child(thread)] };

        let reparsed = Document::parse(&doc.unparse()).unwrap();
        let thread = reparsed.find("Conversation Thread").unwrap();
        prop_assert_eq!(decode(thread), messages);
    }
}

#[test]
fn generated_fences_hide_headings() {
    let doc = Document {
        sections: vec![Section::new("A").with_body("```\n# inside\n```\n")],
    };
    let reparsed = Document::parse(&doc.unparse()).unwrap();
    assert_eq!(reparsed.count(), 1);
    assert_eq!(reparsed, doc);
}

#[test]
fn accepted_text_round_trips_byte_for_byte() {
    let samples = [
        "",
        "# A\n",
        "# A\n\n\n",
        "# A\nno newline at end",
        "# A\n## B\nb\n# C\n## D\n### E\n",
        "#  two spaces\n#tag\n",
        "# Code\n```\n# not a heading\n```\n## After\n",
        "# Windows\r\nline\r\n",
    ];
    for text in samples {
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.unparse(), text, "round trip failed for {text:?}");
    }
}
