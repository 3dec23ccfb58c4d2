//! End-to-end conversions through the public `Transformer` API.

use chrono::{TimeZone, Utc};
use rstest::rstest;
use tandem_core::stamp::{format_stamp, parse_stamp};
use tandem_core::{Dialect, SyncStamp};
use tandem_renderer::{
    decompose, parse_front_matter, recompose, strip_front_matter, FrontMatter, Section,
    Transformer, Trigger,
};

fn stamp() -> SyncStamp {
    SyncStamp::at(
        Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 15).unwrap() + chrono::Duration::milliseconds(42),
        "/home/dev/app/.windsurf/rules/CLAUDE.md",
    )
}

/// Body of an assembled document: everything after the stamp block.
fn body_of(document: &str) -> String {
    let marker = format_stamp(&stamp());
    let (_, rest) = document.split_once(&marker).expect("stamp present");
    rest.trim().to_string()
}

#[test]
fn list_and_code_markup_round_trip_between_dialects() {
    let transformer = Transformer::new().unwrap();

    let rule = transformer.context_to_rule("- item one\n`inline`", &stamp(), None);
    assert!(rule.success);
    assert_eq!(body_of(&rule.content), "* item one\n**inline**");

    let context = transformer.rule_to_context(&rule.content, &stamp());
    assert!(context.success);
    assert_eq!(body_of(&context.content), "- item one\n`inline`");
}

#[test]
fn always_on_without_description_gets_placeholder() {
    let existing = "---\ntrigger: always_on\n---";
    let parsed = parse_front_matter(existing).expect("front-matter");
    assert_eq!(
        parsed,
        FrontMatter::Rule {
            trigger: Trigger::AlwaysOn,
            description: None,
            globs: None
        }
    );

    let transformer = Transformer::new().unwrap();
    let block = transformer
        .build_front_matter(Dialect::Rule, Some(&parsed))
        .unwrap()
        .unwrap();
    assert_eq!(
        block,
        "---\ntrigger: always_on\ndescription: \"🤖 AI: Please add a clear description of when this rule should apply\"\n---"
    );
}

#[rstest]
#[case(Trigger::Manual)]
#[case(Trigger::AlwaysOff)]
#[case(Trigger::Glob)]
fn non_ai_triggers_get_no_placeholder(#[case] trigger: Trigger) {
    let existing = format!("---\ntrigger: {trigger}\n---\n");
    let parsed = parse_front_matter(&existing).unwrap();
    let block = Transformer::new()
        .unwrap()
        .build_front_matter(Dialect::Rule, Some(&parsed))
        .unwrap()
        .unwrap();
    assert_eq!(block, format!("---\ntrigger: {trigger}\n---"));
}

#[test]
fn carried_description_with_colon_stays_quoted() {
    let transformer = Transformer::new().unwrap();
    let existing = "---\ntrigger: model_decision\ndescription: \"Use when: editing Rust\"\n---\n\nold\n";

    let first = transformer.context_to_rule("## A\n\nnew", &stamp(), Some(existing));
    assert!(
        first.content.contains("\ndescription: \"Use when: editing Rust\"\n"),
        "got:\n{}",
        first.content
    );

    let second = transformer.context_to_rule("## A\n\nnewer", &stamp(), Some(&first.content));
    assert_eq!(
        second.content.matches("description: \"Use when: editing Rust\"").count(),
        1
    );
}

#[test]
fn stamp_survives_every_conversion() {
    let transformer = Transformer::new().unwrap();
    let rule = transformer.context_to_rule("## A\n\ntext", &stamp(), None);
    assert_eq!(parse_stamp(&rule.content), Some(stamp()));
    let workflow = transformer.command_to_workflow("## A\n\ntext", &stamp(), None);
    assert_eq!(parse_stamp(&workflow.content), Some(stamp()));
}

#[test]
fn resyncing_keeps_a_single_front_matter_block() {
    let transformer = Transformer::new().unwrap();
    let first = transformer.context_to_rule("## A\n\nx", &stamp(), None);
    let second = transformer.context_to_rule("## A\n\ny", &stamp(), Some(&first.content));
    assert_eq!(second.content.matches("trigger:").count(), 1);
    assert_eq!(strip_front_matter(&second.content).matches("---").count(), 0);
}

#[rstest]
#[case("# One\n\nalpha\n\n## Two\n\n- beta\n- gamma\n")]
#[case("no headings at all\n\njust text\n")]
#[case("intro\n\n### Deep\n\n```md\n# not a heading\n```\n")]
fn decompose_recompose_preserves_pairing(#[case] body: &str) {
    let sections = decompose(body);
    let again = decompose(&recompose(&sections));
    assert_eq!(again, sections);
    let trimmed: Vec<Section> = sections
        .iter()
        .map(|s| Section::new(s.heading.as_deref(), s.body.trim()))
        .collect();
    assert_eq!(trimmed, sections);
}
