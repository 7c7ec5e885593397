use super::*;

#[test]
fn test_provider_parse_round_trip() {
    for provider in [AiProvider::Gemini, AiProvider::Grok, AiProvider::Cerebras] {
        assert_eq!(AiProvider::parse(provider.as_str()), Some(provider));
    }
    assert_eq!(AiProvider::parse("poe"), None);
}

#[test]
fn test_available_providers_reflect_keys() {
    let client = AiClient::new(
        Some("g".to_string()),
        None,
        Some("c".to_string()),
        Duration::from_secs(1),
    )
    .unwrap();

    assert_eq!(
        client.available_providers(),
        vec![AiProvider::Gemini, AiProvider::Cerebras]
    );
}

#[test]
fn test_extract_json_array_strips_prose() {
    let text = "Here you go!\n```json\n[{\"a\": 1}]\n```\nEnjoy.";

    assert_eq!(extract_json_array(text), Some("[{\"a\": 1}]"));
}

#[test]
fn test_extract_json_array_requires_brackets() {
    assert_eq!(extract_json_array("no json here"), None);
    assert_eq!(extract_json_array("] backwards ["), None);
}

#[test]
fn test_parse_generated_questions() {
    let text = r#"Sure! Here are your questions:
[
  {
    "question": "What is 2 + 2?",
    "options": {"a": "3", "b": "4", "c": "5", "d": "6"},
    "answer": "B",
    "explanation": "Two plus two is four."
  }
]"#;

    let questions = parse_generated_questions(text, "mathematics", Some("Arithmetic")).unwrap();

    assert_eq!(questions.len(), 1);
    let q = &questions[0];
    assert_eq!(q.get_subject(), "mathematics");
    assert_eq!(q.get_topic(), Some("Arithmetic".to_string()));
    assert_eq!(q.get_answer(), "b");
    assert!(q.is_ai_generated());
}

#[test]
fn test_parse_generated_questions_drops_invalid_entries() {
    let text = r#"[
  {"question": "Valid?", "options": {"a": "yes", "b": "no"}, "answer": "a"},
  {"question": "Bad answer", "options": {"a": "yes", "b": "no"}, "answer": "z"}
]"#;

    let questions = parse_generated_questions(text, "biology", None).unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].get_question(), "Valid?");
}

#[test]
fn test_parse_generated_questions_errors_on_garbage() {
    assert!(matches!(
        parse_generated_questions("not json at all", "biology", None),
        Err(SourceError::Malformed(_))
    ));
    assert!(matches!(
        parse_generated_questions("[{\"broken\": }]", "biology", None),
        Err(SourceError::Malformed(_))
    ));
}

#[test]
fn test_parse_generated_questions_errors_when_nothing_valid() {
    let text = r#"[{"question": "", "options": {}, "answer": "a"}]"#;

    assert!(matches!(
        parse_generated_questions(text, "biology", None),
        Err(SourceError::Malformed(_))
    ));
}

#[test]
fn test_parse_generated_flashcards() {
    let text = r#"[
  {"front": "Define osmosis", "back": "Movement of water across a membrane"},
  {"front": "  ", "back": "skipped"}
]"#;

    let cards = parse_generated_flashcards(text, "biology", "Transport");

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].get_front(), "Define osmosis");
    assert_eq!(cards[0].get_source(), "ai");
    assert_eq!(cards[0].get_topic(), "Transport");
}

#[test]
fn test_parse_generated_flashcards_degrades_to_empty() {
    assert!(parse_generated_flashcards("no json", "biology", "t").is_empty());
    assert!(parse_generated_flashcards("[{\"front\": }]", "biology", "t").is_empty());
}

#[test]
fn test_question_prompt_mentions_subject_and_topic() {
    let prompt = question_prompt("physics", Some("Optics"), 5);

    assert!(prompt.contains("5 JAMB UTME Physics questions"));
    assert!(prompt.contains("on the topic \"Optics\""));
    assert!(prompt.contains("ONLY the JSON array"));
}

#[test]
fn test_question_prompt_without_topic() {
    let prompt = question_prompt("crk", None, 10);

    assert!(prompt.contains("10 JAMB UTME Christian Religious Studies questions."));
    assert!(!prompt.contains("on the topic"));
}
