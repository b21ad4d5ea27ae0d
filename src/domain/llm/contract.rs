//! Structured-output contracts for LLM replies
//!
//! Every prompt the pipeline sends asks for a single JSON object. Replies are
//! parsed here: Markdown fences are stripped, the object is located, bare keys
//! are tolerated, and the declared schema is checked before any field is read.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::domain::DomainError;

static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([\{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).unwrap());

/// Why a reply failed its contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("empty response")]
    Empty,

    #[error("no JSON object found in response")]
    NoObject,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Expected JSON type of a contract field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Text,
    /// A string or an array of strings
    TextOrList,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Text => value.is_string(),
            Self::TextOrList => {
                value.is_string()
                    || value
                        .as_array()
                        .is_some_and(|items| items.iter().all(|v| v.is_string() || v.is_number()))
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Text => "a string",
            Self::TextOrList => "a string or a list of strings",
        }
    }
}

/// One field of a contract schema, with the names the model may use for it
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub names: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(names: &'static [&'static str], kind: FieldKind) -> Self {
        Self {
            names,
            kind,
            required: true,
        }
    }

    pub const fn optional(names: &'static [&'static str], kind: FieldKind) -> Self {
        Self {
            names,
            kind,
            required: false,
        }
    }

    fn primary_name(&self) -> &'static str {
        self.names.first().copied().unwrap_or("?")
    }
}

/// A typed reply shape the model is instructed to produce
pub trait ResponseContract: DeserializeOwned {
    fn schema() -> &'static [FieldSpec];
}

/// Parse a raw model reply into a contract type
pub fn parse_contract<T: ResponseContract>(raw: &str) -> Result<T, ContractViolation> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ContractViolation::Empty);
    }

    let object = extract_object(body).ok_or(ContractViolation::NoObject)?;
    let value = parse_lenient(object)?;

    validate_schema(&value, T::schema())?;

    serde_json::from_value(value).map_err(|e| ContractViolation::Malformed(e.to_string()))
}

/// Parse and wrap any violation into a domain error that keeps the raw reply
pub fn parse_contract_or_error<T: ResponseContract>(raw: &str) -> Result<T, DomainError> {
    parse_contract(raw).map_err(|violation| DomainError::contract_violation(violation.to_string(), raw))
}

/// Remove a surrounding ```json ... ``` fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    rest.trim_end().trim_end_matches("```").trim()
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_lenient(object: &str) -> Result<Value, ContractViolation> {
    match serde_json::from_str::<Value>(object) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            serde_json::from_str::<Value>(&quote_bare_keys(object))
                .map_err(|_| ContractViolation::Malformed(strict_err.to_string()))
        }
    }
}

/// Quotes bare object keys, leaving string literals untouched
fn quote_bare_keys(object: &str) -> String {
    let mut out = String::with_capacity(object.len() + 16);
    let mut segment_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in object.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                out.push_str(&object[segment_start..=i]);
                segment_start = i + 1;
                in_string = false;
            }
        } else if c == '"' {
            out.push_str(&BARE_KEY.replace_all(&object[segment_start..i], r#"$1"$2":"#));
            segment_start = i;
            in_string = true;
        }
    }

    let tail = &object[segment_start..];
    if in_string {
        out.push_str(tail);
    } else {
        out.push_str(&BARE_KEY.replace_all(tail, r#"$1"$2":"#));
    }
    out
}

fn validate_schema(value: &Value, schema: &[FieldSpec]) -> Result<(), ContractViolation> {
    let object = value.as_object().ok_or(ContractViolation::NoObject)?;

    for field in schema {
        let found = field.names.iter().find_map(|name| object.get(*name));

        match found {
            None | Some(Value::Null) if field.required => {
                return Err(ContractViolation::MissingField(field.primary_name()));
            }
            None | Some(Value::Null) => {}
            Some(v) if !field.kind.accepts(v) => {
                return Err(ContractViolation::WrongType {
                    field: field.primary_name(),
                    expected: field.kind.describe(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<Value>),
}

/// Accepts `"a, b c"` or `["a", "b"]` and yields a list of non-empty terms
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextOrList>::deserialize(deserializer)?;

    Ok(match value {
        None => Vec::new(),
        Some(TextOrList::Text(text)) => text
            .split(|c: char| matches!(c, ',' | '，' | '、' | ';' | '；' | '\n'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(TextOrList::List(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

/// Accepts a string or a list of strings, joining list items with newlines
pub fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(text) => return Ok(text),
        TextOrList::List(items) => items,
    };

    Ok(items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `{judgment, keywords}`: does the question concern a named entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordJudgment {
    #[serde(alias = "jud")]
    pub judgment: bool,
    #[serde(default, alias = "keyWords", deserialize_with = "string_or_list")]
    pub keywords: Vec<String>,
}

impl ResponseContract for KeywordJudgment {
    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            FieldSpec::required(&["judgment", "jud"], FieldKind::Bool),
            FieldSpec::optional(&["keywords", "keyWords"], FieldKind::TextOrList),
        ];
        SCHEMA
    }
}

/// `{answer}`: a final or persona answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerReply {
    #[serde(alias = "ans", deserialize_with = "text_or_list")]
    pub answer: String,
}

impl ResponseContract for AnswerReply {
    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[FieldSpec::required(&["answer", "ans"], FieldKind::TextOrList)];
        SCHEMA
    }
}

/// `{name}`: the most mentioned entity in a text slice
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityName {
    #[serde(alias = "entity")]
    pub name: String,
}

impl ResponseContract for EntityName {
    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[FieldSpec::required(&["name", "entity"], FieldKind::Text)];
        SCHEMA
    }
}

/// `{can_answer, message}`: direct answer, entity name, or follow-up questions
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanAnswer {
    #[serde(alias = "canAns")]
    pub can_answer: bool,
    #[serde(default, deserialize_with = "text_or_list")]
    pub message: String,
}

impl ResponseContract for CanAnswer {
    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            FieldSpec::required(&["can_answer", "canAns"], FieldKind::Bool),
            FieldSpec::required(&["message"], FieldKind::TextOrList),
        ];
        SCHEMA
    }
}

/// `{answer, keywords}`: final shallow-flow answer with keywords for ingestion
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerWithKeywords {
    #[serde(alias = "ans", deserialize_with = "text_or_list")]
    pub answer: String,
    #[serde(default, alias = "keyWords", deserialize_with = "string_or_list")]
    pub keywords: Vec<String>,
}

impl ResponseContract for AnswerWithKeywords {
    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            FieldSpec::required(&["answer", "ans"], FieldKind::TextOrList),
            FieldSpec::optional(&["keywords", "keyWords"], FieldKind::TextOrList),
        ];
        SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_json() {
        let parsed: KeywordJudgment =
            parse_contract(r#"{"judgment": true, "keywords": ["Saber", "Fate"]}"#).unwrap();

        assert!(parsed.judgment);
        assert_eq!(parsed.keywords, vec!["Saber", "Fate"]);
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let parsed: KeywordJudgment =
            parse_contract(r#"{"jud": false, "keyWords": []}"#).unwrap();

        assert!(!parsed.judgment);
        assert!(parsed.keywords.is_empty());
    }

    #[test]
    fn test_strips_markdown_fence() {
        let raw = "```json\n{\"ans\": \"Four.\"}\n```";
        let parsed: AnswerReply = parse_contract(raw).unwrap();
        assert_eq!(parsed.answer, "Four.");
    }

    #[test]
    fn test_strip_code_fence_without_fence_is_identity() {
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_tolerates_surrounding_prose() {
        let raw = "Sure! Here it is: {\"name\": \"Artoria\"} Hope that helps.";
        let parsed: EntityName = parse_contract(raw).unwrap();
        assert_eq!(parsed.name, "Artoria");
    }

    #[test]
    fn test_tolerates_bare_keys() {
        let raw = r#"{jud: true, keyWords: ["Fate/stay night"]}"#;
        let parsed: KeywordJudgment = parse_contract(raw).unwrap();

        assert!(parsed.judgment);
        assert_eq!(parsed.keywords, vec!["Fate/stay night"]);
    }

    #[test]
    fn test_bare_keys_leave_string_values_alone() {
        let raw = r#"{ans: "Saber, note: she is the king", extra: "a \"quoted, key: \" b"}"#;
        let parsed: AnswerReply = parse_contract(raw).unwrap();

        assert_eq!(parsed.answer, "Saber, note: she is the king");
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse_contract::<KeywordJudgment>(r#"{"keywords": ["x"]}"#).unwrap_err();
        assert_eq!(err, ContractViolation::MissingField("judgment"));
    }

    #[test]
    fn test_wrong_field_type() {
        let err = parse_contract::<KeywordJudgment>(r#"{"judgment": "yes"}"#).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::WrongType {
                field: "judgment",
                expected: "a boolean"
            }
        );
    }

    #[test]
    fn test_empty_and_non_json_replies() {
        assert_eq!(
            parse_contract::<AnswerReply>("   ").unwrap_err(),
            ContractViolation::Empty
        );
        assert_eq!(
            parse_contract::<AnswerReply>("I cannot answer that").unwrap_err(),
            ContractViolation::NoObject
        );
        assert!(matches!(
            parse_contract::<AnswerReply>("{ans: }").unwrap_err(),
            ContractViolation::Malformed(_)
        ));
    }

    #[test]
    fn test_can_answer_with_follow_up_list() {
        let raw = r#"{"canAns": false, "message": ["Which season?", "Which route?"]}"#;
        let parsed: CanAnswer = parse_contract(raw).unwrap();

        assert!(!parsed.can_answer);
        assert_eq!(parsed.message, "Which season?\nWhich route?");
    }

    #[test]
    fn test_keywords_as_delimited_string() {
        let raw = r#"{"ans": "She is a knight.", "keyWords": "Saber, King Arthur 、Excalibur"}"#;
        let parsed: AnswerWithKeywords = parse_contract(raw).unwrap();

        assert_eq!(parsed.answer, "She is a knight.");
        assert_eq!(
            parsed.keywords,
            vec!["Saber", "King Arthur", "Excalibur"]
        );
    }

    #[test]
    fn test_violation_becomes_domain_error_with_raw() {
        let err = parse_contract_or_error::<AnswerReply>("nope").unwrap_err();

        match err {
            DomainError::ContractViolation { raw, message } => {
                assert_eq!(raw, "nope");
                assert!(message.contains("no JSON object"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
