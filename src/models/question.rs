// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a question (`preguntaCodigo`).
///
/// Stored documents carry it either as a string or as an integer. Both forms
/// are normalized to a string here so the rest of the crate compares codes
/// as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionCode(String);

impl QuestionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Integer form of the code, following the leading-digits rule used when
    /// the code was typed as a number (`"007"` -> `"7"`, `"12b"` -> `"12"`).
    /// `None` when the code does not start with a number.
    pub fn integer_form(&self) -> Option<String> {
        let trimmed = self.0.trim_start();
        let (sign, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        let value: i64 = format!("{sign}{digits}").parse().ok()?;
        Some(value.to_string())
    }

    /// Lookup variants in probing order: the code as given, then its integer
    /// form when that differs.
    pub fn lookup_variants(&self) -> Vec<String> {
        let mut variants = vec![self.0.clone()];
        if let Some(int) = self.integer_form() {
            if int != self.0 {
                variants.push(int);
            }
        }
        variants
    }
}

impl fmt::Display for QuestionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QuestionCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for QuestionCode {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for QuestionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Wire shapes a stored code may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawCode {
    /// Numeric zero, which documents use to mean "no code".
    fn is_zero(&self) -> bool {
        match self {
            RawCode::Text(_) => false,
            RawCode::Int(n) => *n == 0,
            RawCode::Float(f) => *f == 0.0,
        }
    }
}

impl From<RawCode> for QuestionCode {
    fn from(raw: RawCode) -> Self {
        match raw {
            RawCode::Text(s) => QuestionCode(s),
            RawCode::Int(n) => QuestionCode(n.to_string()),
            RawCode::Float(f) => QuestionCode(f.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for QuestionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RawCode::deserialize(deserializer)?.into())
    }
}

/// Question code as stored on a question document. A numeric `0` carries no
/// code and falls back to the positional key like a missing one; the string
/// `"0"` is a real code.
fn document_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<QuestionCode>, D::Error> {
    Ok(Option::<RawCode>::deserialize(deserializer)?
        .filter(|raw| !raw.is_zero())
        .map(QuestionCode::from))
}

/// Whether an option is the right answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correctness {
    Correct,
    #[default]
    Incorrect,
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// The key a user submits when selecting this option (e.g. "A").
    pub label: String,

    /// Response text, may contain HTML.
    pub text: String,

    #[serde(default)]
    pub correctness: Correctness,
}

impl AnswerOption {
    pub fn is_correct(&self) -> bool {
        self.correctness == Correctness::Correct
    }
}

/// Book/chapter/topic references attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_menu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_url: Option<String>,
}

/// A question document, either from a test's subcollection or from the
/// global question collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "document_code")]
    pub code: Option<QuestionCode>,

    /// Question text, may contain HTML.
    pub body: String,

    pub options: Vec<AnswerOption>,

    #[serde(default)]
    pub explanation: Option<String>,

    /// Base64-encoded image payload.
    #[serde(default)]
    pub image_base64: Option<String>,

    #[serde(default)]
    pub metadata: QuestionMetadata,
}

impl Question {
    /// The option flagged correct, if any.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct())
    }

    /// Text of the correct option, empty when none is flagged.
    pub fn correct_answer_text(&self) -> String {
        self.correct_option()
            .map(|o| o.text.clone())
            .unwrap_or_default()
    }

    /// Present, non-empty code.
    pub fn usable_code(&self) -> Option<&QuestionCode> {
        self.code.as_ref().filter(|c| !c.is_empty())
    }

    /// Key under which answers for this question are submitted: its code, or
    /// its position when the code is missing.
    ///
    /// Two code-less questions at the same position of different tests share
    /// a key, so the index fallback is only stable within one test.
    pub fn answer_key(&self, index: usize) -> String {
        match self.usable_code() {
            Some(code) => code.to_string(),
            None => index.to_string(),
        }
    }
}

/// Option as shown to a test taker (correctness hidden).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub label: String,
    pub text: String,
}

/// DTO for sending a question to a test taker (excludes the answer key and
/// the explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    /// Key to submit the answer under.
    pub key: String,
    pub body: String,
    pub options: Vec<PublicOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    pub metadata: QuestionMetadata,
}

impl PublicQuestion {
    pub fn from_question(question: &Question, index: usize) -> Self {
        Self {
            key: question.answer_key(index),
            body: question.body.clone(),
            options: question
                .options
                .iter()
                .map(|o| PublicOption {
                    label: o.label.clone(),
                    text: o.text.clone(),
                })
                .collect(),
            image_base64: question.image_base64.clone(),
            metadata: question.metadata.clone(),
        }
    }
}
