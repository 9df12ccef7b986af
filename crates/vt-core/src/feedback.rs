//! Rendering of the vision model's outfit feedback.
//!
//! The backend returns either a pre-joined `formatted_text` blob or the raw
//! structured answer of the model (or both). [`format`] turns whichever is
//! usable into an ordered list of [`Section`]s and never returns an empty list.

use serde_json::{Map, Value};

pub const SCORE_SLOTS: usize = 10;
pub const FILLED_GLYPH: &str = "★";
pub const EMPTY_GLYPH: &str = "☆";

/// Feedback as delivered by the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackPayload {
    pub formatted_text: Option<String>,
    pub structured: Value,
}

impl FeedbackPayload {
    pub fn new(formatted_text: Option<String>, structured: Value) -> Self {
        // stored feedback comes back as a JSON-encoded string
        let structured = match structured {
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
                _ => Value::String(text),
            },
            other => other,
        };

        Self { formatted_text, structured }
    }

    pub fn structured(structured: Value) -> Self {
        Self::new(None, structured)
    }

    pub fn formatted(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// A section of `formatted_text`
    Text,
    Comment,
    Recommendations,
    Score,
    Diagnostic,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(kind: SectionKind, title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            lines,
        }
    }
}

pub fn format(payload: &FeedbackPayload) -> Vec<Section> {
    if let Some(text) = payload
        .formatted_text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        return split_sections(text);
    }

    let sections = match payload.structured.as_object() {
        Some(fields) => structured_sections(fields),
        None => Vec::new(),
    };

    if sections.is_empty() {
        return vec![raw_section(&payload.structured)];
    }
    sections
}

/// Blank lines separate sections; the first line of each section is its title.
fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut block, &mut sections);
        } else {
            block.push(line);
        }
    }
    flush_block(&mut block, &mut sections);

    sections
}

fn flush_block(block: &mut Vec<&str>, sections: &mut Vec<Section>) {
    let mut lines = block.drain(..);
    if let Some(title) = lines.next() {
        let details = lines.map(|line| line.trim_end().to_string()).collect();
        sections.push(Section::new(SectionKind::Text, title.trim(), details));
    }
}

fn structured_sections(fields: &Map<String, Value>) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(comment) = fields.get("feedback").and_then(text_of) {
        let lines = comment
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        sections.push(Section::new(SectionKind::Comment, "Detailed feedback", lines));
    }

    if let Some(items) = fields.get("recommendations").and_then(Value::as_array) {
        let bullets: Vec<String> = items
            .iter()
            .filter_map(text_of)
            .map(|item| format!("• {item}"))
            .collect();
        if !bullets.is_empty() {
            sections.push(Section::new(SectionKind::Recommendations, "Recommendations", bullets));
        }
    }

    if let Some(score) = fields.get("overall_score").filter(|score| !score.is_null()) {
        sections.push(Section::new(SectionKind::Score, "Overall score", vec![score_line(score)]));
    }

    if sections.is_empty() {
        if let Some(error) = fields.get("error").and_then(text_of) {
            let mut lines = vec![error];
            if let Some(details) = fields
                .get("details")
                .or_else(|| fields.get("error_details"))
                .and_then(text_of)
            {
                lines.push(details);
            }
            sections.push(Section::new(SectionKind::Diagnostic, "Feedback unavailable", lines));
        }
    }

    sections
}

/// `★★★★★★★☆☆☆ (7/10)`; filled glyphs are capped at ten.
pub fn score_line(score: &Value) -> String {
    match score.as_f64() {
        Some(value) => {
            let filled = value.clamp(0.0, SCORE_SLOTS as f64) as usize;
            format!(
                "{}{} ({}/{})",
                FILLED_GLYPH.repeat(filled),
                EMPTY_GLYPH.repeat(SCORE_SLOTS - filled),
                score,
                SCORE_SLOTS
            )
        }
        None => text_of(score).unwrap_or_default(),
    }
}

fn raw_section(value: &Value) -> Section {
    let dump = match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    let mut lines: Vec<String> = dump.lines().map(str::to_string).collect();
    if lines.iter().all(|line| line.trim().is_empty()) {
        lines = vec!["(empty feedback)".to_string()];
    }

    Section::new(SectionKind::Raw, "Raw feedback", lines)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}
