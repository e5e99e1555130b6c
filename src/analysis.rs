//! Analysis record - the canonical structured result of analysing a transcript.
//!
//! Models return loosely-typed JSON: any of the five fields may hold objects,
//! bare strings, a single scalar instead of a list, or be missing entirely.
//! [`AnalysisRecord::from_value`] is the one place that shape is inspected;
//! everything downstream works with [`Item`]s.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Keys that may carry an item's primary text, in priority order
const TEXT_KEYS: &[&str] = &[
    "task",
    "point",
    "key_point",
    "summary",
    "description",
    "decision",
    "text",
    "item",
    "title",
    "content",
    "name",
    "participant",
];
const ASSIGNEE_KEYS: &[&str] = &[
    "assignee",
    "owner",
    "responsible",
    "assigned_to",
    "person",
    "who",
];
const DEADLINE_KEYS: &[&str] = &["deadline", "due", "due_date", "date", "when"];
const CATEGORY_KEYS: &[&str] = &["category", "type", "topic", "role"];

/// Labels left behind when a model stringifies a dict into a list element
const STRAY_LABELS: &[&str] = &["summary", "point", "key_point"];

/// One entry of an analysis section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    /// Primary text: the task, decision, deadline, participant or summary point
    pub text: String,
    /// Person responsible, when the model named one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Due date or time frame, when the model named one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Free-form grouping (topic, role, category)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Secondary attributes as `(label, value)` pairs, in display order
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        let mut details = Vec::new();
        if let Some(assignee) = &self.assignee {
            details.push(("assignee", assignee.as_str()));
        }
        if let Some(deadline) = &self.deadline {
            details.push(("deadline", deadline.as_str()));
        }
        if let Some(category) = &self.category {
            details.push(("category", category.as_str()));
        }
        details
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        let details = self.details();
        if !details.is_empty() {
            let joined = details
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ({joined})")?;
        }
        Ok(())
    }
}

/// The five sections of an analysis, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ActionItems,
    Deadlines,
    Decisions,
    Participants,
    Summary,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::ActionItems,
        Section::Deadlines,
        Section::Decisions,
        Section::Participants,
        Section::Summary,
    ];

    /// JSON key used in model replies and exports
    pub fn key(self) -> &'static str {
        match self {
            Section::ActionItems => "action_items",
            Section::Deadlines => "deadlines",
            Section::Decisions => "decisions",
            Section::Participants => "participants",
            Section::Summary => "summary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::ActionItems => "Action Items",
            Section::Deadlines => "Important Deadlines",
            Section::Decisions => "Key Decisions",
            Section::Participants => "Meeting Participants",
            Section::Summary => "Executive Summary",
        }
    }

    /// Message shown when the section has no items
    pub fn empty_message(self) -> &'static str {
        match self {
            Section::ActionItems => "No specific action items identified",
            Section::Deadlines => "No specific deadlines mentioned",
            Section::Decisions => "No major decisions recorded",
            Section::Participants => "Participants not clearly identified",
            Section::Summary => "Summary not available",
        }
    }
}

/// Structured analysis of a meeting transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    /// Tasks that someone agreed to do
    #[serde(default)]
    pub action_items: Vec<Item>,
    /// Dates and time frames mentioned
    #[serde(default)]
    pub deadlines: Vec<Item>,
    /// Decisions made during the meeting
    #[serde(default)]
    pub decisions: Vec<Item>,
    /// People mentioned or present
    #[serde(default)]
    pub participants: Vec<Item>,
    /// Key points, usually three to five
    #[serde(default)]
    pub summary: Vec<Item>,
}

impl AnalysisRecord {
    /// Normalize a model's JSON object into the canonical record.
    ///
    /// Missing keys and `null`s become empty sections and unknown keys are
    /// ignored. Non-object input yields an empty record; callers that need
    /// to reject it check the shape first.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let section = |section: Section| normalize_section(object.get(section.key()));
        Self {
            action_items: section(Section::ActionItems),
            deadlines: section(Section::Deadlines),
            decisions: section(Section::Decisions),
            participants: section(Section::Participants),
            summary: section(Section::Summary),
        }
    }

    /// Items of one section
    pub fn items(&self, section: Section) -> &[Item] {
        match section {
            Section::ActionItems => &self.action_items,
            Section::Deadlines => &self.deadlines,
            Section::Decisions => &self.decisions,
            Section::Participants => &self.participants,
            Section::Summary => &self.summary,
        }
    }

    /// All sections paired with their items, in presentation order
    pub fn sections(&self) -> impl Iterator<Item = (Section, &[Item])> {
        Section::ALL
            .into_iter()
            .map(move |section| (section, self.items(section)))
    }

    /// Check if the analysis found anything at all
    pub fn is_empty(&self) -> bool {
        self.sections().all(|(_, items)| items.is_empty())
    }
}

fn normalize_section(value: Option<&Value>) -> Vec<Item> {
    let mut items = Vec::new();
    if let Some(value) = value {
        collect_items(value, &mut items);
    }
    items
}

fn collect_items(value: &Value, out: &mut Vec<Item>) {
    match value {
        Value::Null => {}
        Value::Array(elements) => {
            for element in elements {
                collect_items(element, out);
            }
        }
        Value::Object(fields) => {
            if let Some(item) = item_from_object(fields) {
                out.push(item);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                let cleaned = clean_text(&text);
                if !cleaned.is_empty() {
                    out.push(Item::new(cleaned));
                }
            }
        }
    }
}

fn item_from_object(fields: &Map<String, Value>) -> Option<Item> {
    let mut used: Vec<&'static str> = Vec::new();

    let text = take_field(fields, TEXT_KEYS, &mut used);
    let assignee = take_field(fields, ASSIGNEE_KEYS, &mut used);
    let text = text.or_else(|| take_field(fields, DEADLINE_KEYS, &mut used));
    let deadline = take_field(fields, DEADLINE_KEYS, &mut used);
    let category = take_field(fields, CATEGORY_KEYS, &mut used);

    let text = match text {
        Some(text) => clean_text(&text),
        None => remaining_fields(fields, &used),
    };
    if text.is_empty() {
        return None;
    }

    Some(Item {
        text,
        assignee,
        deadline,
        category,
    })
}

/// First non-empty value among `keys` not already consumed
fn take_field(
    fields: &Map<String, Value>,
    keys: &[&'static str],
    used: &mut Vec<&'static str>,
) -> Option<String> {
    let (key, text) = keys
        .iter()
        .filter(|key| !used.contains(*key))
        .find_map(|key| fields.get(*key).and_then(field_text).map(|text| (*key, text)))?;
    used.push(key);
    Some(text)
}

/// Render unrecognised fields as `key: value` pairs
fn remaining_fields(fields: &Map<String, Value>, used: &[&str]) -> String {
    fields
        .iter()
        .filter(|(key, _)| !used.iter().any(|u| *u == key.as_str()))
        .filter_map(|(key, value)| field_text(value).map(|text| format!("{key}: {text}")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Text of a field value; lists are joined, nested objects are skipped
fn field_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Array(elements) => elements
            .iter()
            .filter_map(scalar_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other)?.trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Tidy a bare string element.
///
/// Only undoes damage from a dict that was stringified into a list element:
/// a `{...}` wrapper, a quoted `'summary':`-style label, and a quote pair
/// enclosing the whole text. Quotes inside ordinary text are kept.
pub fn clean_text(raw: &str) -> String {
    let mut text = raw.trim();

    let dict_like = text.len() >= 2 && text.starts_with('{') && text.ends_with('}');
    if dict_like {
        text = text[1..text.len() - 1].trim();
    }
    if let Some(rest) = strip_label(text, dict_like) {
        text = rest.trim();
    }

    unwrap_quotes(text).trim().to_string()
}

/// Strip a leading stray label. Outside a `{...}` wrapper the label must
/// itself be quoted, so text like `Summary: ...` is left alone.
fn strip_label(text: &str, dict_like: bool) -> Option<&str> {
    STRAY_LABELS.iter().find_map(|label| {
        let quoted = ['\'', '"'].into_iter().find_map(|quote| {
            text.strip_prefix(quote)?
                .strip_prefix(label)?
                .strip_prefix(quote)?
                .trim_start()
                .strip_prefix(':')
        });
        let bare = || {
            text.strip_prefix(label)?
                .trim_start()
                .strip_prefix(':')
        };
        quoted.or_else(|| if dict_like { bare() } else { None })
    })
}

/// Remove one pair of matching quotes enclosing the whole text
fn unwrap_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            if !inner.contains(quote) {
                return inner;
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_reply_maps_field_by_field() {
        let value = json!({
            "action_items": [
                {"task": "Send the Q3 deck", "assignee": "Sarah", "deadline": "Friday"}
            ],
            "deadlines": ["Campaign launch next Friday"],
            "decisions": ["Move standup to 9:30"],
            "participants": ["John", "Sarah"],
            "summary": [{"point": "Marketing is on track", "category": "Marketing"}]
        });

        let record = AnalysisRecord::from_value(&value);
        assert_eq!(
            record.action_items,
            vec![Item::new("Send the Q3 deck")
                .with_assignee("Sarah")
                .with_deadline("Friday")]
        );
        assert_eq!(record.deadlines, vec![Item::new("Campaign launch next Friday")]);
        assert_eq!(record.decisions, vec![Item::new("Move standup to 9:30")]);
        assert_eq!(record.participants, vec![Item::new("John"), Item::new("Sarah")]);
        assert_eq!(
            record.summary,
            vec![Item::new("Marketing is on track").with_category("Marketing")]
        );
    }

    #[test]
    fn bare_strings_become_primary_text() {
        let value = json!({"action_items": ["Book the venue", {"task": "Draft agenda"}]});
        let record = AnalysisRecord::from_value(&value);
        assert_eq!(
            record.action_items,
            vec![Item::new("Book the venue"), Item::new("Draft agenda")]
        );
    }

    #[test]
    fn missing_and_null_sections_are_empty() {
        let record = AnalysisRecord::from_value(&json!({
            "decisions": null,
            "summary": ["Short meeting"]
        }));
        assert!(record.action_items.is_empty());
        assert!(record.deadlines.is_empty());
        assert!(record.decisions.is_empty());
        assert!(record.participants.is_empty());
        assert_eq!(record.summary.len(), 1);
        assert!(!record.is_empty());
    }

    #[test]
    fn scalar_section_becomes_single_item() {
        let record = AnalysisRecord::from_value(&json!({
            "summary": "The team agreed on the roadmap.",
            "participants": {"name": "Priya", "role": "PM"}
        }));
        assert_eq!(record.summary, vec![Item::new("The team agreed on the roadmap.")]);
        assert_eq!(
            record.participants,
            vec![Item::new("Priya").with_category("PM")]
        );
    }

    #[test]
    fn deadline_object_without_text_uses_date_as_text() {
        let record = AnalysisRecord::from_value(&json!({
            "deadlines": [{"date": "2024-05-01", "owner": "Ops"}]
        }));
        assert_eq!(
            record.deadlines,
            vec![Item::new("2024-05-01").with_assignee("Ops")]
        );
    }

    #[test]
    fn deadline_with_description_keeps_both() {
        let record = AnalysisRecord::from_value(&json!({
            "deadlines": [{"description": "Budget review", "date": "June 3"}]
        }));
        assert_eq!(
            record.deadlines,
            vec![Item::new("Budget review").with_deadline("June 3")]
        );
    }

    #[test]
    fn unknown_object_keys_are_rendered_as_pairs() {
        let record = AnalysisRecord::from_value(&json!({
            "decisions": [{"vendor": "Acme", "budget": 5000}]
        }));
        assert_eq!(record.decisions.len(), 1);
        let text = &record.decisions[0].text;
        assert!(text.contains("vendor: Acme"));
        assert!(text.contains("budget: 5000"));
    }

    #[test]
    fn list_valued_assignee_is_joined() {
        let record = AnalysisRecord::from_value(&json!({
            "action_items": [{"task": "Write tests", "assignee": ["Ana", "Bo"]}]
        }));
        assert_eq!(record.action_items[0].assignee.as_deref(), Some("Ana, Bo"));
    }

    #[test]
    fn nested_lists_flatten_and_empties_drop() {
        let record = AnalysisRecord::from_value(&json!({
            "summary": [["First", null], "", "  ", {"category": ""}, 42]
        }));
        assert_eq!(record.summary, vec![Item::new("First"), Item::new("42")]);
    }

    #[test]
    fn extra_keys_are_ignored() {
        let record = AnalysisRecord::from_value(&json!({
            "sentiment": "positive",
            "participants": ["Lee"]
        }));
        assert_eq!(record.participants, vec![Item::new("Lee")]);
        assert!(record.summary.is_empty());
    }

    #[test]
    fn non_object_value_yields_empty_record() {
        assert!(AnalysisRecord::from_value(&json!(["a", "b"])).is_empty());
    }

    #[test]
    fn stringified_dicts_are_cleaned() {
        assert_eq!(clean_text("{'summary': 'Budget approved'}"), "Budget approved");
        assert_eq!(clean_text("'point': Hiring freeze lifted"), "Hiring freeze lifted");
        assert_eq!(clean_text("  \"Plain text\"  "), "Plain text");
        assert_eq!(clean_text("pointless meeting"), "pointless meeting");
        assert_eq!(clean_text("{point: Ship on Friday}"), "Ship on Friday");
    }

    #[test]
    fn inner_quotes_in_plain_strings_are_kept() {
        assert_eq!(clean_text("Adopt \"Option A\""), "Adopt \"Option A\"");
        assert_eq!(clean_text("Go with 'Plan B'"), "Go with 'Plan B'");
        assert_eq!(clean_text("'Summary' team"), "'Summary' team");
        assert_eq!(clean_text("Summary: budget approved"), "Summary: budget approved");
        assert_eq!(clean_text("\"A\" or \"B\""), "\"A\" or \"B\"");
        assert_eq!(clean_text("{braces} in text"), "{braces} in text");
    }

    #[test]
    fn quoted_decisions_survive_normalization() {
        let record = AnalysisRecord::from_value(&json!({
            "decisions": ["Adopt \"Option A\"", "Go with 'Plan B'"],
            "participants": ["'Summary' team"]
        }));
        assert_eq!(
            record.decisions,
            vec![Item::new("Adopt \"Option A\""), Item::new("Go with 'Plan B'")]
        );
        assert_eq!(record.participants, vec![Item::new("'Summary' team")]);
    }

    #[test]
    fn display_appends_details() {
        let item = Item::new("Ship v2").with_assignee("Kim").with_deadline("Q3");
        assert_eq!(item.to_string(), "Ship v2 (assignee: Kim, deadline: Q3)");
        assert_eq!(Item::new("Ship v2").to_string(), "Ship v2");
    }

    #[test]
    fn sections_follow_presentation_order() {
        let keys: Vec<_> = AnalysisRecord::default()
            .sections()
            .map(|(section, _)| section.key())
            .collect();
        assert_eq!(
            keys,
            ["action_items", "deadlines", "decisions", "participants", "summary"]
        );
    }
}
