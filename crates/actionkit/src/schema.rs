// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Form schema descriptors, rendering and form-data collection.
//!
//! A schema is an ordered list of [`SchemaField`]s. Field names are the
//! submission keys and must be unique within a schema; rendered ids must be
//! unique within the document, so they are prefixed with the modal id unless
//! the field sets its own.
//!
//! Unchecked checkboxes are not part of submitted form data. Boolean fields
//! therefore render a hidden `0` input before the visible control, and
//! [`collect_form_data`] backfills `false` for any boolean field that is still
//! missing.

use crate::html::{attr, bool_attr, escape};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

lazy_static! {
    static ref ID_UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9_\-]+").unwrap();
}

/// Kind of form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Single-line text input.
    #[serde(alias = "text")]
    TextInput,
    /// Multi-line text input.
    #[serde(alias = "textarea")]
    Textarea,
    /// Select box.
    #[serde(alias = "select")]
    Select,
    /// Checkbox.
    #[serde(alias = "checkbox")]
    Checkbox,
    /// Toggle switch (a styled checkbox).
    #[serde(alias = "toggle")]
    Toggle,
    /// Hidden input.
    #[serde(alias = "hidden")]
    Hidden,
    /// Numeric input.
    #[serde(alias = "number")]
    NumberField,
}

impl FieldType {
    /// Returns true for checkbox-like fields that submit booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Toggle)
    }
}

/// One option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Displayed label.
    pub label: String,
}

/// Accepts `[{value, label}]` or `{value: label}`.
fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<SelectOption>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Object(map)) => Ok(map
            .into_iter()
            .map(|(value, label)| SelectOption {
                value,
                label: display_value(&label),
            })
            .collect()),
        Some(value @ JsonValue::Array(_)) => {
            serde_json::from_value(value).map_err(D::Error::custom)
        }
        Some(other) => Err(D::Error::custom(format!(
            "select options must be an array or an object, got {}",
            other
        ))),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single form field descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    /// Field kind.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Submission key.
    pub name: String,
    /// Element id; derived from the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown below the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Default value, used when the schema defaults have no entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    /// Native `required` attribute.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Native `disabled` attribute.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Native `readonly` attribute.
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    /// Hide the whole field wrapper.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Select options.
    #[serde(
        default,
        deserialize_with = "deserialize_options",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<SelectOption>,
    /// Allow selecting several options.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    /// Input type of a text input (`email`, `password`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Textarea rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Minimum of a number field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum of a number field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Step of a number field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl SchemaField {
    /// Creates a field of the given type.
    pub fn new(field_type: FieldType, name: impl Into<String>) -> Self {
        Self {
            field_type,
            name: name.into(),
            id: None,
            label: None,
            placeholder: None,
            hint: None,
            default: None,
            required: false,
            disabled: false,
            readonly: false,
            hidden: false,
            options: Vec::new(),
            multiple: false,
            input_type: None,
            rows: None,
            min: None,
            max: None,
            step: None,
        }
    }

    /// Creates a text input.
    pub fn text_input(name: impl Into<String>) -> Self {
        Self::new(FieldType::TextInput, name)
    }

    /// Creates a textarea.
    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(FieldType::Textarea, name)
    }

    /// Creates a select.
    pub fn select(name: impl Into<String>) -> Self {
        Self::new(FieldType::Select, name)
    }

    /// Creates a checkbox.
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(FieldType::Checkbox, name)
    }

    /// Creates a toggle.
    pub fn toggle(name: impl Into<String>) -> Self {
        Self::new(FieldType::Toggle, name)
    }

    /// Creates a hidden input.
    pub fn hidden_input(name: impl Into<String>) -> Self {
        Self::new(FieldType::Hidden, name)
    }

    /// Creates a number field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(FieldType::NumberField, name)
    }

    /// Sets the element id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the hint.
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Marks the field read-only.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Hides the field wrapper.
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds a select option.
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    /// Allows multiple selections.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Sets the input type of a text input.
    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Sets the textarea rows.
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the number range.
    pub fn range(mut self, min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self.step = step;
        self
    }

    /// Returns the rendered element id.
    pub fn element_id(&self, prefix: &str) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}-{}", prefix, ID_UNSAFE.replace_all(&self.name, "-")),
        }
    }
}

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A field has an empty name.
    #[error("Schema field {0} has an empty name")]
    EmptyName(usize),
    /// Two fields share a name.
    #[error("Duplicate schema field name: {0}")]
    DuplicateName(String),
    /// Two fields share an element id.
    #[error("Duplicate schema field id: {0}")]
    DuplicateId(String),
}

/// Checks name and id uniqueness.
pub fn validate_schema(fields: &[SchemaField], id_prefix: &str) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    for (index, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(SchemaError::EmptyName(index));
        }
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateName(field.name.clone()));
        }
        let id = field.element_id(id_prefix);
        if !ids.insert(id.clone()) {
            return Err(SchemaError::DuplicateId(id));
        }
    }
    Ok(())
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "on" | "true" | "yes"
    )
}

fn value_is_checked(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::String(s)) => is_truthy(s),
        Some(JsonValue::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn value_is_selected(value: Option<&JsonValue>, option: &str) -> bool {
    match value {
        Some(JsonValue::Array(items)) => items.iter().any(|v| display_value(v) == option),
        Some(v) => display_value(v) == option,
        None => false,
    }
}

/// Renders the form body of a schema.
///
/// Values come from `defaults` first and the field's own default second.
pub fn render_form(fields: &[SchemaField], defaults: &Map<String, JsonValue>, id_prefix: &str) -> String {
    let mut html = String::new();
    for field in fields {
        let value = defaults.get(&field.name).or(field.default.as_ref());
        html.push_str(&render_field(field, value, id_prefix));
        html.push('\n');
    }
    html
}

fn render_field(field: &SchemaField, value: Option<&JsonValue>, id_prefix: &str) -> String {
    let id = field.element_id(id_prefix);
    let common = format!(
        "{}{}{}{}{}",
        attr("name", &field.name),
        attr("id", &id),
        bool_attr("required", field.required),
        bool_attr("disabled", field.disabled),
        bool_attr("readonly", field.readonly),
    );
    let text_value = value.map(display_value).unwrap_or_default();
    let placeholder = field
        .placeholder
        .as_deref()
        .map(|p| attr("placeholder", p))
        .unwrap_or_default();

    let control = match field.field_type {
        FieldType::Hidden => {
            return format!(
                "<input type=\"hidden\"{}{}>",
                attr("name", &field.name),
                attr("value", &text_value)
            );
        }
        FieldType::Checkbox | FieldType::Toggle => {
            let class = if field.field_type == FieldType::Toggle {
                " class=\"ak-toggle\" role=\"switch\""
            } else {
                " class=\"ak-checkbox\""
            };
            format!(
                "<input type=\"hidden\"{} value=\"0\"><input type=\"checkbox\"{}{} value=\"1\"{}>",
                attr("name", &field.name),
                class,
                common,
                bool_attr("checked", value_is_checked(value)),
            )
        }
        FieldType::TextInput => format!(
            "<input type=\"{}\" class=\"ak-input\"{}{}{}>",
            escape(field.input_type.as_deref().unwrap_or("text")),
            common,
            attr("value", &text_value),
            placeholder,
        ),
        FieldType::NumberField => {
            let range: String = [("min", field.min), ("max", field.max), ("step", field.step)]
                .iter()
                .filter_map(|(name, v)| v.map(|v| attr(name, &v.to_string())))
                .collect();
            format!(
                "<input type=\"number\" class=\"ak-input\"{}{}{}{}>",
                common,
                range,
                attr("value", &text_value),
                placeholder,
            )
        }
        FieldType::Textarea => format!(
            "<textarea class=\"ak-textarea\"{}{}{}>{}</textarea>",
            common,
            attr("rows", &field.rows.unwrap_or(3).to_string()),
            placeholder,
            escape(&text_value),
        ),
        FieldType::Select => {
            let mut options = String::new();
            if !field.multiple {
                if let Some(p) = &field.placeholder {
                    options.push_str(&format!("<option value=\"\">{}</option>", escape(p)));
                }
            }
            for option in &field.options {
                options.push_str(&format!(
                    "<option{}{}>{}</option>",
                    attr("value", &option.value),
                    bool_attr("selected", value_is_selected(value, &option.value)),
                    escape(&option.label)
                ));
            }
            format!(
                "<select class=\"ak-select\"{}{}>{}</select>",
                common,
                bool_attr("multiple", field.multiple),
                options
            )
        }
    };

    let label = match &field.label {
        Some(label) => format!(
            "<label class=\"ak-label\" for=\"{}\">{}{}</label>",
            escape(&id),
            escape(label),
            if field.required { "<sup class=\"ak-required\">*</sup>" } else { "" }
        ),
        None => String::new(),
    };
    let hint = match &field.hint {
        Some(hint) => format!("<p class=\"ak-hint\">{}</p>", escape(hint)),
        None => String::new(),
    };

    let (first, second) = if field.field_type.is_boolean() {
        (control, label)
    } else {
        (label, control)
    };

    format!(
        "<div class=\"ak-field\"{}{}>{}{}{}</div>",
        attr("data-field", &field.name),
        bool_attr("hidden", field.hidden),
        first,
        second,
        hint
    )
}

/// Converts submitted `(name, value)` pairs into the data map sent to the gateway.
///
/// - Boolean fields become JSON booleans; any truthy submission wins over the
///   hidden `0` fallback.
/// - Number fields become numbers when parseable (empty becomes `null`).
/// - Multi-selects collect all values into an array.
/// - Everything else stays a string; the last submission wins.
///
/// Boolean fields that were not submitted at all are backfilled with `false`.
pub fn collect_form_data(fields: &[SchemaField], pairs: &[(String, String)]) -> Map<String, JsonValue> {
    let mut data = Map::new();

    for (name, value) in pairs {
        let field = fields.iter().find(|f| &f.name == name);
        match field {
            Some(f) if f.field_type.is_boolean() => {
                let already = matches!(data.get(name), Some(JsonValue::Bool(true)));
                data.insert(name.clone(), JsonValue::Bool(already || is_truthy(value)));
            }
            Some(f) if f.field_type == FieldType::Select && f.multiple => {
                let entry = data
                    .entry(name.clone())
                    .or_insert_with(|| JsonValue::Array(Vec::new()));
                if let JsonValue::Array(items) = entry {
                    items.push(JsonValue::String(value.clone()));
                }
            }
            Some(f) if f.field_type == FieldType::NumberField => {
                data.insert(name.clone(), parse_number(value));
            }
            _ => {
                data.insert(name.clone(), JsonValue::String(value.clone()));
            }
        }
    }

    backfill_booleans(fields, &mut data);
    data
}

/// Inserts `false` for every boolean field missing from `data`.
pub fn backfill_booleans(fields: &[SchemaField], data: &mut Map<String, JsonValue>) {
    for field in fields.iter().filter(|f| f.field_type.is_boolean()) {
        data.entry(field.name.clone()).or_insert(JsonValue::Bool(false));
    }
}

fn parse_number(value: &str) -> JsonValue {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return JsonValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return JsonValue::from(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(value.to_string()))
}
