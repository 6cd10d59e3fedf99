//! Settings form
//!
//! Builds an editable form from a [`SettingsObject`]'s form config, renders
//! it to HTML and writes submitted values back to the object's category.

use crate::object::{BoundSettings, SettingsObject};
use crate::store::SettingsStore;
use crate::{Result, SettingsError};
use dbsettings_types::{FieldOption, FieldSpec, InputType, SettingsMap};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Name under which field values are posted, e.g. `Settings[host]`
pub const FORM_NAMESPACE: &str = "Settings";

/// Message shown after a successful save
pub const SAVED_MESSAGE: &str = "Settings have been saved";

/// Renders a field itself, given the form model and the field name
pub type CustomRenderer = Arc<dyn Fn(&FormModel, &str) -> String + Send + Sync>;

/// A form field: a declarative spec, optionally rendered by a custom function
#[derive(Clone)]
pub struct FormField {
    pub spec: FieldSpec,
    pub renderer: Option<CustomRenderer>,
}

impl FormField {
    pub fn custom(
        name: impl Into<String>,
        renderer: impl Fn(&FormModel, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            spec: FieldSpec::text(name),
            renderer: Some(Arc::new(renderer)),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Label as configured, or generated from the field name
    pub fn label(&self) -> String {
        self.spec
            .label
            .clone()
            .unwrap_or_else(|| generate_label(&self.spec.name))
    }
}

impl From<FieldSpec> for FormField {
    fn from(spec: FieldSpec) -> Self {
        Self {
            spec,
            renderer: None,
        }
    }
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormField")
            .field("spec", &self.spec)
            .field("custom", &self.renderer.is_some())
            .finish()
    }
}

/// Check that every choice field has options to choose from
pub fn validate_config(fields: &[FormField]) -> Result<()> {
    for field in fields {
        if field.renderer.is_none()
            && field.spec.input.requires_options()
            && field.spec.options.is_empty()
        {
            return Err(SettingsError::InvalidFormConfig(format!(
                "Input type {} requires `options` property",
                field.spec.input
            )));
        }
    }
    Ok(())
}

/// Field values of a form, restricted to the configured field names
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    names: Vec<String>,
    values: SettingsMap,
}

impl FormModel {
    pub fn new(names: Vec<String>) -> Self {
        let values = names.iter().map(|n| (n.clone(), Value::Null)).collect();
        Self { names, values }
    }

    /// Assign values for known fields; other names are ignored
    pub fn set_attributes(&mut self, values: &SettingsMap) {
        for (name, value) in values {
            if let Some(slot) = self.values.get_mut(name) {
                *slot = value.clone();
            }
        }
    }

    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Null)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn attributes(&self) -> &SettingsMap {
        &self.values
    }
}

/// A settings form bound to one category
#[derive(Debug)]
pub struct SettingsForm {
    category: String,
    fields: Vec<FormField>,
    model: FormModel,
    saved: bool,
}

impl SettingsForm {
    /// Build the form for `object`, filled with its current settings
    ///
    /// The field config is validated before anything is loaded.
    pub async fn build(object: &dyn SettingsObject, store: &mut SettingsStore) -> Result<Self> {
        let fields = object.settings_form_config();
        validate_config(&fields)?;

        let mut model = FormModel::new(fields.iter().map(|f| f.spec.name.clone()).collect());
        let current = object.settings(store).get_settings(SettingsMap::new()).await?;
        model.set_attributes(&current);

        for field in &fields {
            if let Some(default) = &field.spec.default {
                if is_empty_value(model.value(&field.spec.name)) {
                    model
                        .values
                        .insert(field.spec.name.clone(), default.clone());
                }
            }
        }

        debug!(
            "Built settings form for {} with {} fields",
            object.settings_category(),
            fields.len()
        );

        Ok(Self {
            category: object.settings_category().to_string(),
            fields,
            model,
            saved: false,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Apply posted values and save every field of the form
    ///
    /// Does nothing when nothing was posted. Returns whether the form saved.
    pub async fn submit(&mut self, posted: &SettingsMap, store: &mut SettingsStore) -> Result<bool> {
        if posted.is_empty() {
            return Ok(false);
        }

        self.model.set_attributes(posted);
        BoundSettings::new(store, self.category.as_str())
            .set_settings(self.model.values.clone())
            .await?;
        self.saved = true;

        info!("Saved settings form for {}", self.category);
        Ok(true)
    }

    /// Render the form as HTML
    pub fn render(&self) -> String {
        let mut html = String::from("<form method=\"post\" class=\"settings-form\">\n");

        if self.saved {
            html.push_str(&format!(
                "<div class=\"alert alert-success\">{}</div>\n",
                escape_html(SAVED_MESSAGE)
            ));
        }

        for field in &self.fields {
            let name = field.name();
            match &field.renderer {
                Some(render) => html.push_str(&render(&self.model, name)),
                None => html.push_str(&self.render_builtin(field)),
            }
            html.push('\n');
        }

        html.push_str(
            "<div class=\"form-group\"><button type=\"submit\" class=\"btn btn-primary\">Save</button></div>\n",
        );
        html.push_str("</form>\n");
        html
    }

    fn render_builtin(&self, field: &FormField) -> String {
        let name = field.name();
        let id = format!("settings-{}", escape_html(name));
        let value = self.model.value(name);

        let mut html = format!(
            "<div class=\"form-group field-{id}\">\n<label class=\"control-label\" for=\"{id}\">{}</label>\n",
            escape_html(&field.label())
        );

        match field.spec.input {
            InputType::Text => {
                html.push_str(&format!(
                    "<input type=\"text\" id=\"{id}\" class=\"form-control\" name=\"{}\" value=\"{}\">\n",
                    field_name(name),
                    escape_html(&value_to_string(value))
                ));
            }
            InputType::Dropdown => {
                html.push_str(&format!(
                    "<select id=\"{id}\" class=\"form-control\" name=\"{}\">\n",
                    field_name(name)
                ));
                let selected = value_to_string(value);
                for option in &field.spec.options {
                    html.push_str(&format!(
                        "<option value=\"{}\"{}>{}</option>\n",
                        escape_html(&option.value),
                        if option.value == selected { " selected" } else { "" },
                        escape_html(&option.label)
                    ));
                }
                html.push_str("</select>\n");
            }
            InputType::CheckboxList => {
                // Posts an empty value when nothing is checked
                html.push_str(&format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"\">\n<div id=\"{id}\">\n",
                    field_name(name)
                ));
                for option in &field.spec.options {
                    html.push_str(&format!(
                        "<div class=\"checkbox\"><label><input type=\"checkbox\" name=\"{}[]\" value=\"{}\"{}> {}</label></div>\n",
                        field_name(name),
                        escape_html(&option.value),
                        if is_checked(value, option) { " checked" } else { "" },
                        escape_html(&option.label)
                    ));
                }
                html.push_str("</div>\n");
            }
        }

        html.push_str("</div>");
        html
    }
}

/// Collect url-encoded form pairs posted under [`FORM_NAMESPACE`]
///
/// `Settings[name]` becomes a string value, repeated `Settings[name][]`
/// entries become an array. Pairs outside the namespace are skipped.
pub fn parse_posted(pairs: &[(String, String)]) -> SettingsMap {
    let mut posted = SettingsMap::new();
    let prefix = format!("{}[", FORM_NAMESPACE);

    for (name, value) in pairs {
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Some(field) = rest.strip_suffix("][]") {
            let entry = posted
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            if let Value::Array(items) = entry {
                items.push(Value::String(value.clone()));
            }
        } else if let Some(field) = rest.strip_suffix(']') {
            posted.insert(field.to_string(), Value::String(value.clone()));
        }
    }

    posted
}

/// Turn a field name into a label: `smtp_host` and `smtpHost` become "Smtp Host"
pub fn generate_label(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev_upper = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            spaced.push(' ');
            prev_upper = false;
            continue;
        }
        if ch.is_uppercase() && !prev_upper {
            spaced.push(' ');
        }
        prev_upper = ch.is_uppercase();
        spaced.extend(ch.to_lowercase());
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a value counts as unset when deciding to apply a field default
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn field_name(name: &str) -> String {
    format!("{}[{}]", FORM_NAMESPACE, escape_html(name))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_checked(value: &Value, option: &FieldOption) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| value_to_string(v) == option.value),
        Value::Null => false,
        other => value_to_string(other) == option.value,
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
