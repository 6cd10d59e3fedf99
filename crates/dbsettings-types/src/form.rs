//! Form field descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Built-in input kinds for a settings form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    #[default]
    Text,
    Dropdown,
    CheckboxList,
}

impl InputType {
    /// Whether the input renders from a list of options
    pub fn requires_options(&self) -> bool {
        matches!(self, InputType::Dropdown | InputType::CheckboxList)
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Text => write!(f, "text"),
            InputType::Dropdown => write!(f, "dropdown"),
            InputType::CheckboxList => write!(f, "checkboxList"),
        }
    }
}

/// One selectable option of a dropdown or checkbox list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative description of one settings form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub input: InputType,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: InputType::Text,
            options: Vec::new(),
            label: None,
            default: None,
        }
    }

    pub fn dropdown(name: impl Into<String>, options: Vec<FieldOption>) -> Self {
        Self {
            input: InputType::Dropdown,
            options,
            ..Self::text(name)
        }
    }

    pub fn checkbox_list(name: impl Into<String>, options: Vec<FieldOption>) -> Self {
        Self {
            input: InputType::CheckboxList,
            options,
            ..Self::text(name)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}
