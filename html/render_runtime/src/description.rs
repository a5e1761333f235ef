//! Resource descriptions, the items the factory accepts, and cell content.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Children = IndexMap<String, Description>;

/// Declarative description of one widget instance.
///
/// Deserializes from any JSON value; the widget type is read from `type` or
/// `class_name`, and non-object inputs yield an empty description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Description {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub settings: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub state: Value,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: Children,
}

impl Description {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, child: Description) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    pub fn widget_type(&self) -> String {
        self.kind.to_ascii_lowercase()
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    /// Sets one settings key, turning a null settings value into an object.
    /// Non-object settings are left untouched for the renderer to reject.
    pub fn set_setting(&mut self, key: &str, value: Value) {
        if self.settings.is_null() {
            self.settings = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.settings {
            map.insert(key.to_string(), value);
        }
    }

    /// Settings as handed to a renderer: the description's `children` scope is
    /// injected under `settings.children` so nested renders can see it.
    pub fn settings_with_children(&self) -> Value {
        if self.children.is_empty() {
            return self.settings.clone();
        }

        let mut settings = self.settings.clone();
        if settings.is_null() {
            settings = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut settings {
            let children = self
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.to_value()))
                .collect();
            map.insert("children".to_string(), Value::Object(children));
        }
        settings
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let kind = object
            .get("type")
            .or_else(|| object.get("class_name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let children = match object.get("children") {
            Some(Value::Object(children)) => children
                .iter()
                .filter_map(|(name, child)| match child {
                    Value::Object(child) => Some((name.clone(), Self::from_object(child))),
                    _ => None,
                })
                .collect(),
            _ => Children::new(),
        };

        Self {
            kind,
            settings: object.get("settings").cloned().unwrap_or(Value::Null),
            state: object.get("state").cloned().unwrap_or(Value::Null),
            children,
        }
    }
}

impl From<Value> for Description {
    fn from(value: Value) -> Self {
        match &value {
            Value::Object(object) => Self::from_object(object),
            _ => Self::default(),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A name, looked up in the local scope and then through the resolver.
    Name(String),
    Inline(Description),
    Other(Value),
}

impl From<&Value> for Item {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::Name(name.clone()),
            Value::Object(object) => Self::Inline(Description::from_object(object)),
            other => Self::Other(other.clone()),
        }
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Description> for Item {
    fn from(description: Description) -> Self {
        Self::Inline(description)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Inline(description) => description.fmt(f),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Cell or child content shared by the composite widgets.
///
/// Branch order matters: `type` wins over `value`, which wins over `view`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Literal(String),
    View(String),
    Inline(Description),
}

impl Content {
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(object) = value else {
            return Self::Literal(stringify(value));
        };

        if object.contains_key("type") || object.contains_key("class_name") {
            return Self::Inline(Description::from_object(object));
        }
        if let Some(literal) = object.get("value") {
            return Self::Literal(stringify(literal));
        }
        if let Some(Value::String(view)) = object.get("view") {
            return Self::View(view.clone());
        }

        Self::Literal(stringify(value))
    }
}

pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
