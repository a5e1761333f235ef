use serde::Deserialize;
use serde_json::Value;

use crate::context::RenderingContext;
use crate::description::Children;
use crate::error::RenderError;
use crate::normalize::{Normalized, merge_fields, normalize};
use crate::result::RenderingResult;
use crate::vnode::{VElement, VNode};

use super::class_list;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnchorSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    pub href: Option<String>,
    pub command: Option<String>,
    pub blank: Option<bool>,
}
merge_fields!(settings AnchorSettings { class, href, command, blank });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnchorState {
    pub label: Option<String>,
}
merge_fields!(AnchorState { label });

/// `<a>` with `href` (default `#`), an optional `data-command` and
/// `target="_blank"` when `blank` is set.
pub fn anchor(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = AnchorSettings {
        href: Some("#".to_string()),
        ..AnchorSettings::default()
    };
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(defaults, AnchorState::default(), settings, state, context, result, "anchor")?;

    let mut node = VElement::new("a")
        .attr("id", id.as_str())
        .attr("href", settings.href.unwrap_or_default())
        .attr_opt("class", settings.class);
    if settings.blank == Some(true) {
        node = node.attr("target", "_blank").attr("rel", "noopener noreferrer");
    }
    node = node.attr_opt("data-command", settings.command);
    if let Some(label) = state.label {
        node = node.text(label);
    }

    result.add_vtree(id, node.into());
    Ok(result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    pub command: Option<String>,
    pub disabled: Option<bool>,
}
merge_fields!(settings ButtonSettings { class, kind, format, command, disabled });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ButtonState {
    pub label: Option<String>,
    pub disabled: Option<bool>,
}
merge_fields!(ButtonState { label, disabled });

pub fn button(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = ButtonSettings {
        kind: Some("button".to_string()),
        format: Some("primary".to_string()),
        ..ButtonSettings::default()
    };
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(defaults, ButtonState::default(), settings, state, context, result, "button")?;

    let format = settings.format.unwrap_or_default();
    let classes = class_list(&format!("button {format}"), settings.class.as_deref());
    let mut node = VElement::new("button")
        .attr("id", id.as_str())
        .attr("type", settings.kind.unwrap_or_default())
        .attr("class", classes.trim_end())
        .attr_opt("data-command", settings.command);
    if state.disabled.or(settings.disabled) == Some(true) {
        node = node.attr("disabled", "disabled");
    }
    if let Some(label) = state.label {
        node = node.text(label);
    }

    result.add_vtree(id, node.into());
    Ok(result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub required: Option<bool>,
}
merge_fields!(settings InputSettings { class, kind, name, placeholder, label, required });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub default: Option<Value>,
}
merge_fields!(InputState { default });

/// `<input>`, wrapped in a `<label>` when a label string is present.
pub fn input(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = InputSettings {
        kind: Some("text".to_string()),
        ..InputSettings::default()
    };
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(defaults, InputState::default(), settings, state, context, result, "input")?;

    let kind = settings.kind.unwrap_or_default();
    let mut field = VElement::new("input")
        .attr("id", id.as_str())
        .attr("type", kind.as_str())
        .attr_opt("name", settings.name)
        .attr_opt("class", settings.class)
        .attr_opt("placeholder", settings.placeholder);
    if settings.required == Some(true) {
        field = field.attr("required", "required");
    }
    match (kind.as_str(), state.default) {
        ("checkbox" | "radio", Some(Value::Bool(true))) => field = field.attr("checked", "checked"),
        ("checkbox" | "radio", _) | (_, None | Some(Value::Null)) => {}
        (_, Some(value)) => field = field.attr("value", crate::description::stringify(&value)),
    }

    let node = match settings.label.filter(|label| !label.is_empty()) {
        Some(label) => VElement::new("label")
            .attr("for", id.as_str())
            .text(label)
            .child(field),
        None => field,
    };

    result.add_vtree(id, node.into());
    Ok(result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    #[serde(rename = "for")]
    pub target: Option<String>,
}
merge_fields!(settings LabelSettings { class, target });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LabelState {
    pub text: Option<String>,
}
merge_fields!(LabelState { text });

pub fn label(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(
        LabelSettings::default(),
        LabelState::default(),
        settings,
        state,
        context,
        result,
        "label",
    )?;

    let node = VElement::new("label")
        .attr("id", id.as_str())
        .attr_opt("class", settings.class)
        .attr_opt("for", settings.target)
        .text(state.text.unwrap_or_default());

    result.add_vtree(id, node.into());
    Ok(result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<Value>,
    pub height: Option<Value>,
}
merge_fields!(settings ImageSettings { class, src, alt, width, height });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageState {
    pub src: Option<String>,
    pub alt: Option<String>,
}
merge_fields!(ImageState { src, alt });

/// `<img>`; `state.src`/`state.alt` win over the settings of the same name.
pub fn image(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = ImageSettings {
        alt: Some(String::new()),
        ..ImageSettings::default()
    };
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(defaults, ImageState::default(), settings, state, context, result, "image")?;

    let node = VElement::new("img")
        .attr("id", id.as_str())
        .attr_opt("class", settings.class)
        .attr("src", state.src.or(settings.src).unwrap_or_default())
        .attr("alt", state.alt.or(settings.alt).unwrap_or_default())
        .attr_opt("width", settings.width.as_ref().map(crate::description::stringify))
        .attr_opt("height", settings.height.as_ref().map(crate::description::stringify));

    result.add_vtree(id, node.into());
    Ok(result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub language: Option<String>,
    pub src: Option<String>,
}
merge_fields!(settings ScriptSettings { language, src });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScriptState {
    pub code: Option<String>,
}
merge_fields!(ScriptState { code });

pub fn script(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = ScriptSettings {
        language: Some("javascript".to_string()),
        ..ScriptSettings::default()
    };
    let Normalized {
        id,
        settings,
        state,
        mut result,
        ..
    } = normalize(defaults, ScriptState::default(), settings, state, context, result, "script")?;

    let mime = script_mime(settings.language.as_deref().unwrap_or("javascript"));
    let mut node = VElement::new("script")
        .attr("id", id.as_str())
        .attr("type", mime)
        .attr_opt("src", settings.src);
    if let Some(code) = state.code {
        node = node.text(code);
    }

    result.add_vtree(id, VNode::from(node));
    Ok(result)
}

fn script_mime(language: &str) -> String {
    match language.to_ascii_lowercase().as_str() {
        "javascript" | "js" => "text/javascript".to_string(),
        "json" => "application/json".to_string(),
        "module" => "module".to_string(),
        other => format!("text/{other}"),
    }
}
