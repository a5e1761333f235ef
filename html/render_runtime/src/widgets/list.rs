use serde::Deserialize;
use serde_json::Value;

use crate::context::RenderingContext;
use crate::description::Children;
use crate::error::RenderError;
use crate::normalize::{Normalized, merge_fields, normalize};
use crate::result::RenderingResult;
use crate::vnode::VElement;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<Value>,
}
merge_fields!(settings ListSettings { class, kind, label });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListState {
    pub items: Option<Vec<Value>>,
}
merge_fields!(ListState { items });

pub fn list(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = ListSettings {
        kind: Some("ul".to_string()),
        ..ListSettings::default()
    };
    let normalized = normalize(defaults, ListState::default(), settings, state, context, result, "list")?;
    let local = normalized.local();
    let Normalized {
        id,
        settings,
        state,
        context,
        mut result,
    } = normalized;

    let tag = match settings.kind.as_deref() {
        Some(kind) if kind.eq_ignore_ascii_case("ol") => "ol",
        _ => "ul",
    };

    let mut node = VElement::new(tag)
        .attr("id", id.as_str())
        .attr_opt("class", settings.class);

    if let Some(label) = &settings.label {
        node = node.child(context.compose_content(label, &local, &mut result)?);
    }

    for item in state.items.unwrap_or_default() {
        let content = context.compose_content(&item, &local, &mut result)?;
        node = node.child(VElement::new("li").child(content));
    }

    result.add_vtree(id, node.into());
    Ok(result)
}
