use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::context::RenderingContext;
use crate::description::Children;
use crate::error::RenderError;
use crate::normalize::{Normalized, merge_fields, normalize};
use crate::result::RenderingResult;
use crate::vnode::{VElement, VNode};

use super::class_list;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
}
merge_fields!(settings ContainerSettings { class });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContainerState {
    pub items: Option<Vec<Value>>,
}
merge_fields!(ContainerState { items });

pub fn container(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let normalized = normalize(
        ContainerSettings::default(),
        ContainerState::default(),
        settings,
        state,
        context,
        result,
        "container",
    )?;
    let local = normalized.local();
    let Normalized {
        id,
        settings,
        state,
        context,
        mut result,
    } = normalized;

    let items = context.compose_all(&state.items.unwrap_or_default(), &local, &mut result)?;
    let node = VElement::new("div")
        .attr("id", id.as_str())
        .attr("class", class_list("container", settings.class.as_deref()))
        .children(items);

    result.add_vtree(id, node.into());
    Ok(result)
}

/// Widget type the dock lays its content out with unless told otherwise.
pub const DEFAULT_DOCK_CONTENT: &str = "blockgrid";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DockSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
}
merge_fields!(settings DockSettings { class, title, content_type });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DockState {
    pub headers: Option<Vec<Value>>,
    pub items: Option<Vec<Value>>,
}
merge_fields!(DockState { headers, items });

/// Header bar over a content area laid out by another widget.
///
/// The content widget is looked up through the resolver, falling back to
/// [`container`], and rendered on its own; only its root vnode and assets are
/// carried into the dock.
pub fn dock(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = DockSettings {
        content_type: Some(DEFAULT_DOCK_CONTENT.to_string()),
        ..DockSettings::default()
    };
    let normalized = normalize(defaults, DockState::default(), settings, state, context, result, "dock")?;
    let local = normalized.local();
    let Normalized {
        id,
        settings,
        state,
        context,
        mut result,
    } = normalized;

    let mut header = VElement::new("div").attr("class", "dock-header");
    if let Some(title) = settings.title {
        header = header.child(VElement::new("span").attr("class", "dock-title").text(title));
    }
    header = header.children(context.compose_all(
        &state.headers.unwrap_or_default(),
        &local,
        &mut result,
    )?);

    let content_id = format!("{id}-content");
    let content_type = settings
        .content_type
        .unwrap_or_else(|| DEFAULT_DOCK_CONTENT.to_string())
        .to_ascii_lowercase();
    let content_renderer = match context.resolver().find_rendering_function(&content_type) {
        Some(renderer) => renderer,
        None => {
            debug!(%content_type, "dock content renderer missing, using container");
            container
        }
    };

    let mut content_settings = Map::new();
    content_settings.insert("id".to_string(), Value::String(content_id.clone()));
    if !local.is_empty() {
        let children = local
            .iter()
            .map(|(name, child)| (name.clone(), child.to_value()))
            .collect();
        content_settings.insert("children".to_string(), Value::Object(children));
    }
    let content_state = json!({ "items": state.items.unwrap_or_default() });

    let mut rendered = content_renderer(
        &Value::Object(content_settings),
        &content_state,
        &context.nested(&content_type)?,
        None,
    )?;
    result.absorb_assets(&mut rendered);
    let content = rendered
        .into_final_vtree(Some(&content_id))
        .unwrap_or_else(|| VNode::text(""));

    let node = VElement::new("div")
        .attr("id", id.as_str())
        .attr("class", class_list("dock", settings.class.as_deref()))
        .child(header)
        .child(VElement::new("div").attr("class", "dock-content").child(content));

    result.add_vtree(id, node.into());
    Ok(result)
}
