//! Recursive dispatch from an item to the renderer of its widget type.

use serde_json::Value;
use tracing::debug;

use crate::context::RenderingContext;
use crate::description::{Children, Description, Item};
use crate::error::RenderError;
use crate::normalize::generate_id;
use crate::result::RenderingResult;
use crate::vnode::VNode;

/// Renders `item`, resolving names through `local_children` first and the
/// context's resolver second. Unresolvable input degrades to a text leaf.
pub fn render(
    item: &Item,
    context: &RenderingContext<'_>,
    local_children: &Children,
) -> Result<RenderingResult, RenderError> {
    let context = context.or_factory(render);

    match item {
        Item::Name(name) => render_name(name, &context, local_children),
        Item::Inline(description) => render_description(description, &context),
        Item::Other(value) => {
            debug!(%value, "item is neither a name nor a description");
            Ok(text_leaf(format!("unrenderable item: {value}")))
        }
    }
}

fn render_name(
    name: &str,
    context: &RenderingContext<'_>,
    local_children: &Children,
) -> Result<RenderingResult, RenderError> {
    if let Some(description) = local_children.get(name) {
        context.trace(&format!("`{name}` resolved from local children"));
        return render_description(description, context);
    }

    if let Some(mut description) = context.resolver().find_resource_description(name) {
        let id = description.setting_str("id").unwrap_or(name).to_string();
        description.set_setting("id", Value::String(id));
        context.trace(&format!("`{name}` resolved through resolver"));
        return render_description(&description, context);
    }

    debug!(name, "unresolved reference rendered as plain text");
    Ok(text_leaf(name))
}

fn render_description(
    description: &Description,
    context: &RenderingContext<'_>,
) -> Result<RenderingResult, RenderError> {
    let widget_type = description.widget_type();

    match context.resolver().find_rendering_function(&widget_type) {
        Some(renderer) => renderer(
            &description.settings_with_children(),
            &description.state,
            context,
            None,
        ),
        None => {
            debug!(%widget_type, "no renderer for widget type");
            Ok(text_leaf(description.to_string()))
        }
    }
}

pub fn text_leaf(text: impl Into<String>) -> RenderingResult {
    let mut result = RenderingResult::new();
    result.add_vtree(generate_id(), VNode::text(text));
    result
}
