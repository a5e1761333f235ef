use serde::Deserialize;
use serde_json::Value;

use crate::context::RenderingContext;
use crate::description::Children;
use crate::error::RenderError;
use crate::normalize::{Normalized, merge_fields, normalize};
use crate::result::RenderingResult;
use crate::vnode::VElement;

use super::class_list;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TabsSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
}
merge_fields!(settings TabsSettings { class });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TabsState {
    pub titles: Option<Vec<Value>>,
    pub contents: Option<Vec<Value>>,
}
merge_fields!(TabsState { titles, contents });

/// Tab strip plus panels. Titles and contents are resolved independently, so
/// the two arrays need not have the same length.
pub fn tabs(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let normalized = normalize(
        TabsSettings::default(),
        TabsState::default(),
        settings,
        state,
        context,
        result,
        "tabs",
    )?;
    let local = normalized.local();
    let Normalized {
        id,
        settings,
        state,
        context,
        mut result,
    } = normalized;

    let mut titles = VElement::new("ul")
        .attr("class", "tabs")
        .attr("id", format!("{id}-titles"));
    for (index, title) in state.titles.unwrap_or_default().iter().enumerate() {
        let content = context.compose_content(title, &local, &mut result)?;
        let link = VElement::new("a")
            .attr("href", format!("#{}", panel_id(&id, index)))
            .child(content);
        titles = titles.child(
            VElement::new("li")
                .attr("class", active_class("tabs-title", index))
                .child(link),
        );
    }

    let mut panels = VElement::new("div").attr("class", "tabs-content");
    for (index, content) in state.contents.unwrap_or_default().iter().enumerate() {
        let content = context.compose_content(content, &local, &mut result)?;
        panels = panels.child(
            VElement::new("div")
                .attr("class", active_class("tabs-panel", index))
                .attr("id", panel_id(&id, index))
                .child(content),
        );
    }

    let node = VElement::new("div")
        .attr("id", id.as_str())
        .attr("class", class_list("tabs-wrapper", settings.class.as_deref()))
        .child(titles)
        .child(panels);

    result.add_vtree(id, node.into());
    Ok(result)
}

fn panel_id(id: &str, index: usize) -> String {
    format!("{id}-panel-{index}")
}

fn active_class(base: &str, index: usize) -> String {
    if index == 0 {
        format!("{base} is-active")
    } else {
        base.to_string()
    }
}
