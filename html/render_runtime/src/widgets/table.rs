use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::context::RenderingContext;
use crate::description::{Children, stringify};
use crate::error::RenderError;
use crate::normalize::{Normalized, decode, merge_fields, normalize};
use crate::result::RenderingResult;
use crate::vnode::VElement;

use super::{class_list, override_setting, row_cells};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub class: Option<String>,
    pub label: Option<String>,
}
merge_fields!(settings TableSettings { class, label });

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableState {
    pub headers: Option<Vec<Value>>,
    pub items: Option<Vec<Value>>,
    pub footers: Option<Vec<Value>>,
}
merge_fields!(TableState { headers, items, footers });

/// `<table>` with `<thead>`, `<tbody>` and `<tfoot>`, one `<tr>` per row.
pub fn table(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let normalized = normalize(
        TableSettings::default(),
        TableState::default(),
        settings,
        state,
        context,
        result,
        "table",
    )?;
    let local = normalized.local();
    let Normalized {
        id,
        settings,
        state,
        context,
        mut result,
    } = normalized;

    let mut head = VElement::new("thead");
    if let Some(label) = settings.label {
        head = head.child(VElement::new("tr").child(VElement::new("th").text(label)));
    }
    for row in state.headers.unwrap_or_default() {
        head = head.child(table_row(&row, "th", &context, &local, &mut result)?);
    }

    let mut body = VElement::new("tbody");
    for row in state.items.unwrap_or_default() {
        body = body.child(table_row(&row, "td", &context, &local, &mut result)?);
    }

    let mut foot = VElement::new("tfoot");
    for row in state.footers.unwrap_or_default() {
        foot = foot.child(table_row(&row, "td", &context, &local, &mut result)?);
    }

    let node = VElement::new("table")
        .attr("id", id.as_str())
        .attr_opt("class", settings.class)
        .child(head)
        .child(body)
        .child(foot);

    result.add_vtree(id, node.into());
    Ok(result)
}

fn table_row(
    row: &Value,
    cell_tag: &str,
    context: &RenderingContext<'_>,
    local: &Children,
    result: &mut RenderingResult,
) -> Result<VElement, RenderError> {
    let mut tr = VElement::new("tr");
    for cell in row_cells(row) {
        let content = context.compose_content(cell, local, result)?;
        tr = tr.child(VElement::new(cell_tag).child(content));
    }
    Ok(tr)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemsState {
    items: Option<Vec<Value>>,
}

fn items_of(state: &Value, widget: &'static str) -> Result<Vec<Value>, RenderError> {
    let state: ItemsState = decode(state, widget, "state")?;
    Ok(state.items.unwrap_or_default())
}

fn with_class(settings: &Value, widget: &'static str, base: &str) -> Result<Value, RenderError> {
    let extra = settings.get("class").and_then(Value::as_str);
    override_setting(settings, widget, "class", Value::String(class_list(base, extra)))
}

/// Menu items become anchor descriptions laid out as a single table row.
///
/// An item may be a string (label, `href="#"`), an array
/// `[label, href, command?]`, or an object with `label`, `href`, `command`,
/// `id`, `class` and `blank`.
pub fn menubar(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let anchors: Vec<Value> = items_of(state, "menubar")?
        .iter()
        .map(menu_anchor)
        .collect();
    let settings = with_class(settings, "menubar", "menubar")?;
    table(&settings, &json!({ "items": [anchors] }), context, result)
}

fn menu_anchor(item: &Value) -> Value {
    let mut anchor_settings = Map::new();
    let mut label = None;

    match item {
        Value::Array(parts) => {
            label = parts.first().map(stringify);
            if let Some(href) = parts.get(1) {
                anchor_settings.insert("href".to_string(), Value::String(stringify(href)));
            }
            if let Some(command) = parts.get(2) {
                anchor_settings.insert("command".to_string(), Value::String(stringify(command)));
            }
        }
        Value::Object(fields) => {
            label = fields.get("label").map(stringify);
            for key in ["id", "href", "command", "class"] {
                if let Some(value) = fields.get(key) {
                    anchor_settings.insert(key.to_string(), Value::String(stringify(value)));
                }
            }
            if let Some(Value::Bool(blank)) = fields.get("blank") {
                anchor_settings.insert("blank".to_string(), Value::Bool(*blank));
            }
        }
        other => label = Some(stringify(other)),
    }

    json!({
        "type": "anchor",
        "settings": anchor_settings,
        "state": { "label": label },
    })
}

pub fn hbox(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let items = items_of(state, "hbox")?;
    let settings = with_class(settings, "hbox", "hbox")?;
    table(&settings, &json!({ "items": [items] }), context, result)
}

pub fn vbox(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let rows: Vec<Value> = items_of(state, "vbox")?
        .into_iter()
        .map(|item| Value::Array(vec![item]))
        .collect();
    let settings = with_class(settings, "vbox", "vbox")?;
    table(&settings, &json!({ "items": rows }), context, result)
}
