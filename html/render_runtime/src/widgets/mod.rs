//! Built-in widget renderers and the closed type-name dispatch table.

mod container;
mod leaf;
mod list;
mod page;
mod table;
mod tabs;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{RenderError, json_kind};
use crate::resolver::RenderFn;

pub use container::{container, dock};
pub use leaf::{anchor, button, image, input, label, script};
pub use list::list;
pub use page::page;
pub use table::{hbox, menubar, table, vbox};
pub use tabs::tabs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Anchor,
    Button,
    Container,
    Dock,
    Hbox,
    Image,
    Input,
    Label,
    List,
    Menubar,
    Page,
    Script,
    Table,
    Tabs,
    Vbox,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 15] = [
        Self::Anchor,
        Self::Button,
        Self::Container,
        Self::Dock,
        Self::Hbox,
        Self::Image,
        Self::Input,
        Self::Label,
        Self::List,
        Self::Menubar,
        Self::Page,
        Self::Script,
        Self::Table,
        Self::Tabs,
        Self::Vbox,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Button => "button",
            Self::Container => "container",
            Self::Dock => "dock",
            Self::Hbox => "hbox",
            Self::Image => "image",
            Self::Input => "input",
            Self::Label => "label",
            Self::List => "list",
            Self::Menubar => "menubar",
            Self::Page => "page",
            Self::Script => "script",
            Self::Table => "table",
            Self::Tabs => "tabs",
            Self::Vbox => "vbox",
        }
    }

    pub fn renderer(self) -> RenderFn {
        match self {
            Self::Anchor => anchor,
            Self::Button => button,
            Self::Container => container,
            Self::Dock => dock,
            Self::Hbox => hbox,
            Self::Image => image,
            Self::Input => input,
            Self::Label => label,
            Self::List => list,
            Self::Menubar => menubar,
            Self::Page => page,
            Self::Script => script,
            Self::Table => table,
            Self::Tabs => tabs,
            Self::Vbox => vbox,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWidget(pub String);

impl fmt::Display for UnknownWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown widget type `{}`", self.0)
    }
}

impl std::error::Error for UnknownWidget {}

impl FromStr for WidgetKind {
    type Err = UnknownWidget;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownWidget(raw.to_string()))
    }
}

/// Renderer for a built-in widget type, matched case-insensitively.
pub fn lookup(widget_type: &str) -> Option<RenderFn> {
    widget_type.parse::<WidgetKind>().ok().map(WidgetKind::renderer)
}

fn class_list(base: &str, extra: Option<&str>) -> String {
    match extra.map(str::trim) {
        Some(extra) if !extra.is_empty() => format!("{base} {extra}"),
        _ => base.to_string(),
    }
}

/// Copy of `settings` with `key` overridden, for adapters that delegate to
/// another renderer.
fn override_setting(
    settings: &Value,
    widget: &'static str,
    key: &str,
    value: Value,
) -> Result<Value, RenderError> {
    let mut map = match settings {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        other => {
            return Err(RenderError::NotAnObject {
                widget,
                field: "settings",
                found: json_kind(other),
            });
        }
    };
    map.insert(key.to_string(), value);
    Ok(Value::Object(map))
}

/// Row of cells: arrays are taken as-is, anything else is a one-cell row.
fn row_cells(row: &Value) -> &[Value] {
    match row {
        Value::Array(cells) => cells,
        single => std::slice::from_ref(single),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in WidgetKind::ALL {
            assert_eq!(kind.name().parse::<WidgetKind>(), Ok(kind));
            assert_eq!(kind.name().to_uppercase().parse::<WidgetKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_types_have_no_renderer() {
        assert!(lookup("carousel").is_none());
        assert_eq!(
            "carousel".parse::<WidgetKind>(),
            Err(UnknownWidget("carousel".to_string()))
        );
    }

    #[test]
    fn class_list_skips_blank_extras() {
        assert_eq!(class_list("menubar", None), "menubar");
        assert_eq!(class_list("menubar", Some("  ")), "menubar");
        assert_eq!(class_list("menubar", Some("dark")), "menubar dark");
    }
}
