use serde::Deserialize;
use serde_json::Value;

use crate::context::RenderingContext;
use crate::description::{Children, Item};
use crate::error::RenderError;
use crate::normalize::{Normalized, merge_fields, normalize};
use crate::result::{Asset, AssetSlot, DEFAULT_ROOT_ID, RenderingResult};
use crate::vnode::{Attributes, VElement, VNode};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub id: Option<String>,
    pub children: Option<Children>,
    pub title: Option<String>,
    pub lang: Option<String>,
    pub charset: Option<String>,
    pub viewport: Option<String>,
    pub description: Option<String>,
    pub robots: Option<String>,
    pub metas: Option<Vec<Attributes>>,
    pub head_scripts_urls: Option<Vec<Asset>>,
    pub head_scripts_tags: Option<Vec<Asset>>,
    pub head_styles_urls: Option<Vec<Asset>>,
    pub head_styles_tags: Option<Vec<Asset>>,
    pub body_scripts_urls: Option<Vec<Asset>>,
    pub body_scripts_tags: Option<Vec<Asset>>,
    pub body_styles_urls: Option<Vec<Asset>>,
    pub body_styles_tags: Option<Vec<Asset>>,
}
merge_fields!(settings PageSettings {
    title,
    lang,
    charset,
    viewport,
    description,
    robots,
    metas,
    head_scripts_urls,
    head_scripts_tags,
    head_styles_urls,
    head_styles_tags,
    body_scripts_urls,
    body_scripts_tags,
    body_styles_urls,
    body_styles_tags,
});

impl PageSettings {
    fn take_assets(&mut self, slot: AssetSlot) -> Vec<Asset> {
        let queue = match slot {
            AssetSlot::HeadScriptsUrls => &mut self.head_scripts_urls,
            AssetSlot::HeadScriptsTags => &mut self.head_scripts_tags,
            AssetSlot::HeadStylesUrls => &mut self.head_styles_urls,
            AssetSlot::HeadStylesTags => &mut self.head_styles_tags,
            AssetSlot::BodyScriptsUrls => &mut self.body_scripts_urls,
            AssetSlot::BodyScriptsTags => &mut self.body_scripts_tags,
            AssetSlot::BodyStylesUrls => &mut self.body_styles_urls,
            AssetSlot::BodyStylesTags => &mut self.body_styles_tags,
        };
        queue.take().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageState {
    pub body_headers: Option<Vec<Value>>,
    pub body_contents: Option<Vec<Value>>,
    pub body_footers: Option<Vec<Value>>,
}
merge_fields!(PageState { body_headers, body_contents, body_footers });

/// Full HTML document. Body sections are rendered first so that assets queued
/// by nested widgets precede the ones the caller passes in settings.
pub fn page(
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'_>,
    result: Option<RenderingResult>,
) -> Result<RenderingResult, RenderError> {
    let defaults = PageSettings {
        id: Some(DEFAULT_ROOT_ID.to_string()),
        charset: Some("utf-8".to_string()),
        viewport: Some("width=device-width, initial-scale=1".to_string()),
        ..PageSettings::default()
    };
    let normalized = normalize(defaults, PageState::default(), settings, state, context, result, "page")?;
    let local = normalized.local();
    let Normalized {
        id,
        mut settings,
        state,
        context,
        mut result,
    } = normalized;

    let header = VElement::new("header").children(body_section(
        &state.body_headers.unwrap_or_default(),
        &context,
        &local,
        &mut result,
    )?);
    let content = VElement::new("div").attr("id", "content").children(body_section(
        &state.body_contents.unwrap_or_default(),
        &context,
        &local,
        &mut result,
    )?);
    let footer = VElement::new("footer").children(body_section(
        &state.body_footers.unwrap_or_default(),
        &context,
        &local,
        &mut result,
    )?);

    for slot in AssetSlot::ALL {
        let caller = settings.take_assets(slot);
        result.extend_assets(slot, caller);
    }

    let mut head = VElement::new("head");
    if let Some(charset) = settings.charset {
        head = head.child(VElement::new("meta").attr("charset", charset));
    }
    head = head.child(VElement::new("title").text(settings.title.unwrap_or_default()));
    for (name, value) in [
        ("viewport", settings.viewport),
        ("description", settings.description),
        ("robots", settings.robots),
    ] {
        if let Some(value) = value {
            head = head.child(VElement::new("meta").attr("name", name).attr("content", value));
        }
    }
    for attrs in settings.metas.unwrap_or_default() {
        let mut meta = VElement::new("meta");
        meta.attrs = attrs;
        head = head.child(meta);
    }
    head = head.children(asset_nodes(&result, true));

    let body = VElement::new("body")
        .child(header)
        .child(content)
        .child(footer)
        .children(asset_nodes(&result, false));

    let node = VElement::new("html")
        .attr("id", id.as_str())
        .attr_opt("lang", settings.lang)
        .child(head)
        .child(body);

    result.add_vtree(id, node.into());
    Ok(result)
}

/// Strings name views and go through the factory; objects and other scalars
/// follow the cell content policy.
fn body_section(
    entries: &[Value],
    context: &RenderingContext<'_>,
    local: &Children,
    result: &mut RenderingResult,
) -> Result<Vec<VNode>, RenderError> {
    entries
        .iter()
        .map(|entry| match entry {
            Value::String(name) => context.compose(&Item::Name(name.clone()), local, result),
            other => context.compose_content(other, local, result),
        })
        .collect()
}

/// Style tags ahead of script tags, URL entries ahead of inline ones.
fn asset_nodes(result: &RenderingResult, head: bool) -> Vec<VNode> {
    AssetSlot::ALL
        .into_iter()
        .filter(|slot| slot.in_head() == head)
        .flat_map(|slot| result.assets(slot).iter().map(move |asset| slot.to_vnode(asset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::Description;
    use crate::factory;
    use crate::resolver::TopologyResolver;
    use serde_json::json;

    #[test]
    fn bare_page_has_the_default_head() {
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver).with_factory(factory::render);

        let result = page(&json!({"title": "Home", "lang": "en"}), &json!({}), &context, None)
            .expect("render");

        assert_eq!(
            result.get_final_html(None).as_deref(),
            Some(concat!(
                r#"<html id="page" lang="en"><head><meta charset="utf-8"><title>Home</title>"#,
                r#"<meta name="viewport" content="width=device-width, initial-scale=1"></head>"#,
                r#"<body><header></header><div id="content"></div><footer></footer></body></html>"#
            ))
        );
    }

    #[test]
    fn caller_assets_follow_accumulated_ones() {
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver).with_factory(factory::render);

        let mut accumulated = RenderingResult::new();
        accumulated.push_asset(AssetSlot::HeadScriptsUrls, Asset::script_url("a", "/a.js"));

        let result = page(
            &json!({"head_scripts_urls": [
                {"id": "b", "src": "/b.js"},
                {"id": "a", "src": "/a.js"}
            ]}),
            &json!({}),
            &context,
            Some(accumulated),
        )
        .expect("render");

        let ids: Vec<&str> = result.head_scripts_urls.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "a"]);

        let html = result.get_final_html(None).expect("html");
        assert!(
            html.contains(r#"<script id="a" src="/a.js"></script><script id="b" src="/b.js"></script>"#),
            "{html}"
        );
    }

    #[test]
    fn string_body_entries_name_registered_views() {
        let mut resolver = TopologyResolver::new();
        resolver.insert(
            "hdr",
            Description::new("label")
                .with_settings(json!({"id": "h"}))
                .with_state(json!({"text": "Header"})),
        );
        let context = RenderingContext::new(&resolver).with_factory(factory::render);

        let result = page(
            &json!({}),
            &json!({"body_headers": ["hdr"], "body_contents": ["plain", 7]}),
            &context,
            None,
        )
        .expect("render");

        let html = result.get_final_html(None).expect("html");
        assert!(
            html.contains(concat!(
                r#"<body><header><label id="h">Header</label></header>"#,
                r#"<div id="content">plain7</div>"#
            )),
            "{html}"
        );
    }

    #[test]
    fn body_sections_and_metas_are_rendered() {
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver).with_factory(factory::render);

        let result = page(
            &json!({
                "id": "doc",
                "robots": "noindex",
                "metas": [{"property": "og:title", "content": "Hi"}],
                "body_styles_tags": [{"id": "s", "content": "p{}"}]
            }),
            &json!({
                "body_headers": ["Top"],
                "body_contents": [{"type": "label", "settings": {"id": "l"}, "state": {"text": "Body"}}],
                "body_footers": [{"value": "Bottom"}]
            }),
            &context,
            None,
        )
        .expect("render");

        let html = result.get_html("doc").expect("html");
        assert!(html.contains(r#"<meta name="robots" content="noindex">"#), "{html}");
        assert!(html.contains(r#"<meta property="og:title" content="Hi">"#), "{html}");
        assert!(
            html.contains(concat!(
                r#"<body><header>Top</header><div id="content"><label id="l">Body</label></div>"#,
                r#"<footer>Bottom</footer><style id="s">p{}</style></body>"#
            )),
            "{html}"
        );
    }
}
