//! Accumulator of named virtual subtrees and asset-injection queues.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vnode::{VElement, VNode};

pub const DEFAULT_ROOT_ID: &str = "page";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub absolute: bool,
}

impl Asset {
    pub fn script_url(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn script_inline(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn style_url(id: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: Some(href.into()),
            ..Self::default()
        }
    }

    pub fn style_inline(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::script_inline(id, content)
    }

    fn id_attr(&self) -> Option<&str> {
        (!self.id.is_empty()).then_some(self.id.as_str())
    }

    pub fn script_vnode(&self) -> VNode {
        let mut script = VElement::new("script")
            .attr_opt("id", self.id_attr())
            .attr_opt("type", self.kind.as_deref())
            .attr_opt("src", self.src.as_deref());
        if let Some(content) = &self.content {
            script = script.text(content.as_str());
        }
        script.into()
    }

    /// `<link rel="stylesheet">` for URL entries, `<style>` for inline ones.
    pub fn style_vnode(&self) -> VNode {
        match (&self.href, &self.content) {
            (Some(href), _) => VElement::new("link")
                .attr_opt("id", self.id_attr())
                .attr("rel", self.rel.as_deref().unwrap_or("stylesheet"))
                .attr_opt("type", self.kind.as_deref())
                .attr("href", href.as_str())
                .attr_opt("media", self.media.as_deref())
                .attr_opt("title", self.title.as_deref())
                .into(),
            (None, content) => {
                let mut style = VElement::new("style")
                    .attr_opt("id", self.id_attr())
                    .attr_opt("type", self.kind.as_deref())
                    .attr_opt("media", self.media.as_deref());
                if let Some(content) = content {
                    style = style.text(content.as_str());
                }
                style.into()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    HeadScriptsUrls,
    HeadScriptsTags,
    HeadStylesUrls,
    HeadStylesTags,
    BodyScriptsUrls,
    BodyScriptsTags,
    BodyStylesUrls,
    BodyStylesTags,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 8] = [
        Self::HeadStylesUrls,
        Self::HeadStylesTags,
        Self::HeadScriptsUrls,
        Self::HeadScriptsTags,
        Self::BodyStylesUrls,
        Self::BodyStylesTags,
        Self::BodyScriptsUrls,
        Self::BodyScriptsTags,
    ];

    pub fn in_head(self) -> bool {
        matches!(
            self,
            Self::HeadScriptsUrls | Self::HeadScriptsTags | Self::HeadStylesUrls | Self::HeadStylesTags
        )
    }

    pub fn is_script(self) -> bool {
        matches!(
            self,
            Self::HeadScriptsUrls | Self::HeadScriptsTags | Self::BodyScriptsUrls | Self::BodyScriptsTags
        )
    }

    pub fn to_vnode(self, asset: &Asset) -> VNode {
        if self.is_script() {
            asset.script_vnode()
        } else {
            asset.style_vnode()
        }
    }
}

/// Output of one render pass: vtrees registered by id plus the asset queues.
///
/// Re-registering an id overwrites the previous tree. Asset queues are
/// append-only and keep duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderingResult {
    vtrees: IndexMap<String, VNode>,
    pub head_scripts_urls: Vec<Asset>,
    pub head_scripts_tags: Vec<Asset>,
    pub head_styles_urls: Vec<Asset>,
    pub head_styles_tags: Vec<Asset>,
    pub body_scripts_urls: Vec<Asset>,
    pub body_scripts_tags: Vec<Asset>,
    pub body_styles_urls: Vec<Asset>,
    pub body_styles_tags: Vec<Asset>,
}

impl RenderingResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vtree(&mut self, id: impl Into<String>, vnode: VNode) {
        self.vtrees.insert(id.into(), vnode);
    }

    pub fn get_vtree(&self, id: &str) -> Option<&VNode> {
        self.vtrees.get(id)
    }

    pub fn remove_vtree(&mut self, id: &str) -> Option<VNode> {
        self.vtrees.shift_remove(id)
    }

    pub fn vtree_ids(&self) -> impl Iterator<Item = &str> {
        self.vtrees.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vtrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vtrees.is_empty()
    }

    pub fn get_html(&self, id: &str) -> Option<String> {
        self.get_vtree(id).map(VNode::to_html)
    }

    /// Id of the designated root: the requested id, else `page`, else the
    /// first registered tree.
    pub fn final_id<'a>(&'a self, id: Option<&'a str>) -> Option<&'a str> {
        match id {
            Some(id) => Some(id),
            None if self.vtrees.contains_key(DEFAULT_ROOT_ID) => Some(DEFAULT_ROOT_ID),
            None => self.vtrees.keys().next().map(String::as_str),
        }
    }

    pub fn get_final_vtree(&self, id: Option<&str>) -> Option<&VNode> {
        self.final_id(id).and_then(|id| self.vtrees.get(id))
    }

    pub fn get_final_html(&self, id: Option<&str>) -> Option<String> {
        self.get_final_vtree(id).map(VNode::to_html)
    }

    pub fn into_final_vtree(mut self, id: Option<&str>) -> Option<VNode> {
        let id = self.final_id(id)?.to_string();
        self.vtrees.shift_remove(&id)
    }

    pub fn assets(&self, slot: AssetSlot) -> &[Asset] {
        match slot {
            AssetSlot::HeadScriptsUrls => &self.head_scripts_urls,
            AssetSlot::HeadScriptsTags => &self.head_scripts_tags,
            AssetSlot::HeadStylesUrls => &self.head_styles_urls,
            AssetSlot::HeadStylesTags => &self.head_styles_tags,
            AssetSlot::BodyScriptsUrls => &self.body_scripts_urls,
            AssetSlot::BodyScriptsTags => &self.body_scripts_tags,
            AssetSlot::BodyStylesUrls => &self.body_styles_urls,
            AssetSlot::BodyStylesTags => &self.body_styles_tags,
        }
    }

    fn assets_mut(&mut self, slot: AssetSlot) -> &mut Vec<Asset> {
        match slot {
            AssetSlot::HeadScriptsUrls => &mut self.head_scripts_urls,
            AssetSlot::HeadScriptsTags => &mut self.head_scripts_tags,
            AssetSlot::HeadStylesUrls => &mut self.head_styles_urls,
            AssetSlot::HeadStylesTags => &mut self.head_styles_tags,
            AssetSlot::BodyScriptsUrls => &mut self.body_scripts_urls,
            AssetSlot::BodyScriptsTags => &mut self.body_scripts_tags,
            AssetSlot::BodyStylesUrls => &mut self.body_styles_urls,
            AssetSlot::BodyStylesTags => &mut self.body_styles_tags,
        }
    }

    pub fn push_asset(&mut self, slot: AssetSlot, asset: Asset) {
        self.assets_mut(slot).push(asset);
    }

    pub fn extend_assets(&mut self, slot: AssetSlot, assets: impl IntoIterator<Item = Asset>) {
        self.assets_mut(slot).extend(assets);
    }

    /// Moves every queued asset of `other` behind the ones already queued here.
    pub fn absorb_assets(&mut self, other: &mut RenderingResult) {
        for slot in AssetSlot::ALL {
            let moved = std::mem::take(other.assets_mut(slot));
            self.assets_mut(slot).extend(moved);
        }
    }

    pub fn asset_count(&self) -> usize {
        AssetSlot::ALL.iter().map(|slot| self.assets(*slot).len()).sum()
    }
}
