//! Per-call rendering context handed to every renderer.

use std::fmt;

use serde_json::Value;
use tracing::trace;

use crate::description::{Children, Content, Item};
use crate::error::RenderError;
use crate::factory;
use crate::resolver::Resolver;
use crate::result::RenderingResult;
use crate::vnode::VNode;

/// Top-level dispatcher signature; renderers recurse through it.
pub type FactoryFn =
    fn(&Item, &RenderingContext<'_>, &Children) -> Result<RenderingResult, RenderError>;

pub const MAX_RENDER_DEPTH: usize = 64;

#[derive(Clone, Copy)]
pub struct RenderingContext<'a> {
    trace_fn: Option<&'a dyn Fn(&str)>,
    resolver: &'a dyn Resolver,
    credentials: Option<&'a Value>,
    rendering_factory: Option<FactoryFn>,
    depth: usize,
}

impl<'a> RenderingContext<'a> {
    pub fn new(resolver: &'a dyn Resolver) -> Self {
        Self {
            trace_fn: None,
            resolver,
            credentials: None,
            rendering_factory: None,
            depth: 0,
        }
    }

    pub fn with_trace(mut self, trace_fn: &'a dyn Fn(&str)) -> Self {
        self.trace_fn = Some(trace_fn);
        self
    }

    pub fn with_credentials(mut self, credentials: Option<&'a Value>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_factory(mut self, factory: FactoryFn) -> Self {
        self.rendering_factory = Some(factory);
        self
    }

    pub fn or_factory(self, factory: FactoryFn) -> Self {
        match self.rendering_factory {
            Some(_) => self,
            None => self.with_factory(factory),
        }
    }

    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }

    pub fn credentials(&self) -> Option<&'a Value> {
        self.credentials
    }

    pub fn rendering_factory(&self) -> Option<FactoryFn> {
        self.rendering_factory
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn trace(&self, message: &str) {
        trace!(depth = self.depth, "{message}");
        if let Some(trace_fn) = self.trace_fn {
            trace_fn(message);
        }
    }

    pub fn nested(&self, item: &dyn fmt::Display) -> Result<Self, RenderError> {
        if self.depth >= MAX_RENDER_DEPTH {
            return Err(RenderError::TooDeep {
                limit: MAX_RENDER_DEPTH,
                item: item.to_string(),
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Renders `item` through the installed factory. Without one, the item
    /// passes through unchanged as a text leaf.
    pub fn render(&self, item: &Item, local: &Children) -> Result<RenderingResult, RenderError> {
        match self.rendering_factory {
            Some(render) => render(item, &self.nested(item)?, local),
            None => Ok(factory::text_leaf(item.to_string())),
        }
    }

    /// Renders `item` into a standalone subtree: its assets are queued on
    /// `into` and the root vnode is returned by value.
    pub fn compose(
        &self,
        item: &Item,
        local: &Children,
        into: &mut RenderingResult,
    ) -> Result<VNode, RenderError> {
        let mut rendered = self.render(item, local)?;
        into.absorb_assets(&mut rendered);
        Ok(rendered
            .into_final_vtree(None)
            .unwrap_or_else(|| VNode::text("")))
    }

    /// Resolves one cell or child entry per the shared content policy.
    pub fn compose_content(
        &self,
        content: &Value,
        local: &Children,
        into: &mut RenderingResult,
    ) -> Result<VNode, RenderError> {
        match Content::from_value(content) {
            Content::Literal(text) => Ok(VNode::Text(text)),
            Content::View(name) => self.compose(&Item::Name(name), local, into),
            Content::Inline(description) => self.compose(&Item::Inline(description), local, into),
        }
    }

    pub fn compose_all(
        &self,
        contents: &[Value],
        local: &Children,
        into: &mut RenderingResult,
    ) -> Result<Vec<VNode>, RenderError> {
        contents
            .iter()
            .map(|content| self.compose_content(content, local, into))
            .collect()
    }
}

impl fmt::Debug for RenderingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingContext")
            .field("traced", &self.trace_fn.is_some())
            .field("credentials", &self.credentials.map(|_| "<opaque>"))
            .field("has_factory", &self.rendering_factory.is_some())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TopologyResolver;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn without_factory_items_pass_through_as_text() {
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver);
        let mut result = RenderingResult::new();

        let node = context
            .compose_content(&json!({"view": "sidebar"}), &Children::new(), &mut result)
            .expect("compose");
        assert_eq!(node, VNode::text("sidebar"));
    }

    #[test]
    fn literal_values_never_recurse() {
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver).with_factory(factory::render);
        let mut result = RenderingResult::new();

        let node = context
            .compose_content(&json!({"value": "<b>"}), &Children::new(), &mut result)
            .expect("compose");
        assert_eq!(node, VNode::text("<b>"));
    }

    #[test]
    fn trace_hook_receives_messages() {
        let seen = RefCell::new(Vec::new());
        let hook = |message: &str| seen.borrow_mut().push(message.to_string());
        let resolver = TopologyResolver::new();
        let context = RenderingContext::new(&resolver).with_trace(&hook);

        context.trace("hello");
        assert_eq!(seen.borrow().as_slice(), ["hello"]);
    }

    #[test]
    fn nesting_is_bounded() {
        let resolver = TopologyResolver::new();
        let mut context = RenderingContext::new(&resolver);
        for _ in 0..MAX_RENDER_DEPTH {
            context = context.nested(&"x").expect("within limit");
        }
        assert!(matches!(
            context.nested(&"x"),
            Err(RenderError::TooDeep { .. })
        ));
    }
}
