//! Name and widget-type lookup consumed by the factory.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::RenderingContext;
use crate::description::Description;
use crate::error::RenderError;
use crate::result::RenderingResult;
use crate::widgets;

pub type RenderFn = fn(
    &Value,
    &Value,
    &RenderingContext<'_>,
    Option<RenderingResult>,
) -> Result<RenderingResult, RenderError>;

pub trait Resolver {
    fn find_resource_description(&self, name: &str) -> Option<Description>;

    /// Built-in widgets unless overridden.
    fn find_rendering_function(&self, widget_type: &str) -> Option<RenderFn> {
        widgets::lookup(widget_type)
    }
}

#[derive(Default, Clone)]
pub struct TopologyResolver {
    descriptions: IndexMap<String, Description>,
    renderers: HashMap<String, RenderFn>,
}

impl TopologyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(descriptions: IndexMap<String, Description>) -> Self {
        Self {
            descriptions,
            renderers: HashMap::new(),
        }
    }

    /// Builds the registry from a JSON object of `name -> description`.
    pub fn from_value(registry: &Value) -> Self {
        let descriptions = registry
            .as_object()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, description)| (name.clone(), Description::from(description.clone())))
                    .collect()
            })
            .unwrap_or_default();
        Self::from_registry(descriptions)
    }

    pub fn insert(&mut self, name: impl Into<String>, description: Description) -> &mut Self {
        self.descriptions.insert(name.into(), description);
        self
    }

    pub fn register_renderer(&mut self, widget_type: &str, renderer: RenderFn) -> &mut Self {
        self.renderers
            .insert(widget_type.to_ascii_lowercase(), renderer);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

impl Resolver for TopologyResolver {
    fn find_resource_description(&self, name: &str) -> Option<Description> {
        self.descriptions.get(name).cloned()
    }

    fn find_rendering_function(&self, widget_type: &str) -> Option<RenderFn> {
        let widget_type = widget_type.to_ascii_lowercase();
        self.renderers
            .get(&widget_type)
            .copied()
            .or_else(|| widgets::lookup(&widget_type))
    }
}

impl fmt::Debug for TopologyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyResolver")
            .field("descriptions", &self.descriptions.keys().collect::<Vec<_>>())
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct FnResolver<D, R> {
    find_description: D,
    find_renderer: R,
}

impl<D, R> FnResolver<D, R>
where
    D: Fn(&str) -> Option<Description>,
    R: Fn(&str) -> Option<RenderFn>,
{
    pub fn new(find_description: D, find_renderer: R) -> Self {
        Self {
            find_description,
            find_renderer,
        }
    }
}

impl<D> FnResolver<D, fn(&str) -> Option<RenderFn>>
where
    D: Fn(&str) -> Option<Description>,
{
    pub fn with_builtin_widgets(find_description: D) -> Self {
        Self {
            find_description,
            find_renderer: widgets::lookup,
        }
    }
}

impl<D, R> Resolver for FnResolver<D, R>
where
    D: Fn(&str) -> Option<Description>,
    R: Fn(&str) -> Option<RenderFn>,
{
    fn find_resource_description(&self, name: &str) -> Option<Description> {
        (self.find_description)(name)
    }

    fn find_rendering_function(&self, widget_type: &str) -> Option<RenderFn> {
        (self.find_renderer)(widget_type)
    }
}

impl<D, R> fmt::Debug for FnResolver<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}
