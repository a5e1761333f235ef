//! Declarative widget rendering: resource descriptions are resolved into
//! virtual node trees by per-widget renderers, and a reconciliation engine
//! keeps mounted DOM subtrees in step with them.

pub mod context;
pub mod description;
pub mod dom;
pub mod error;
pub mod factory;
pub mod normalize;
pub mod reconcile;
pub mod resolver;
pub mod result;
pub mod vnode;
pub mod widgets;

pub use crate::context::{FactoryFn, MAX_RENDER_DEPTH, RenderingContext};
pub use crate::description::{Children, Content, Description, Item};
pub use crate::dom::{Dom, MemoryDom, NodeId};
pub use crate::error::{DomError, ReconcileError, RenderError};
pub use crate::reconcile::{
    ComponentHandle, DelegatedCommand, DomEvent, MountState, MountedComponent, Mounts, Patch,
    PatchSet, RenderOutcome, render,
};
pub use crate::resolver::{FnResolver, RenderFn, Resolver, TopologyResolver};
pub use crate::result::{Asset, AssetSlot, DEFAULT_ROOT_ID, RenderingResult};
pub use crate::vnode::{Attributes, VElement, VNode};
pub use crate::widgets::WidgetKind;
pub use serde_json;
