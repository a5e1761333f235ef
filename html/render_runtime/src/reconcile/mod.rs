//! Client-side reconciliation: keeps one DOM subtree per mount target in
//! step with the vnode produced by each render pass.

mod assets;
mod delegator;
mod diff;
mod patch;
mod virtualize;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use serde_json::Value;
use tracing::debug;

use crate::context::RenderingContext;
use crate::description::{Children, Item};
use crate::dom::Dom;
use crate::error::ReconcileError;
use crate::factory;
use crate::resolver::Resolver;
use crate::vnode::VNode;

pub use assets::inject;
pub use delegator::{COMMAND_ATTRIBUTE, DEFAULT_EVENTS, DelegatedCommand, DomEvent, EventDelegator};
pub use diff::{Patch, PatchSet, diff};
pub use patch::{apply, create_node, node_at};
pub use virtualize::virtualize;

pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    #[default]
    Unmounted,
    Mounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatorChange {
    Created,
    Rebound,
}

#[derive(Debug)]
pub struct ReconcileOutcome<N> {
    pub element: N,
    pub patches: PatchSet,
    /// The root element was synthesized by this pass rather than found.
    pub created: bool,
    pub root_replaced: bool,
    pub delegator: DelegatorChange,
}

/// The `(dom_element, dom_vnode, event_delegator)` triple of one target.
#[derive(Debug)]
pub struct MountedComponent<N> {
    dom_element: Option<N>,
    dom_vnode: Option<VNode>,
    event_delegator: Option<EventDelegator<N>>,
}

impl<N> Default for MountedComponent<N> {
    fn default() -> Self {
        Self {
            dom_element: None,
            dom_vnode: None,
            event_delegator: None,
        }
    }
}

impl<N: Copy + Eq + Hash + fmt::Debug> MountedComponent<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MountState {
        match (self.dom_element, &self.dom_vnode) {
            (Some(_), Some(_)) => MountState::Mounted,
            _ => MountState::Unmounted,
        }
    }

    pub fn element(&self) -> Option<N> {
        self.dom_element
    }

    pub fn vnode(&self) -> Option<&VNode> {
        self.dom_vnode.as_ref()
    }

    pub fn delegator(&self) -> Option<&EventDelegator<N>> {
        self.event_delegator.as_ref()
    }

    /// Runs one pass for `dom_id`: create, adopt or diff-and-patch the root,
    /// then re-root or recreate the event delegator.
    pub fn reconcile<D>(
        &mut self,
        dom: &mut D,
        dom_id: &str,
        vnode: Option<VNode>,
    ) -> Result<ReconcileOutcome<N>, ReconcileError>
    where
        D: Dom<Node = N> + ?Sized,
    {
        let vnode = vnode.ok_or_else(|| ReconcileError::NoVNode(dom_id.to_string()))?;

        let baseline = match (self.dom_element, self.dom_vnode.as_ref()) {
            (Some(element), Some(previous)) => Some((element, previous.clone())),
            _ => match dom.get_element_by_id(dom_id) {
                Some(existing) => {
                    debug!(dom_id, "adopting existing element");
                    Some((existing, virtualize(dom, existing)?))
                }
                None => None,
            },
        };

        let (element, patches, created) = match baseline {
            Some((previous_element, previous_vnode)) => {
                let patches = diff(&previous_vnode, &vnode);
                let element = apply(dom, previous_element, &patches)?;
                (element, patches, false)
            }
            None => {
                let element = create_node(dom, &vnode)?;
                let body = dom.body();
                dom.append_child(body, element)?;
                (element, PatchSet::new(), true)
            }
        };

        let root_replaced = !created && self.dom_element.is_some_and(|previous| previous != element);
        if root_replaced {
            debug!(dom_id, "root element replaced");
        }

        let delegator = self.bind_delegator(element);
        self.dom_element = Some(element);
        self.dom_vnode = Some(vnode);

        Ok(ReconcileOutcome {
            element,
            patches,
            created,
            root_replaced,
            delegator,
        })
    }

    fn bind_delegator(&mut self, element: N) -> DelegatorChange {
        let same_root = self
            .event_delegator
            .as_ref()
            .is_some_and(|delegator| delegator.root() == Some(element));

        match &mut self.event_delegator {
            Some(delegator) if same_root => {
                delegator.rebind(element);
                DelegatorChange::Rebound
            }
            slot => {
                if let Some(mut previous) = slot.take() {
                    previous.destroy();
                }
                *slot = Some(EventDelegator::create(element));
                DelegatorChange::Created
            }
        }
    }

    pub fn dispatch<D>(&self, dom: &D, event: &DomEvent<N>) -> Option<DelegatedCommand>
    where
        D: Dom<Node = N> + ?Sized,
    {
        self.event_delegator.as_ref()?.dispatch(dom, event)
    }

    pub fn node_at<D>(&self, dom: &D, path: &[usize]) -> Result<N, ReconcileError>
    where
        D: Dom<Node = N> + ?Sized,
    {
        let root = self.dom_element.ok_or_else(|| ReconcileError::BadPath {
            path: path.to_vec(),
        })?;
        node_at(dom, root, path)
    }

    /// Releases the delegator and forgets the mounted element. The element
    /// itself stays in the document.
    pub fn dispose(&mut self) {
        if let Some(mut delegator) = self.event_delegator.take() {
            delegator.destroy();
        }
        self.dom_element = None;
        self.dom_vnode = None;
    }
}

/// Mounted components keyed by DOM id.
///
/// A pass holds its component's lock for its whole duration; a second pass
/// on the same id fails with [`ReconcileError::PassInFlight`] instead of
/// waiting.
#[derive(Debug)]
pub struct Mounts<N> {
    components: Mutex<HashMap<String, Arc<Mutex<MountedComponent<N>>>>>,
}

impl<N> Default for Mounts<N> {
    fn default() -> Self {
        Self {
            components: Mutex::new(HashMap::new()),
        }
    }
}

impl<N: Copy + Eq + Hash + fmt::Debug> Mounts<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(&self, dom_id: &str) -> Arc<Mutex<MountedComponent<N>>> {
        let mut components = self.components.lock().unwrap_or_else(PoisonError::into_inner);
        components.entry(dom_id.to_string()).or_default().clone()
    }

    pub fn get(&self, dom_id: &str) -> Option<Arc<Mutex<MountedComponent<N>>>> {
        let components = self.components.lock().unwrap_or_else(PoisonError::into_inner);
        components.get(dom_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.components.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `pass` with exclusive access to the component for `dom_id`.
    pub fn with_pass<R>(
        &self,
        dom_id: &str,
        pass: impl FnOnce(&mut MountedComponent<N>) -> Result<R, ReconcileError>,
    ) -> Result<R, ReconcileError> {
        let component = self.component(dom_id);
        let mut guard = match component.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(ReconcileError::PassInFlight(dom_id.to_string()));
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        pass(&mut guard)
    }

    pub fn dispose(&self, dom_id: &str) -> Result<bool, ReconcileError> {
        let removed = {
            let mut components = self.components.lock().unwrap_or_else(PoisonError::into_inner);
            components.remove(dom_id)
        };
        let Some(component) = removed else {
            return Ok(false);
        };
        let mut guard = match component.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                self.components
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(dom_id.to_string(), component.clone());
                return Err(ReconcileError::PassInFlight(dom_id.to_string()));
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        guard.dispose();
        Ok(true)
    }
}

/// What a component exposes to the render entry point.
pub trait ComponentHandle {
    fn dom_id(&self) -> &str;
    fn resolver(&self) -> &dyn Resolver;
    /// Item rendered for this component, usually a view name.
    fn view(&self) -> Item;

    fn credentials(&self) -> Option<&Value> {
        None
    }

    /// Root vtree id to mount; defaults to `page` or the first registered.
    fn root_id(&self) -> Option<&str> {
        None
    }

    fn trace(&self, _message: &str) {}
}

#[derive(Debug)]
pub struct RenderOutcome<N> {
    pub reconciled: ReconcileOutcome<N>,
    pub html: String,
    pub injected_assets: usize,
}

/// Renders the component's view, reconciles the result into its mount
/// target and injects the queued assets.
///
/// Fails with [`ReconcileError::NoVNode`] when the pass yields no root vnode.
pub fn render<D, H>(
    dom: &mut D,
    mounts: &Mounts<D::Node>,
    handle: &H,
) -> Result<RenderOutcome<D::Node>, ReconcileError>
where
    D: Dom + ?Sized,
    H: ComponentHandle + ?Sized,
{
    let trace = |message: &str| handle.trace(message);
    let context = RenderingContext::new(handle.resolver())
        .with_credentials(handle.credentials())
        .with_trace(&trace)
        .with_factory(factory::render);

    let result = factory::render(&handle.view(), &context, &Children::new())?;
    let vnode = result.get_final_vtree(handle.root_id()).cloned();
    let html = vnode.as_ref().map(VNode::to_html).unwrap_or_default();

    let dom_id = handle.dom_id();
    let reconciled = mounts.with_pass(dom_id, |component| component.reconcile(dom, dom_id, vnode))?;
    let injected_assets = inject(dom, &result)?;

    Ok(RenderOutcome {
        reconciled,
        html,
        injected_assets,
    })
}
