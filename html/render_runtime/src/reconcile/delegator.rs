use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::Dom;

/// Event types a delegator listens for at its root.
pub const DEFAULT_EVENTS: &[&str] = &["click", "change", "input", "submit", "keydown"];

/// Attribute carrying the click handler name set by `anchor` and `button`.
pub const COMMAND_ATTRIBUTE: &str = "data-command";

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent<N> {
    pub kind: String,
    pub target: N,
}

impl<N> DomEvent<N> {
    pub fn new(kind: impl Into<String>, target: N) -> Self {
        Self {
            kind: kind.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedCommand {
    pub event: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
}

/// Single listener bound at a mounted root.
///
/// Owned by the mounted component; `destroy` releases the root and every
/// later dispatch yields nothing.
#[derive(Debug)]
pub struct EventDelegator<N> {
    serial: u64,
    root: Option<N>,
    events: Vec<String>,
}

impl<N: Copy + Eq + std::fmt::Debug> EventDelegator<N> {
    pub fn create(root: N) -> Self {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        debug!(serial, ?root, "event delegator created");
        Self {
            serial,
            root: Some(root),
            events: DEFAULT_EVENTS.iter().map(|event| event.to_string()).collect(),
        }
    }

    pub fn rebind(&mut self, root: N) {
        if self.root != Some(root) {
            debug!(serial = self.serial, ?root, "event delegator re-rooted");
        }
        self.root = Some(root);
    }

    pub fn destroy(&mut self) {
        if let Some(root) = self.root.take() {
            debug!(serial = self.serial, ?root, "event delegator destroyed");
        }
    }

    /// Distinguishes delegator instances; a recreated delegator gets a new one.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn root(&self) -> Option<N> {
        self.root
    }

    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    pub fn listens_to(&self, kind: &str) -> bool {
        self.events.iter().any(|event| event == kind)
    }

    /// Walks from the event target up to the root and returns the first
    /// declared handler: `data-on-<event>`, or `data-command` for clicks.
    /// Targets outside the root's subtree match nothing.
    pub fn dispatch<D>(&self, dom: &D, event: &DomEvent<N>) -> Option<DelegatedCommand>
    where
        D: Dom<Node = N> + ?Sized,
    {
        let root = self.root?;
        if !self.listens_to(&event.kind) {
            return None;
        }

        let mut chain = Vec::new();
        let mut current = Some(event.target);
        loop {
            let node = current?;
            chain.push(node);
            if node == root {
                break;
            }
            current = dom.parent(node);
        }

        let handler_attribute = format!("data-on-{}", event.kind);
        chain.into_iter().find_map(|node| {
            let command = dom.attribute(node, &handler_attribute).or_else(|| {
                (event.kind == "click")
                    .then(|| dom.attribute(node, COMMAND_ATTRIBUTE))
                    .flatten()
            })?;
            Some(DelegatedCommand {
                event: event.kind.clone(),
                command,
                element_id: dom.attribute(node, "id"),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId};
    use crate::reconcile::node_at;
    use crate::vnode::VElement;

    fn toolbar(dom: &mut MemoryDom) -> NodeId {
        let body = dom.body();
        let vnode = VElement::new("div")
            .attr("id", "bar")
            .attr("data-on-change", "bar.changed")
            .child(
                VElement::new("button")
                    .attr("id", "save")
                    .attr("data-command", "doc.save")
                    .child(VElement::new("span").text("Save")),
            )
            .child(VElement::new("input").attr("id", "q"))
            .into();
        dom.mount_vnode(body, &vnode).expect("mount")
    }

    #[test]
    fn clicks_bubble_to_the_nearest_command() {
        let mut dom = MemoryDom::new();
        let root = toolbar(&mut dom);
        let delegator = EventDelegator::create(root);

        let label = node_at(&dom, root, &[0, 0]).expect("span");
        let command = delegator
            .dispatch(&dom, &DomEvent::new("click", label))
            .expect("command");

        assert_eq!(command.command, "doc.save");
        assert_eq!(command.element_id.as_deref(), Some("save"));
    }

    #[test]
    fn named_handlers_match_their_event_only() {
        let mut dom = MemoryDom::new();
        let root = toolbar(&mut dom);
        let delegator = EventDelegator::create(root);
        let input = node_at(&dom, root, &[1]).expect("input");

        let command = delegator
            .dispatch(&dom, &DomEvent::new("change", input))
            .expect("change handler on root");
        assert_eq!(command.command, "bar.changed");
        assert_eq!(command.element_id.as_deref(), Some("bar"));

        assert!(delegator.dispatch(&dom, &DomEvent::new("click", input)).is_none());
        assert!(delegator.dispatch(&dom, &DomEvent::new("scroll", input)).is_none());
    }

    #[test]
    fn outside_targets_and_destroyed_delegators_match_nothing() {
        let mut dom = MemoryDom::new();
        let root = toolbar(&mut dom);
        let outside = dom.create_element("button");
        dom.set_attribute(outside, "data-command", "other").expect("attr");
        let body = dom.body();
        dom.append_child(body, outside).expect("append");

        let mut delegator = EventDelegator::create(root);
        assert!(delegator.dispatch(&dom, &DomEvent::new("click", outside)).is_none());

        let button = node_at(&dom, root, &[0]).expect("button");
        delegator.destroy();
        assert!(!delegator.is_active());
        assert!(delegator.dispatch(&dom, &DomEvent::new("click", button)).is_none());
    }

    #[test]
    fn rebinding_keeps_the_serial() {
        let mut dom = MemoryDom::new();
        let root = toolbar(&mut dom);
        let mut delegator = EventDelegator::create(root);
        let serial = delegator.serial();

        let other = dom.create_element("div");
        delegator.rebind(other);
        assert_eq!(delegator.serial(), serial);
        assert_eq!(delegator.root(), Some(other));
        assert_ne!(EventDelegator::create(root).serial(), serial);
    }
}
