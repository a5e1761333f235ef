//! Document binding used by the reconciliation engine.
//!
//! [`Dom`] is the seam a browser binding implements; [`MemoryDom`] is an
//! arena-backed document used by the stdio host and by tests.

use std::fmt;
use std::hash::Hash;

use crate::error::DomError;
use crate::reconcile::{create_node, virtualize};
use crate::vnode::{Attributes, VNode};

pub trait Dom {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// First connected element carrying `id`, in document order.
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn create_element(&mut self, tag: &str) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;

    fn tag_name(&self, node: Self::Node) -> Result<Option<String>, DomError>;
    fn text(&self, node: Self::Node) -> Result<Option<String>, DomError>;
    fn attributes(&self, node: Self::Node) -> Result<Attributes, DomError>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String> {
        self.attributes(node)
            .ok()
            .and_then(|mut attrs| attrs.shift_remove(name))
    }

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_attribute(&mut self, node: Self::Node, name: &str) -> Result<(), DomError>;
    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), DomError>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn children(&self, node: Self::Node) -> Result<Vec<Self::Node>, DomError>;

    /// Appends `child`, detaching it from its current parent first.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), DomError>;
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), DomError>;
    /// Puts `new` where `old` was; `old` ends up detached.
    fn replace_child(
        &mut self,
        parent: Self::Node,
        new: Self::Node,
        old: Self::Node,
    ) -> Result<(), DomError>;

    fn head(&self) -> Self::Node;
    fn body(&self) -> Self::Node;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element { tag: String, attrs: Attributes },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document: `<html><head></head><body></body></html>`.
///
/// Detached nodes stay in the arena; ids are never reused.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Slot>,
    document: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        dom.document = dom.alloc_element("html");
        dom.head = dom.alloc_element("head");
        dom.body = dom.alloc_element("body");
        for section in [dom.head, dom.body] {
            dom.nodes[section.0].parent = Some(dom.document);
            dom.nodes[dom.document.0].children.push(section);
        }
        dom
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Builds `vnode` and appends it to `parent`, returning the new node.
    pub fn mount_vnode(&mut self, parent: NodeId, vnode: &VNode) -> Result<NodeId, DomError> {
        let node = create_node(self, vnode)?;
        self.append_child(parent, node)?;
        Ok(node)
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String, DomError> {
        Ok(virtualize(self, node)?.to_html())
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.document {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn alloc_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attrs: Attributes::new(),
        })
    }

    fn slot(&self, node: NodeId) -> Result<&Slot, DomError> {
        self.nodes
            .get(node.0)
            .ok_or_else(|| DomError::StaleNode(node.to_string()))
    }

    fn slot_mut(&mut self, node: NodeId) -> Result<&mut Slot, DomError> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| DomError::StaleNode(node.to_string()))
    }

    fn attrs_mut(&mut self, node: NodeId) -> Result<&mut Attributes, DomError> {
        match &mut self.slot_mut(node)?.data {
            NodeData::Element { attrs, .. } => Ok(attrs),
            NodeData::Text(_) => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    fn require_element(&self, node: NodeId) -> Result<(), DomError> {
        match self.slot(node)?.data {
            NodeData::Element { .. } => Ok(()),
            NodeData::Text(_) => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.slot_mut(node)?.parent.take() {
            self.slot_mut(parent)?.children.retain(|child| *child != node);
        }
        Ok(())
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.slot(parent)?
            .children
            .iter()
            .position(|candidate| *candidate == child)
            .ok_or_else(|| DomError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            })
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.document];
        while let Some(node) = stack.pop() {
            let slot = self.nodes.get(node.0)?;
            if let NodeData::Element { attrs, .. } = &slot.data {
                if attrs.get("id").is_some_and(|value| value == id) {
                    return Some(node);
                }
            }
            stack.extend(slot.children.iter().rev());
        }
        None
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc_element(tag)
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    fn tag_name(&self, node: NodeId) -> Result<Option<String>, DomError> {
        Ok(match &self.slot(node)?.data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            NodeData::Text(_) => None,
        })
    }

    fn text(&self, node: NodeId) -> Result<Option<String>, DomError> {
        Ok(match &self.slot(node)?.data {
            NodeData::Text(text) => Some(text.clone()),
            NodeData::Element { .. } => None,
        })
    }

    fn attributes(&self, node: NodeId) -> Result<Attributes, DomError> {
        match &self.slot(node)?.data {
            NodeData::Element { attrs, .. } => Ok(attrs.clone()),
            NodeData::Text(_) => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attrs, .. } => attrs.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.attrs_mut(node)?
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.attrs_mut(node)?.shift_remove(name);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.slot_mut(node)?.data {
            NodeData::Text(current) => {
                *current = text.to_string();
                Ok(())
            }
            NodeData::Element { .. } => Err(DomError::NotAText(node.to_string())),
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|slot| slot.parent)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.slot(node)?.children.clone())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.require_element(parent)?;
        self.slot(child)?;
        self.detach(child)?;
        self.slot_mut(parent)?.children.push(child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.position(parent, child)?;
        self.slot_mut(parent)?.children.remove(index);
        self.slot_mut(child)?.parent = None;
        Ok(())
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> Result<(), DomError> {
        if new == old {
            return Ok(());
        }
        self.slot(new)?;
        self.detach(new)?;
        let index = self.position(parent, old)?;
        self.slot_mut(parent)?.children[index] = new;
        self.slot_mut(new)?.parent = Some(parent);
        self.slot_mut(old)?.parent = None;
        Ok(())
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn body(&self) -> NodeId {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnode::VElement;

    #[test]
    fn fresh_document_has_head_and_body() {
        let dom = MemoryDom::new();
        assert_eq!(
            dom.outer_html(dom.document()).expect("html"),
            "<html><head></head><body></body></html>"
        );
    }

    #[test]
    fn lookup_by_id_ignores_detached_nodes() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let node = dom
            .mount_vnode(body, &VElement::new("div").attr("id", "app").into())
            .expect("mount");
        assert_eq!(dom.get_element_by_id("app"), Some(node));

        dom.remove_child(body, node).expect("remove");
        assert_eq!(dom.get_element_by_id("app"), None);
        assert!(!dom.is_connected(node));
    }

    #[test]
    fn replace_child_keeps_position() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let first = dom.create_text("a");
        let second = dom.create_text("b");
        let third = dom.create_text("c");
        dom.append_child(body, first).expect("append");
        dom.append_child(body, second).expect("append");

        dom.replace_child(body, third, first).expect("replace");
        assert_eq!(dom.children(body).expect("children"), [third, second]);
        assert_eq!(dom.parent(first), None);
    }

    #[test]
    fn text_nodes_reject_element_operations() {
        let mut dom = MemoryDom::new();
        let text = dom.create_text("x");
        let span = dom.create_element("span");

        assert!(matches!(
            dom.set_attribute(text, "id", "t"),
            Err(DomError::NotAnElement(_))
        ));
        assert!(matches!(dom.append_child(text, span), Err(DomError::NotAnElement(_))));
        assert!(matches!(dom.set_text(span, "y"), Err(DomError::NotAText(_))));
        assert!(matches!(
            dom.remove_child(span, text),
            Err(DomError::NotAChild { .. })
        ));
    }
}
