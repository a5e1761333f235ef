use tracing::trace;

use crate::dom::Dom;
use crate::error::{DomError, ReconcileError};
use crate::vnode::VNode;

use super::NodePath;
use super::diff::Patch;

pub fn create_node<D: Dom + ?Sized>(dom: &mut D, vnode: &VNode) -> Result<D::Node, DomError> {
    match vnode {
        VNode::Text(text) => Ok(dom.create_text(text)),
        VNode::Element(element) => {
            let node = dom.create_element(&element.tag);
            for (name, value) in &element.attrs {
                dom.set_attribute(node, name, value)?;
            }
            for child in &element.children {
                let child = create_node(dom, child)?;
                dom.append_child(node, child)?;
            }
            Ok(node)
        }
    }
}

pub fn node_at<D: Dom + ?Sized>(
    dom: &D,
    root: D::Node,
    path: &[usize],
) -> Result<D::Node, ReconcileError> {
    let mut current = root;
    for &index in path {
        current = dom
            .children(current)?
            .get(index)
            .copied()
            .ok_or_else(|| ReconcileError::BadPath {
                path: path.to_vec(),
            })?;
    }
    Ok(current)
}

/// Applies `patches` in order under `root` and returns the resulting root,
/// which differs from `root` only when the root itself was replaced.
pub fn apply<D: Dom + ?Sized>(
    dom: &mut D,
    root: D::Node,
    patches: &[Patch],
) -> Result<D::Node, ReconcileError> {
    let mut root = root;

    for patch in patches {
        trace!(?patch, "apply");
        match patch {
            Patch::Replace { path, node } => {
                let old = node_at(dom, root, path)?;
                let new = create_node(dom, node)?;
                if let Some(parent) = dom.parent(old) {
                    dom.replace_child(parent, new, old)?;
                } else if !path.is_empty() {
                    return Err(ReconcileError::BadPath { path: path.clone() });
                }
                if path.is_empty() {
                    root = new;
                }
            }
            Patch::Text { path, text } => {
                let target = node_at(dom, root, path)?;
                dom.set_text(target, text)?;
            }
            Patch::Attributes { path, set, remove } => {
                let target = node_at(dom, root, path)?;
                for name in remove {
                    dom.remove_attribute(target, name)?;
                }
                for (name, value) in set {
                    dom.set_attribute(target, name, value)?;
                }
            }
            Patch::Append { path, node } => {
                let parent = node_at(dom, root, path)?;
                let child = create_node(dom, node)?;
                dom.append_child(parent, child)?;
            }
            Patch::Remove { path } => {
                let Some((_, parent_path)) = path.split_last() else {
                    return Err(ReconcileError::BadPath { path: path.clone() });
                };
                let parent = node_at(dom, root, parent_path)?;
                let target = node_at(dom, root, path)?;
                dom.remove_child(parent, target)?;
            }
        }
    }

    Ok(root)
}
