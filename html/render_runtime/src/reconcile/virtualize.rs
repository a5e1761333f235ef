use crate::dom::Dom;
use crate::error::DomError;
use crate::vnode::{VElement, VNode};

/// Reads an existing DOM subtree back into a baseline vnode.
pub fn virtualize<D: Dom + ?Sized>(dom: &D, node: D::Node) -> Result<VNode, DomError> {
    if let Some(text) = dom.text(node)? {
        return Ok(VNode::Text(text));
    }

    let tag = dom
        .tag_name(node)?
        .ok_or_else(|| DomError::NotAnElement(format!("{node:?}")))?;
    let mut element = VElement::new(tag);
    element.attrs = dom.attributes(node)?;
    for child in dom.children(node)? {
        element.children.push(virtualize(dom, child)?);
    }
    Ok(element.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::reconcile::diff::diff;

    #[test]
    fn virtualized_markup_diffs_clean_against_itself() {
        let original: VNode = VElement::new("section")
            .attr("id", "server")
            .child(VElement::new("h1").text("Title"))
            .child(VElement::new("input").attr("value", "x"))
            .text("tail")
            .into();

        let mut dom = MemoryDom::new();
        let body = dom.body();
        let node = dom.mount_vnode(body, &original).expect("mount");

        let baseline = virtualize(&dom, node).expect("virtualize");
        assert_eq!(baseline, original);
        assert!(diff(&baseline, &baseline).is_empty());
    }
}
