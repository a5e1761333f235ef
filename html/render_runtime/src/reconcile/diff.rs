use serde::{Deserialize, Serialize};

use crate::vnode::{Attributes, VElement, VNode};

use super::NodePath;

/// One DOM mutation, addressed by child indices from the mounted root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    Replace { path: NodePath, node: VNode },
    Text { path: NodePath, text: String },
    Attributes {
        path: NodePath,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        set: Attributes,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        remove: Vec<String>,
    },
    Append { path: NodePath, node: VNode },
    Remove { path: NodePath },
}

pub type PatchSet = Vec<Patch>;

/// Patches turning `old` into `new`. Children are matched by index; trailing
/// removals are emitted highest index first so earlier paths stay valid.
pub fn diff(old: &VNode, new: &VNode) -> PatchSet {
    let mut patches = PatchSet::new();
    diff_node(old, new, &mut Vec::new(), &mut patches);
    patches
}

fn diff_node(old: &VNode, new: &VNode, path: &mut NodePath, patches: &mut PatchSet) {
    match (old, new) {
        (VNode::Text(old_text), VNode::Text(new_text)) => {
            if old_text != new_text {
                patches.push(Patch::Text {
                    path: path.clone(),
                    text: new_text.clone(),
                });
            }
        }
        (VNode::Element(old_el), VNode::Element(new_el))
            if old_el.tag.eq_ignore_ascii_case(&new_el.tag) =>
        {
            diff_attributes(old_el, new_el, path, patches);
            diff_children(old_el, new_el, path, patches);
        }
        _ => patches.push(Patch::Replace {
            path: path.clone(),
            node: new.clone(),
        }),
    }
}

fn diff_attributes(old: &VElement, new: &VElement, path: &NodePath, patches: &mut PatchSet) {
    let set: Attributes = new
        .attrs
        .iter()
        .filter(|(name, value)| old.attrs.get(*name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let remove: Vec<String> = old
        .attrs
        .keys()
        .filter(|name| !new.attrs.contains_key(*name))
        .cloned()
        .collect();

    if !set.is_empty() || !remove.is_empty() {
        patches.push(Patch::Attributes {
            path: path.clone(),
            set,
            remove,
        });
    }
}

fn diff_children(old: &VElement, new: &VElement, path: &mut NodePath, patches: &mut PatchSet) {
    let common = old.children.len().min(new.children.len());

    for (index, (old_child, new_child)) in old.children.iter().zip(&new.children).enumerate() {
        path.push(index);
        diff_node(old_child, new_child, path, patches);
        path.pop();
    }

    for index in (common..old.children.len()).rev() {
        let mut child_path = path.clone();
        child_path.push(index);
        patches.push(Patch::Remove { path: child_path });
    }

    for child in &new.children[common..] {
        patches.push(Patch::Append {
            path: path.clone(),
            node: child.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(items: &[&str]) -> VNode {
        VElement::new("ul")
            .attr("id", "l")
            .children(items.iter().map(|item| VElement::new("li").text(*item).into()))
            .into()
    }

    #[test]
    fn identical_trees_need_no_patches() {
        let tree = list(&["a", "b"]);
        assert!(diff(&tree, &tree.clone()).is_empty());
    }

    #[test]
    fn text_changes_are_addressed_by_path() {
        let patches = diff(&list(&["a", "b"]), &list(&["a", "c"]));
        assert_eq!(
            patches,
            [Patch::Text {
                path: vec![1, 0],
                text: "c".to_string()
            }]
        );
    }

    #[test]
    fn shrinking_removes_from_the_end_and_growing_appends() {
        let patches = diff(&list(&["a", "b", "c"]), &list(&["a"]));
        assert_eq!(
            patches,
            [Patch::Remove { path: vec![2] }, Patch::Remove { path: vec![1] }]
        );

        let patches = diff(&list(&["a"]), &list(&["a", "b"]));
        assert_eq!(
            patches,
            [Patch::Append {
                path: vec![],
                node: VElement::new("li").text("b").into()
            }]
        );
    }

    #[test]
    fn attribute_changes_collect_into_one_patch() {
        let old: VNode = VElement::new("a").attr("href", "/x").attr("class", "c").into();
        let new: VNode = VElement::new("a").attr("href", "/y").attr("target", "_blank").into();

        let patches = diff(&old, &new);
        assert_eq!(
            serde_json::to_value(&patches).expect("encode"),
            json!([{
                "op": "attributes",
                "path": [],
                "set": {"href": "/y", "target": "_blank"},
                "remove": ["class"]
            }])
        );
    }

    #[test]
    fn tag_or_kind_changes_replace_the_node() {
        let old: VNode = VElement::new("span").text("x").into();
        let new: VNode = VElement::new("div").text("x").into();
        assert!(matches!(diff(&old, &new).as_slice(), [Patch::Replace { path, .. }] if path.is_empty()));

        let patches = diff(&VNode::text("x"), &new);
        assert!(matches!(patches.as_slice(), [Patch::Replace { .. }]));
    }
}
