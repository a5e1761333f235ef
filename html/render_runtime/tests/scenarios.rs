use std::cell::RefCell;

use declarative_render::reconcile::{DelegatorChange, diff, virtualize};
use declarative_render::serde_json::{Value, json};
use declarative_render::widgets::{anchor, list, table};
use declarative_render::{
    Children, ComponentHandle, Description, Dom, DomEvent, Item, MemoryDom, MountedComponent,
    Mounts, ReconcileError, RenderingContext, Resolver, TopologyResolver, VElement, VNode, factory,
    render,
};

fn context(resolver: &TopologyResolver) -> RenderingContext<'_> {
    RenderingContext::new(resolver).with_factory(factory::render)
}

fn registry() -> TopologyResolver {
    TopologyResolver::from_value(&json!({
        "home": {
            "type": "container",
            "settings": {"id": "home"},
            "state": {"items": [{"view": "nav"}, {"view": "grid"}]}
        },
        "nav": {
            "type": "menubar",
            "settings": {"id": "nav"},
            "state": {"items": [
                {"id": "nav-home", "label": "Home", "href": "/"},
                {"id": "nav-save", "label": "Save", "command": "doc.save"}
            ]}
        },
        "grid": {
            "type": "table",
            "settings": {"id": "grid"},
            "state": {"headers": [["name", "size"]], "items": [["a", 1], ["b", 2]]}
        }
    }))
}

#[test]
fn explicit_ids_render_byte_identical_markup() {
    let resolver = registry();

    let first = factory::render(&Item::from("home"), &context(&resolver), &Children::new())
        .expect("first render");
    let second = factory::render(&Item::from("home"), &context(&resolver), &Children::new())
        .expect("second render");

    let html = first.get_final_html(None).expect("markup");
    assert_eq!(Some(html), second.get_final_html(None));
}

#[test]
fn generated_ids_are_the_only_difference() {
    let resolver = TopologyResolver::new();
    let state = json!({"items": ["a", "b"]});

    let first = list(&Value::Null, &state, &context(&resolver), None).expect("render");
    let second = list(&Value::Null, &state, &context(&resolver), None).expect("render");

    let strip = |tree: &VNode| match tree {
        VNode::Element(element) => {
            let mut element = element.clone();
            element.attrs.shift_remove("id");
            VNode::Element(element)
        }
        other => other.clone(),
    };
    let first = first.get_final_vtree(None).expect("tree");
    let second = second.get_final_vtree(None).expect("tree");
    assert_ne!(first.attr("id"), second.attr("id"));
    assert_eq!(strip(first), strip(second));
}

#[test]
fn body_rows_and_list_entries_match_item_counts() {
    let resolver = TopologyResolver::new();
    let items: Vec<Value> = (0..5).map(|i| json!([i, i * 2])).collect();

    let result = table(&json!({"id": "t"}), &json!({"items": items}), &context(&resolver), None)
        .expect("table");
    let tree = result.get_vtree("t").expect("table tree");
    let tbody = &tree.children()[1];
    assert_eq!(tbody.tag(), Some("tbody"));
    assert_eq!(tbody.children().len(), 5);

    let result = list(
        &json!({"id": "l", "label": "Title"}),
        &json!({"items": [1, 2, 3]}),
        &context(&resolver),
        None,
    )
    .expect("list");
    let tree = result.get_vtree("l").expect("list tree");
    let entries = tree.children().iter().filter(|n| n.tag() == Some("li")).count();
    assert_eq!(entries, 3);
    assert_eq!(tree.children().len(), 4);
    assert_eq!(tree.children()[0].as_text(), Some("Title"));
}

#[test]
fn unresolved_strings_pass_through_verbatim() {
    let resolver = registry();

    for input in ["", "plain words", "<b>not markup</b>", "Home"] {
        let result = factory::render(&Item::from(input), &context(&resolver), &Children::new())
            .expect("render");
        assert_eq!(result.len(), 1);
        assert_eq!(result.get_final_vtree(None).and_then(VNode::as_text), Some(input));
    }
}

#[test]
fn virtualized_baseline_yields_no_patches() {
    let resolver = registry();
    let result = factory::render(&Item::from("home"), &context(&resolver), &Children::new())
        .expect("render");
    let tree = result.get_final_vtree(None).expect("tree").clone();

    let mut dom = MemoryDom::new();
    let body = dom.body();
    let element = dom.mount_vnode(body, &tree).expect("mount");

    let baseline = virtualize(&dom, element).expect("virtualize");
    assert!(diff(&baseline, &baseline).is_empty());

    let mut component = MountedComponent::new();
    let outcome = component
        .reconcile(&mut dom, "home", Some(baseline))
        .expect("adopt");
    assert!(outcome.patches.is_empty());
    assert_eq!(outcome.element, element);
}

#[test]
fn scenario_a_anchor_defaults() {
    let resolver = TopologyResolver::new();
    let result = anchor(&json!({}), &json!({}), &context(&resolver), None).expect("anchor");

    let tree = result.get_final_vtree(None).expect("tree");
    let id = tree.attr("id").expect("generated id");
    assert!(!id.is_empty());
    assert_eq!(
        result.get_final_html(None),
        Some(format!(r##"<a id="{id}" href="#"></a>"##))
    );
}

#[test]
fn scenario_b_list_preserves_order() {
    let resolver = TopologyResolver::new();
    let result = list(&json!({"type": "ul"}), &json!({"items": ["a", "b"]}), &context(&resolver), None)
        .expect("list");

    let tree = result.get_final_vtree(None).expect("tree");
    assert_eq!(tree.tag(), Some("ul"));
    let texts: Vec<&str> = tree
        .children()
        .iter()
        .map(|li| {
            assert_eq!(li.tag(), Some("li"));
            li.children()[0].as_text().expect("text")
        })
        .collect();
    assert_eq!(texts, ["a", "b"]);
}

#[test]
fn scenario_c_table_sections() {
    let resolver = TopologyResolver::new();
    let result = table(
        &json!({"id": "t"}),
        &json!({"headers": [["a", "b"]], "items": [["a1", "b1"], ["a2", "b2"]]}),
        &context(&resolver),
        None,
    )
    .expect("table");

    assert_eq!(
        result.get_html("t").as_deref(),
        Some(concat!(
            r#"<table id="t"><thead><tr><th>a</th><th>b</th></tr></thead>"#,
            r#"<tbody><tr><td>a1</td><td>b1</td></tr><tr><td>a2</td><td>b2</td></tr></tbody>"#,
            r#"<tfoot></tfoot></table>"#
        ))
    );
}

#[test]
fn scenario_d_first_pass_creates_element_and_delegator() {
    let mut dom = MemoryDom::new();
    let mut component = MountedComponent::new();
    let span: VNode = VElement::new("span").text("x").into();

    let outcome = component.reconcile(&mut dom, "target", Some(span)).expect("mount");

    assert!(outcome.created);
    assert_eq!(outcome.delegator, DelegatorChange::Created);
    assert_eq!(dom.outer_html(outcome.element).expect("html"), "<span>x</span>");
    assert_eq!(
        component.delegator().and_then(|delegator| delegator.root()),
        Some(outcome.element)
    );
}

#[test]
fn scenario_e_identical_pass_rebinds_without_patches() {
    let mut dom = MemoryDom::new();
    let mut component = MountedComponent::new();
    let span: VNode = VElement::new("span").text("x").into();

    let first = component.reconcile(&mut dom, "target", Some(span.clone())).expect("mount");
    let serial = component.delegator().map(|delegator| delegator.serial());

    let second = component.reconcile(&mut dom, "target", Some(span)).expect("repeat");
    assert!(second.patches.is_empty());
    assert_eq!(second.element, first.element);
    assert_eq!(second.delegator, DelegatorChange::Rebound);
    assert_eq!(component.delegator().map(|delegator| delegator.serial()), serial);
}

struct Handle<'a> {
    dom_id: &'a str,
    view: &'a str,
    resolver: &'a TopologyResolver,
    traces: RefCell<Vec<String>>,
}

impl ComponentHandle for Handle<'_> {
    fn dom_id(&self) -> &str {
        self.dom_id
    }

    fn resolver(&self) -> &dyn Resolver {
        self.resolver
    }

    fn view(&self) -> Item {
        Item::from(self.view)
    }

    fn trace(&self, message: &str) {
        self.traces.borrow_mut().push(message.to_string());
    }
}

#[test]
fn render_entry_point_mounts_and_delegates_commands() {
    let resolver = registry();
    let handle = Handle {
        dom_id: "home",
        view: "home",
        resolver: &resolver,
        traces: RefCell::new(Vec::new()),
    };
    let mut dom = MemoryDom::new();
    let mounts = Mounts::new();

    let outcome = render(&mut dom, &mounts, &handle).expect("first render");
    assert!(outcome.reconciled.created);
    assert_eq!(dom.get_element_by_id("home"), Some(outcome.reconciled.element));
    assert!(handle.traces.borrow().iter().any(|line| line == "table#grid"));

    let again = render(&mut dom, &mounts, &handle).expect("second render");
    assert!(again.reconciled.patches.is_empty());
    assert_eq!(again.html, outcome.html);

    let component = mounts.get("home").expect("mounted");
    let component = component.lock().expect("lock");
    let save = dom
        .get_element_by_id("nav")
        .and_then(|nav| {
            let mut stack = vec![nav];
            while let Some(node) = stack.pop() {
                if dom.attribute(node, "data-command").as_deref() == Some("doc.save") {
                    return Some(node);
                }
                stack.extend(dom.children(node).ok()?);
            }
            None
        })
        .expect("save anchor");

    let command = component
        .dispatch(&dom, &DomEvent::new("click", save))
        .expect("delegated");
    assert_eq!(command.command, "doc.save");
}

#[test]
fn render_without_a_root_vnode_is_rejected() {
    let resolver = TopologyResolver::new();
    let handle = Handle {
        dom_id: "empty",
        view: "page",
        resolver: &resolver,
        traces: RefCell::new(Vec::new()),
    };
    let mut dom = MemoryDom::new();
    let mounts = Mounts::new();

    struct Rootless<'a>(&'a Handle<'a>);
    impl ComponentHandle for Rootless<'_> {
        fn dom_id(&self) -> &str {
            self.0.dom_id()
        }
        fn resolver(&self) -> &dyn Resolver {
            self.0.resolver()
        }
        fn view(&self) -> Item {
            self.0.view()
        }
        fn root_id(&self) -> Option<&str> {
            Some("missing")
        }
    }

    let err = render(&mut dom, &mounts, &Rootless(&handle)).expect_err("no vnode");
    assert!(matches!(err, ReconcileError::NoVNode(id) if id == "empty"));
    assert!(dom.get_element_by_id("empty").is_none());
}

#[test]
fn local_children_resolve_inside_descriptions() {
    let resolver = TopologyResolver::new();
    let description = Description::new("container")
        .with_settings(json!({"id": "c"}))
        .with_state(json!({"items": [{"view": "greeting"}]}))
        .with_child(
            "greeting",
            Description::new("label").with_settings(json!({"id": "g"})).with_state(json!({"text": "hi"})),
        );

    let result = factory::render(&Item::Inline(description), &context(&resolver), &Children::new())
        .expect("render");
    assert_eq!(
        result.get_html("c").as_deref(),
        Some(r#"<div id="c" class="container"><label id="g">hi</label></div>"#)
    );
}
