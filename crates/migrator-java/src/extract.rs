//! Build engine declarations from a Java syntax tree.

use migrator_core::{AnnotationId, AnnotationInstance, AttributeValue, Declaration, SourceSpan};
use tree_sitter::{Node, Tree};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

/// A type declaration and the methods declared directly in its body.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<Declaration>,
}

/// Every type declaration in the file, nested ones included, in source order.
///
/// `resolve` maps an annotation name as written to its fully-qualified id.
pub fn extract_classes(
    source: &str,
    tree: &Tree,
    file: &str,
    resolve: &dyn Fn(&str) -> AnnotationId,
) -> Vec<ClassDecl> {
    let mut classes = Vec::new();
    let root = tree.root_node();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        visit_type(&node, source, file, resolve, &mut classes);
    }
    classes
}

fn visit_type(
    node: &Node,
    source: &str,
    file: &str,
    resolve: &dyn Fn(&str) -> AnnotationId,
    classes: &mut Vec<ClassDecl>,
) {
    if !TYPE_DECLARATIONS.contains(&node.kind()) {
        return;
    }
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };

    let index = classes.len();
    classes.push(ClassDecl {
        name: text(&name, source).to_string(),
        methods: Vec::new(),
    });

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    for member in body_members(&body) {
        if member.kind() == "method_declaration" {
            let method = method_declaration(&member, source, file, resolve);
            classes[index].methods.extend(method);
        } else {
            visit_type(&member, source, file, resolve, classes);
        }
    }
}

/// Members of a class/interface/enum/record body. Enum bodies keep their
/// methods one level down, in `enum_body_declarations`.
fn body_members<'a>(body: &Node<'a>) -> Vec<Node<'a>> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            members.extend(child.named_children(&mut inner));
        } else {
            members.push(child);
        }
    }
    members
}

fn method_declaration(
    node: &Node,
    source: &str,
    file: &str,
    resolve: &dyn Fn(&str) -> AnnotationId,
) -> Option<Declaration> {
    let name = node.child_by_field_name("name")?;

    let mut decl = Declaration::new(text(&name, source)).in_file(file);
    if let Some(params) = node.child_by_field_name("parameters") {
        decl.parameters = parameter_names(&params, source);
    }

    let mut cursor = node.walk();
    let modifiers = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    if let Some(modifiers) = modifiers {
        let mut inner = modifiers.walk();
        for child in modifiers.named_children(&mut inner) {
            if let Some(annotation) = annotation(&child, source, resolve) {
                decl.annotations.push(annotation);
            }
        }
    }

    Some(decl)
}

fn parameter_names(params: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let name = match param.kind() {
            "formal_parameter" => param.child_by_field_name("name"),
            "spread_parameter" => {
                let mut inner = param.walk();
                let declarator = param
                    .named_children(&mut inner)
                    .find(|child| child.kind() == "variable_declarator");
                declarator.and_then(|d| d.child_by_field_name("name"))
            }
            _ => None,
        };
        if let Some(name) = name {
            names.push(text(&name, source).to_string());
        }
    }
    names
}

fn annotation(
    node: &Node,
    source: &str,
    resolve: &dyn Fn(&str) -> AnnotationId,
) -> Option<AnnotationInstance> {
    if !matches!(node.kind(), "annotation" | "marker_annotation") {
        return None;
    }
    let name = node.child_by_field_name("name")?;
    let mut instance = AnnotationInstance::new(resolve(text(&name, source)))
        .with_span(SourceSpan::new(node.start_byte(), node.end_byte()))
        .with_text(text(node, source));

    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for arg in arguments.named_children(&mut cursor) {
            if is_comment(&arg) {
                continue;
            }
            if arg.kind() == "element_value_pair" {
                let key = arg.child_by_field_name("key");
                let value = arg.child_by_field_name("value");
                if let (Some(key), Some(value)) = (key, value) {
                    instance
                        .attributes
                        .insert(text(&key, source).to_string(), attribute_value(&value, source));
                }
            } else {
                instance
                    .attributes
                    .insert("value".to_string(), attribute_value(&arg, source));
            }
        }
    }

    Some(instance)
}

fn attribute_value(node: &Node, source: &str) -> AttributeValue {
    let raw = text(node, source).to_string();
    match node.kind() {
        "string_literal" => AttributeValue::StringLiteral(raw),
        "element_value_array_initializer" => {
            let mut cursor = node.walk();
            let elements = node
                .named_children(&mut cursor)
                .filter(|child| !is_comment(child))
                .map(|child| attribute_value(&child, source))
                .collect();
            AttributeValue::ArrayLiteral {
                text: raw,
                elements,
            }
        }
        _ => AttributeValue::RawExpression(raw),
    }
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn text<'s>(node: &Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}
