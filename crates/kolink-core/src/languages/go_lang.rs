//! Go language analyser.

use tree_sitter::{Language, Node, Tree};

use super::LanguageAnalyser;
use crate::model::{Declaration, DeclarationKind, ImportSpec, QualifiedField, SelectorShape};

const CONSTRUCTOR_PREFIX: &str = "New";
const TEST_SUFFIX: &str = "_test.go";

pub struct GoAnalyser;

impl Default for GoAnalyser {
    fn default() -> Self {
        Self
    }
}

impl GoAnalyser {
    pub fn new() -> Self {
        Self
    }

    fn text(node: &Node, source: &[u8]) -> Option<String> {
        node.utf8_text(source).ok().map(|s| s.to_string())
    }

    fn field_text(node: &Node, field: &str, source: &[u8]) -> Option<String> {
        node.child_by_field_name(field)
            .and_then(|n| Self::text(&n, source))
    }

    fn line(node: &Node) -> usize {
        node.start_position().row + 1
    }

    fn type_spec(spec: &Node, source: &[u8]) -> Option<Declaration> {
        let name = Self::field_text(spec, "name", source)?;
        let is_func = spec
            .child_by_field_name("type")
            .is_some_and(|t| t.kind() == "function_type");
        Some(Declaration {
            name,
            kind: if is_func {
                DeclarationKind::FunctionType
            } else {
                DeclarationKind::Type
            },
            line: Self::line(spec),
        })
    }

    fn import_spec(spec: &Node, source: &[u8]) -> Option<ImportSpec> {
        let raw = Self::field_text(spec, "path", source)?;
        let path = raw.trim_matches(|c| c == '"' || c == '`').to_string();
        let alias = match spec.child_by_field_name("name") {
            // `_` and `.` imports never appear as a call qualifier.
            Some(n) if n.kind() == "blank_identifier" || n.kind() == "dot" => return None,
            Some(n) => Some(Self::text(&n, source)?),
            None => None,
        };
        Some(ImportSpec { alias, path })
    }

    fn find_struct_fields(node: &Node, source: &[u8], fields: &mut Vec<QualifiedField>) {
        if node.kind() == "type_spec" {
            if let Some(body) = node
                .child_by_field_name("type")
                .filter(|t| t.kind() == "struct_type")
            {
                Self::collect_struct_fields(&body, source, fields);
            }
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                Self::find_struct_fields(&child, source, fields);
            }
        }
    }

    fn collect_struct_fields(body: &Node, source: &[u8], fields: &mut Vec<QualifiedField>) {
        for i in 0..body.named_child_count() {
            let Some(list) = body.named_child(i) else {
                continue;
            };
            if list.kind() != "field_declaration_list" {
                continue;
            }
            for j in 0..list.named_child_count() {
                let Some(decl) = list.named_child(j) else {
                    continue;
                };
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let Some(ty) = decl.child_by_field_name("type") else {
                    continue;
                };
                let Some((package, type_name)) = Self::qualified_type(&ty, source) else {
                    continue;
                };
                let mut cursor = decl.walk();
                let names = decl
                    .children_by_field_name("name", &mut cursor)
                    .filter_map(|n| Self::text(&n, source))
                    .collect();
                fields.push(QualifiedField {
                    names,
                    package,
                    type_name,
                });
            }
        }
    }

    /// `pkg.Type` or `*pkg.Type` as `(pkg, Type)`.
    fn qualified_type(ty: &Node, source: &[u8]) -> Option<(String, String)> {
        let ty = if ty.kind() == "pointer_type" {
            ty.named_child(0)?
        } else {
            *ty
        };
        if ty.kind() != "qualified_type" {
            return None;
        }
        Some((
            Self::field_text(&ty, "package", source)?,
            Self::field_text(&ty, "name", source)?,
        ))
    }

    fn find_selectors(node: &Node, source: &[u8], shapes: &mut Vec<SelectorShape>) {
        match node.kind() {
            "selector_expression" => {
                if let Some(shape) = Self::chained_selector(node, source) {
                    shapes.push(shape);
                }
            }
            "call_expression" => {
                if let Some(shape) = Self::qualified_call(node, source) {
                    shapes.push(shape);
                }
            }
            _ => {}
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                Self::find_selectors(&child, source, shapes);
            }
        }
    }

    fn chained_selector(node: &Node, source: &[u8]) -> Option<SelectorShape> {
        let operand = node.child_by_field_name("operand")?;
        if operand.kind() != "selector_expression" {
            return None;
        }
        Some(SelectorShape::Chained {
            field: Self::field_text(&operand, "field", source)?,
            member: Self::field_text(node, "field", source)?,
            line: Self::line(node),
        })
    }

    fn qualified_call(node: &Node, source: &[u8]) -> Option<SelectorShape> {
        let function = node
            .child_by_field_name("function")
            .filter(|f| f.kind() == "selector_expression")?;
        let operand = function
            .child_by_field_name("operand")
            .filter(|o| o.kind() == "identifier")?;
        Some(SelectorShape::QualifiedCall {
            qualifier: Self::text(&operand, source)?,
            name: Self::field_text(&function, "field", source)?,
            line: Self::line(node),
        })
    }
}

impl LanguageAnalyser for GoAnalyser {
    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn language_name(&self) -> &str {
        "Go"
    }

    fn get_language(&self) -> Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn is_test_file(&self, file_name: &str) -> bool {
        file_name.ends_with(TEST_SUFFIX)
    }

    fn is_constructor(&self, name: &str) -> bool {
        name.strip_prefix(CONSTRUCTOR_PREFIX)
            .is_some_and(|rest| !rest.is_empty())
    }

    fn is_exported(&self, name: &str) -> bool {
        name.chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
    }

    fn extract_declarations(&self, tree: &Tree, source: &[u8]) -> Vec<Declaration> {
        let mut decls = Vec::new();
        let root = tree.root_node();

        for i in 0..root.named_child_count() {
            let Some(child) = root.named_child(i) else {
                continue;
            };
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(name) = Self::field_text(&child, "name", source) {
                        decls.push(Declaration {
                            name,
                            kind: if child.kind() == "method_declaration" {
                                DeclarationKind::Method
                            } else {
                                DeclarationKind::Function
                            },
                            line: Self::line(&child),
                        });
                    }
                }
                "type_declaration" => {
                    for j in 0..child.named_child_count() {
                        if let Some(spec) = child.named_child(j) {
                            if spec.kind() == "type_spec" || spec.kind() == "type_alias" {
                                decls.extend(Self::type_spec(&spec, source));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        decls
    }

    fn extract_imports(&self, tree: &Tree, source: &[u8]) -> Vec<ImportSpec> {
        let mut imports = Vec::new();
        let root = tree.root_node();

        for i in 0..root.named_child_count() {
            let Some(decl) = root.named_child(i) else {
                continue;
            };
            if decl.kind() != "import_declaration" {
                continue;
            }
            for j in 0..decl.named_child_count() {
                let Some(spec) = decl.named_child(j) else {
                    continue;
                };
                match spec.kind() {
                    "import_spec" => imports.extend(Self::import_spec(&spec, source)),
                    "import_spec_list" => {
                        for k in 0..spec.named_child_count() {
                            if let Some(sub) = spec.named_child(k) {
                                if sub.kind() == "import_spec" {
                                    imports.extend(Self::import_spec(&sub, source));
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        imports
    }

    fn extract_qualified_fields(&self, tree: &Tree, source: &[u8]) -> Vec<QualifiedField> {
        let mut fields = Vec::new();
        Self::find_struct_fields(&tree.root_node(), source, &mut fields);
        fields
    }

    fn extract_selectors(&self, tree: &Tree, source: &[u8]) -> Vec<SelectorShape> {
        let mut shapes = Vec::new();
        Self::find_selectors(&tree.root_node(), source, &mut shapes);
        shapes
    }
}
