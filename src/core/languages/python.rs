use tree_sitter::{Node, Parser, Tree};

use crate::error::{ApiScanError, Result};
use super::super::arg_shape::{ArgExpr, LiteralType};
use super::super::CallSite;
use super::CallExtractor;

/// Python call extractor using Tree-sitter
pub struct PythonCallExtractor {
    parser: Parser,
}

impl PythonCallExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser.set_language(&python_language)
            .map_err(|e| ApiScanError::Parser(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }

    fn parse_tree(&mut self, content: &str) -> Result<Tree> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| ApiScanError::Parser("Failed to parse Python code".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => format!(
                    "invalid syntax at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column
                ),
                None => "invalid syntax".to_string(),
            };
            return Err(ApiScanError::Syntax(message));
        }

        Ok(tree)
    }
}

impl CallExtractor for PythonCallExtractor {
    fn extract_calls(&mut self, content: &str) -> Result<Vec<CallSite>> {
        let tree = self.parse_tree(content)?;
        let mut calls = Vec::new();

        // Iterative pre-order walk; every node is visited exactly once
        let mut cursor = tree.root_node().walk();
        'walk: loop {
            let node = cursor.node();
            if node.kind() == "call" {
                if let Some(call) = call_site(node, content) {
                    calls.push(call);
                }
            }

            if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        Ok(calls)
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

fn call_site(call: Node, source: &str) -> Option<CallSite> {
    let function = call.child_by_field_name("function")?;
    let name = callee_name(function, source)?;

    let args = match call.child_by_field_name("arguments") {
        Some(arguments) if arguments.kind() == "argument_list" => positional_args(arguments, source),
        // f(x for x in xs)
        Some(generator) => vec![lower_expr(generator, source)],
        None => vec![],
    };

    let start = call.start_position();
    Some(CallSite {
        name,
        line: start.row + 1,
        column: start.column,
        args,
    })
}

/// `name(...)` and `receiver.name(...)`; subscripts, lambdas and other computed
/// callees have no name
fn callee_name(function: Node, source: &str) -> Option<String> {
    match function.kind() {
        "identifier" => Some(node_text(function, source).to_string()),
        "attribute" => function
            .child_by_field_name("attribute")
            .map(|attr| node_text(attr, source).to_string()),
        _ => None,
    }
}

fn positional_args(arguments: Node, source: &str) -> Vec<ArgExpr> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat" | "comment"))
        .map(|arg| lower_expr(arg, source))
        .collect()
}

/// Lower a tree-sitter expression into the closed set of argument kinds
fn lower_expr(node: Node, source: &str) -> ArgExpr {
    match node.kind() {
        "identifier" => ArgExpr::Name(node_text(node, source).to_string()),
        "attribute" => match dotted_path(node, source) {
            Some(path) => ArgExpr::Attribute(path),
            None => ArgExpr::Other("Attribute".to_string()),
        },
        "string" | "concatenated_string" => string_literal(node, source),
        "integer" => numeric_literal(node, source, LiteralType::Int),
        "float" => numeric_literal(node, source, LiteralType::Float),
        "true" | "false" => ArgExpr::Literal(LiteralType::Bool),
        "none" => ArgExpr::Literal(LiteralType::NoneType),
        "ellipsis" => ArgExpr::Literal(LiteralType::Ellipsis),
        "list" => ArgExpr::List,
        "dictionary" => ArgExpr::Dict,
        "call" => ArgExpr::Call,
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|child| child.kind() != "comment");
            match inner {
                Some(inner) => lower_expr(inner, source),
                None => ArgExpr::Other("Tuple".to_string()),
            }
        }
        kind => ArgExpr::Other(ast_kind_name(kind).to_string()),
    }
}

/// `a.b.c` when the chain is rooted at a plain identifier
fn dotted_path(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "attribute" => {
            let object = dotted_path(node.child_by_field_name("object")?, source)?;
            let attribute = node.child_by_field_name("attribute")?;
            Some(format!("{}.{}", object, node_text(attribute, source)))
        }
        _ => None,
    }
}

fn string_literal(node: Node, source: &str) -> ArgExpr {
    let text = node_text(node, source);
    // 'a' f'{b}' is a JoinedStr, 'a' 'b' a str
    let prefixes: Vec<String> = if node.kind() == "concatenated_string" {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|part| part.kind() == "string")
            .map(|part| string_prefix(node_text(part, source)))
            .collect()
    } else {
        vec![string_prefix(text)]
    };

    if prefixes.iter().any(|p| p.contains('f')) {
        ArgExpr::Other("JoinedStr".to_string())
    } else if prefixes.iter().any(|p| p.contains('b')) {
        ArgExpr::Literal(LiteralType::Bytes)
    } else {
        ArgExpr::Literal(LiteralType::Str)
    }
}

fn string_prefix(text: &str) -> String {
    text.chars()
        .take_while(|c| *c != '"' && *c != '\'')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn numeric_literal(node: Node, source: &str, base: LiteralType) -> ArgExpr {
    if node_text(node, source).ends_with(['j', 'J']) {
        ArgExpr::Literal(LiteralType::Complex)
    } else {
        ArgExpr::Literal(base)
    }
}

/// Python AST class name for a tree-sitter node kind, falling back to the kind itself
fn ast_kind_name(kind: &str) -> &str {
    match kind {
        "binary_operator" => "BinOp",
        "boolean_operator" => "BoolOp",
        "comparison_operator" => "Compare",
        "not_operator" | "unary_operator" => "UnaryOp",
        "subscript" => "Subscript",
        "lambda" => "Lambda",
        "conditional_expression" => "IfExp",
        "await" => "Await",
        "tuple" => "Tuple",
        "set" => "Set",
        "list_comprehension" => "ListComp",
        "set_comprehension" => "SetComp",
        "dictionary_comprehension" => "DictComp",
        "generator_expression" => "GeneratorExp",
        "list_splat" => "Starred",
        "named_expression" => "NamedExpr",
        "yield" => "Yield",
        other => other,
    }
}

fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    'walk: loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // Only descend into subtrees that contain the error
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    None
}

/// Extract text content of a node
fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<CallSite> {
        let mut extractor = PythonCallExtractor::new().unwrap();
        extractor.extract_calls(source).unwrap()
    }

    fn names(calls: &[CallSite]) -> Vec<&str> {
        let mut names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_bare_and_attribute_callees() {
        let calls = extract("foo(1)\ndf.groupBy('a').agg(x)\n");
        assert_eq!(names(&calls), vec!["agg", "foo", "groupBy"]);

        let foo = calls.iter().find(|c| c.name == "foo").unwrap();
        assert_eq!(foo.line, 1);
        assert_eq!(foo.column, 0);
    }

    #[test]
    fn test_nested_calls_are_all_found() {
        let calls = extract("result = df.select(F.col(\"a\"), F.lit(1))\n");
        assert_eq!(names(&calls), vec!["col", "lit", "select"]);

        let select = calls.iter().find(|c| c.name == "select").unwrap();
        assert_eq!(select.args, vec![ArgExpr::Call, ArgExpr::Call]);
        assert_eq!(select.column, 9);
    }

    #[test]
    fn test_unnamed_callees_are_skipped() {
        let calls = extract("handlers[0](x)\n(lambda y: y)(2)\nget_fn()(3)\n");
        assert_eq!(names(&calls), vec!["get_fn"]);
    }

    #[test]
    fn test_calls_inside_definitions() {
        let source = "\
@udf(returnType=StringType())
def upper(s):
    return s.upper()

class Job:
    def run(self):
        self.spark.read.parquet(path)
";
        let calls = extract(source);
        assert_eq!(names(&calls), vec!["StringType", "parquet", "udf", "upper"]);

        let parquet = calls.iter().find(|c| c.name == "parquet").unwrap();
        assert_eq!(parquet.line, 7);
        assert_eq!(parquet.column, 8);
    }

    #[test]
    fn test_positional_arg_lowering() {
        let calls = extract(
            "f(x, a.b.c, 'lit', b'raw', 3, 2.5, 1j, True, None, ..., [1], {'k': v}, g(), a + b, *rest, key=1, **kw)\n",
        );
        assert_eq!(calls.iter().filter(|c| c.name == "f").count(), 1);
        let f = calls.iter().find(|c| c.name == "f").unwrap();
        assert_eq!(
            f.args,
            vec![
                ArgExpr::Name("x".to_string()),
                ArgExpr::Attribute("a.b.c".to_string()),
                ArgExpr::Literal(LiteralType::Str),
                ArgExpr::Literal(LiteralType::Bytes),
                ArgExpr::Literal(LiteralType::Int),
                ArgExpr::Literal(LiteralType::Float),
                ArgExpr::Literal(LiteralType::Complex),
                ArgExpr::Literal(LiteralType::Bool),
                ArgExpr::Literal(LiteralType::NoneType),
                ArgExpr::Literal(LiteralType::Ellipsis),
                ArgExpr::List,
                ArgExpr::Dict,
                ArgExpr::Call,
                ArgExpr::Other("BinOp".to_string()),
                ArgExpr::Other("Starred".to_string()),
            ]
        );
    }

    #[test]
    fn test_other_argument_kinds() {
        let calls = extract("f(f'{x}', 'a' 'b', (y), g().h, xs[0], (1, 2), lambda: 0)\nsum(v for v in vals)\n");
        let f = calls.iter().find(|c| c.name == "f").unwrap();
        assert_eq!(
            f.args,
            vec![
                ArgExpr::Other("JoinedStr".to_string()),
                ArgExpr::Literal(LiteralType::Str),
                ArgExpr::Name("y".to_string()),
                ArgExpr::Other("Attribute".to_string()),
                ArgExpr::Other("Subscript".to_string()),
                ArgExpr::Other("Tuple".to_string()),
                ArgExpr::Other("Lambda".to_string()),
            ]
        );

        let sum = calls.iter().find(|c| c.name == "sum").unwrap();
        assert_eq!(sum.args, vec![ArgExpr::Other("GeneratorExp".to_string())]);
    }

    #[test]
    fn test_syntax_error() {
        let mut extractor = PythonCallExtractor::new().unwrap();
        let result = extractor.extract_calls("def broken(:\n    foo(\n");
        assert!(matches!(result, Err(ApiScanError::Syntax(_))));
    }

    #[test]
    fn test_extractor_metadata() {
        let extractor = PythonCallExtractor::new().unwrap();
        assert_eq!(extractor.language_name(), "python");
        assert_eq!(extractor.file_extensions(), &["py"]);
    }

    #[test]
    fn test_empty_source() {
        assert!(extract("").is_empty());
        assert!(extract("# just a comment\nx = 1\n").is_empty());
    }
}
