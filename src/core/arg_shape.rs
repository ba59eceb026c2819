//! Argument shape classification
//!
//! Positional arguments are lowered by the language extractor into [`ArgExpr`],
//! a closed set of the expression kinds the report cares about. Classification
//! turns each one into a descriptor that keeps the call's shape but never the
//! literal values passed to it.

use serde::{Deserialize, Serialize};

/// Runtime type of a literal constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralType {
    Str,
    Bytes,
    Int,
    Float,
    Complex,
    Bool,
    NoneType,
    Ellipsis,
}

impl LiteralType {
    /// Bare Python type name, without the `builtins.` qualifier
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralType::Str => "str",
            LiteralType::Bytes => "bytes",
            LiteralType::Int => "int",
            LiteralType::Float => "float",
            LiteralType::Complex => "complex",
            LiteralType::Bool => "bool",
            LiteralType::NoneType => "NoneType",
            LiteralType::Ellipsis => "ellipsis",
        }
    }
}

/// A positional argument expression, reduced to what classification needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgExpr {
    /// Plain identifier
    Name(String),
    /// Dotted attribute chain rooted at an identifier, e.g. `a.b.c`
    Attribute(String),
    Literal(LiteralType),
    List,
    Dict,
    /// Nested call expression
    Call,
    /// Any other expression, carrying its node kind name
    Other(String),
}

impl ArgExpr {
    pub fn descriptor(&self) -> String {
        match self {
            ArgExpr::Name(name) => name.clone(),
            ArgExpr::Attribute(path) => path.clone(),
            ArgExpr::Literal(literal) => literal.type_name().to_string(),
            ArgExpr::List => "list".to_string(),
            ArgExpr::Dict => "dict".to_string(),
            ArgExpr::Call => "Call".to_string(),
            ArgExpr::Other(kind) => kind.clone(),
        }
    }
}

/// One descriptor per positional argument, in call order
pub fn classify(args: &[ArgExpr]) -> Vec<String> {
    args.iter().map(ArgExpr::descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_preserves_order_and_shape() {
        let args = vec![
            ArgExpr::Name("df".to_string()),
            ArgExpr::Attribute("F.col".to_string()),
            ArgExpr::Literal(LiteralType::Str),
            ArgExpr::Literal(LiteralType::Int),
            ArgExpr::List,
            ArgExpr::Dict,
            ArgExpr::Call,
            ArgExpr::Other("BinOp".to_string()),
        ];

        assert_eq!(
            classify(&args),
            vec!["df", "F.col", "str", "int", "list", "dict", "Call", "BinOp"]
        );
    }

    #[test]
    fn test_literal_type_names_are_unqualified() {
        assert_eq!(LiteralType::NoneType.type_name(), "NoneType");
        assert_eq!(LiteralType::Bool.type_name(), "bool");
        assert!(!LiteralType::Str.type_name().contains('.'));
    }

    #[test]
    fn test_classify_empty() {
        assert!(classify(&[]).is_empty());
    }
}
