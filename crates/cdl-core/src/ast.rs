//! CDL AST — syntax tree node definitions
//!
//! The tree is a single-owner hierarchy: every parent exclusively owns its
//! children (`Vec<AstNode>` / `Box<AstNode>`), there are no back-references
//! and no sharing. Nodes are attached to their parent as soon as the parser
//! recognizes them and are not mutated afterwards.
//!
//! The node variants form a closed sum type so the emission stage can match
//! exhaustively instead of downcasting.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One syntax tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AstNode {
    /// Passthrough text that is echoed verbatim by the emission stage
    OpaqueCode(OpaqueCode),
    /// Ordered statement sequence (reserved for future body analysis;
    /// today bodies are captured opaquely)
    Block(Block),
    /// Free-standing type alias
    TypeAlias(TypeAlias),
    /// Variable declaration with an optional initializer
    DataDeclare(DataDeclare),
    /// Top-level contract definition
    Contract(Contract),
    /// Contract-scoped type placeholder with a default
    AssociatedType(AssociatedType),
    /// Contract-scoped field with an optional default expression
    DataMember(DataMember),
    /// Contract-scoped method signature
    MethodDecl(MethodDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<AstNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub alias_name: String,
    pub target_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDeclare {
    pub var_name: String,
    /// Initializer expression, an `OpaqueCode` node when present
    pub init: Option<Box<AstNode>>,
}

/// Full contract definition: name, base type, and members in declaration
/// order. Order is load-bearing — the emission stage must reproduce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub base_name: String,
    /// AssociatedType, DataMember, or MethodDecl nodes
    pub members: Vec<AstNode>,
}

impl Contract {
    pub fn new(name: impl Into<String>, base_name: impl Into<String>) -> Self {
        Contract {
            name: name.into(),
            base_name: base_name.into(),
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, member: AstNode) {
        self.members.push(member);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedType {
    pub type_name: String,
    pub default_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMember {
    pub var_type: String,
    pub var_name: String,
    /// Empty when the declaration ends at `;` with no default
    pub default_code: String,
}

/// Method signature within a contract.
///
/// Exactly one of `is_required`/`is_default` is true for marker forms
/// (`= required;` / `= default;`); both are false when an inline body was
/// supplied, in which case `default_code` holds the body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub return_type: String,
    pub method_name: String,
    pub argument_text: String,
    /// Method qualifiers such as `const`; unique, order-insensitive
    pub attributes: BTreeSet<String>,
    pub default_code: String,
    pub is_required: bool,
    pub is_default: bool,
}

impl MethodDecl {
    pub fn new(return_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        MethodDecl {
            return_type: return_type.into(),
            method_name: method_name.into(),
            argument_text: String::new(),
            attributes: BTreeSet::new(),
            default_code: String::new(),
            is_required: false,
            is_default: false,
        }
    }

    /// Attributes joined for emission, e.g. `const noexcept`.
    pub fn attribute_string(&self) -> String {
        self.attributes
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_members_keep_declaration_order() {
        let mut contract = Contract::new("Vehicle", "VehicleBase");
        contract.add_member(AstNode::MethodDecl(MethodDecl::new("bool", "CanFly")));
        contract.add_member(AstNode::DataMember(DataMember {
            var_type: "double".into(),
            var_name: "speed".into(),
            default_code: String::new(),
        }));
        contract.add_member(AstNode::AssociatedType(AssociatedType {
            type_name: "fuel_type".into(),
            default_code: "0".into(),
        }));

        let names: Vec<&str> = contract
            .members
            .iter()
            .map(|m| match m {
                AstNode::MethodDecl(f) => f.method_name.as_str(),
                AstNode::DataMember(v) => v.var_name.as_str(),
                AstNode::AssociatedType(t) => t.type_name.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(names, vec!["CanFly", "speed", "fuel_type"]);
    }

    #[test]
    fn test_attribute_string_is_sorted_and_deduplicated() {
        let mut method = MethodDecl::new("void", "Update");
        method.attributes.insert("noexcept".into());
        method.attributes.insert("const".into());
        method.attributes.insert("const".into());
        assert_eq!(method.attribute_string(), "const noexcept");
    }

    #[test]
    fn test_data_declare_owns_initializer() {
        let node = AstNode::DataDeclare(DataDeclare {
            var_name: "speed".into(),
            init: Some(Box::new(AstNode::OpaqueCode(OpaqueCode {
                code: "= 0".into(),
            }))),
        });
        match node {
            AstNode::DataDeclare(decl) => {
                assert_eq!(decl.var_name, "speed");
                assert!(matches!(
                    decl.init.as_deref(),
                    Some(AstNode::OpaqueCode(_))
                ));
            }
            _ => panic!("expected DataDeclare"),
        }
    }

    #[test]
    fn test_block_holds_statements_in_order() {
        let block = Block {
            statements: vec![
                AstNode::OpaqueCode(OpaqueCode {
                    code: "speed = 0".into(),
                }),
                AstNode::OpaqueCode(OpaqueCode {
                    code: "return speed".into(),
                }),
            ],
        };
        assert_eq!(block.statements.len(), 2);
    }

    #[test]
    fn test_ast_serialization_round_trip() {
        let mut contract = Contract::new("Vehicle", "VehicleBase");
        let mut method = MethodDecl::new("double", "SetSpeed");
        method.argument_text = "double speed".into();
        method.is_required = true;
        contract.add_member(AstNode::MethodDecl(method));
        contract.add_member(AstNode::TypeAlias(TypeAlias {
            alias_name: "speed_t".into(),
            target_type: "double".into(),
        }));

        let node = AstNode::Contract(contract);
        let json = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
