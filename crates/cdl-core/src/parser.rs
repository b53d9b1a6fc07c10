//! CDL Parser — recursive descent over the token stream
//!
//! Converts a token sequence into contract AST nodes. The grammar:
//!
//! ```text
//! TYPE_OR_EXPRESSION := tokens up to first unmatched ')' ']' '}' or '>'
//! STATEMENT          := tokens up to a top-level ';'
//! BLOCK              := '{' STATEMENT* '}'
//! TYPE               := ID TYPE_END
//! TYPE_END           := ε | '::' TYPE | '<' TYPE_OR_EXPRESSION '>' TYPE_END
//! DECLARE            := TYPE ID
//! FUNCTION           := DECLARE '(' PARAMS ')'
//! MEMBER             := DECLARE ';'
//!                     | FUNCTION BLOCK
//!                     | FUNCTION ATTR* '=' ('required'|'default') ';'
//!                     | 'using' ID '=' TYPE ';'
//! CONTRACT           := 'contract' ID ':' ID '{' MEMBER* '}' ';'
//! ```
//!
//! Disambiguation uses one token of lookahead plus the balanced-span
//! scanner's bracket stack. `<` is a generic-argument opener only while a
//! generic-argument list is being scanned; everywhere else it is a plain
//! comparison character. This context sensitivity is deliberate — the
//! grammar relies on the caller knowing which scanner is active, not on
//! lookahead past the `<`.
//!
//! Cursor positions are threaded explicitly: every scanner takes a position
//! and returns the new one alongside its product, so scanners compose and
//! test in isolation. Errors are typed (`Error::Grammar`) and fail-fast:
//! the first violation aborts the parse with no partial tree.

use std::collections::BTreeSet;

use crate::ast::{AssociatedType, AstNode, Contract, DataMember, MethodDecl};
use crate::error::{Error, Expected, Result};
use crate::tokenizer::{self, Token, TokenKind};

/// Parse CDL source text into its top-level contract nodes, in order.
pub fn parse(input: &str) -> Result<Vec<AstNode>> {
    let tokens = tokenizer::tokenize(input);
    let parser = Parser::new(&tokens);
    let (_pos, contracts) = parser.parse_top(0)?;
    Ok(contracts)
}

/// Recursive descent parser over a borrowed token sequence
pub struct Parser<'a> {
    tokens: &'a [Token],
    debug: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            debug: false,
        }
    }

    /// Echo each recognized construct to stderr. Development aid only;
    /// has no effect on parse results.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn trace(&self, msg: String) {
        if self.debug {
            eprintln!("DEBUG: {}", msg);
        }
    }

    // ── Cursor helpers ─────────────────────────────────────
    //
    // Side-effect free; the caller decides when to advance.

    pub fn has_token(&self, pos: usize) -> bool {
        pos < self.tokens.len()
    }

    pub fn is_id(&self, pos: usize) -> bool {
        self.has_token(pos) && self.tokens[pos].kind == TokenKind::Identifier
    }

    pub fn is_number(&self, pos: usize) -> bool {
        self.has_token(pos) && self.tokens[pos].kind == TokenKind::Number
    }

    pub fn is_string(&self, pos: usize) -> bool {
        self.has_token(pos) && self.tokens[pos].kind == TokenKind::Str
    }

    /// The single character of an "other" token, or `'\0'` otherwise.
    pub fn as_char(&self, pos: usize) -> char {
        if self.has_token(pos) && self.tokens[pos].kind == TokenKind::Other {
            return self.tokens[pos].lexeme.chars().next().unwrap_or('\0');
        }
        '\0'
    }

    /// The lexeme at `pos`, or the empty string when out of range.
    pub fn as_lexeme(&self, pos: usize) -> &str {
        if self.has_token(pos) {
            &self.tokens[pos].lexeme
        } else {
            ""
        }
    }

    fn concat_lexemes(&self, start_pos: usize, end_pos: usize) -> String {
        let end_pos = end_pos.min(self.tokens.len());
        if start_pos >= end_pos {
            return String::new();
        }
        self.tokens[start_pos..end_pos]
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ── Require checks ─────────────────────────────────────
    //
    // Every grammar rule asserts its expectation before consuming.

    pub fn require_id(&self, pos: usize, error_msg: impl Into<String>) -> Result<()> {
        if !self.is_id(pos) {
            return Err(Error::grammar(error_msg, pos, Expected::Identifier));
        }
        Ok(())
    }

    pub fn require_number(&self, pos: usize, error_msg: impl Into<String>) -> Result<()> {
        if !self.is_number(pos) {
            return Err(Error::grammar(error_msg, pos, Expected::Number));
        }
        Ok(())
    }

    pub fn require_string(&self, pos: usize, error_msg: impl Into<String>) -> Result<()> {
        if !self.is_string(pos) {
            return Err(Error::grammar(error_msg, pos, Expected::Str));
        }
        Ok(())
    }

    pub fn require_char(
        &self,
        req_char: char,
        pos: usize,
        error_msg: impl Into<String>,
    ) -> Result<()> {
        if self.as_char(pos) != req_char {
            return Err(Error::grammar(error_msg, pos, Expected::Char(req_char)));
        }
        Ok(())
    }

    pub fn require_lexeme(
        &self,
        req_str: &str,
        pos: usize,
        error_msg: impl Into<String>,
    ) -> Result<()> {
        if self.as_lexeme(pos) != req_str {
            return Err(Error::grammar(
                error_msg,
                pos,
                Expected::Lexeme(req_str.to_string()),
            ));
        }
        Ok(())
    }

    // ── Balanced-span scanner ──────────────────────────────

    /// Collect a span of code, ending at a top-level semicolon OR an
    /// unmatched close bracket.
    ///
    /// Always stops at an unmatched ')', '}' or ']', leaving the closer for
    /// the caller to consume. If `match_angle` is set, '<'/'>' are treated
    /// as a bracket pair too (generic-argument lists only; elsewhere they
    /// are comparison characters). If `multi_line` is set, semicolons do
    /// not terminate the scan (multi-statement bodies).
    ///
    /// A terminating semicolon is consumed but excluded from the returned
    /// text. The bracket stack is empty at every return.
    pub fn scan_code(&self, mut pos: usize, match_angle: bool, multi_line: bool) -> (usize, String) {
        let start_pos = pos;
        let mut open_symbols: Vec<char> = Vec::new();
        let mut text_end = None;

        while text_end.is_none() && self.has_token(pos) {
            let cur_char = self.as_char(pos);
            pos += 1;
            match cur_char {
                ';' => {
                    if !multi_line && open_symbols.is_empty() {
                        text_end = Some(pos - 1); // consume, but keep out of the text
                    }
                }
                '<' | '>' if !match_angle => {}
                '(' | '[' | '{' | '<' => {
                    // TODO: record which bracket opened so a mismatched
                    // closer (']' against '(') can be rejected.
                    open_symbols.push(cur_char);
                }
                ')' | ']' | '}' | '>' => {
                    if open_symbols.pop().is_none() {
                        // Unmatched closer: leave it for the caller.
                        pos -= 1;
                        text_end = Some(pos);
                    }
                }
                _ => {}
            }
        }

        let text = self.concat_lexemes(start_pos, text_end.unwrap_or(pos));
        (pos, text)
    }

    // ── Type-expression scanner ────────────────────────────

    /// Collect all tokens used to describe a type; returns the literal
    /// concatenated text. No semantic resolution is attempted.
    pub fn scan_type(&self, mut pos: usize) -> Result<(usize, String)> {
        let start_pos = pos;

        // A type may start with a qualifier.
        if self.as_lexeme(pos) == "const" {
            pos += 1;
        }

        // The identifier, with possible "::" requiring another one.
        let mut need_id = true;
        while need_id {
            if self.as_lexeme(pos) == "typename" {
                pos += 1;
            }
            if self.as_lexeme(pos) == "template" {
                pos += 1;
            }

            self.require_id(
                pos,
                format!("Expecting type, but found '{}'.", self.as_lexeme(pos)),
            )?;
            pos += 1;
            need_id = false;

            // Generic arguments: only here is '<' a bracket.
            if self.as_lexeme(pos) == "<" {
                let (new_pos, _args) = self.scan_code(pos + 1, true, false);
                pos = new_pos;
                self.require_char(
                    '>',
                    pos,
                    "Generic argument lists must end in a close angle bracket ('>').",
                )?;
                pos += 1;
            }

            if self.as_lexeme(pos) == "::" {
                pos += 1;
                need_id = true;
            }
        }

        // A type may end in a reference or pointer suffix.
        if self.as_lexeme(pos) == "&" {
            pos += 1;
        }
        if self.as_lexeme(pos) == "*" {
            pos += 1;
        }

        Ok((pos, self.concat_lexemes(start_pos, pos)))
    }

    // ── Identifier-list scanner ────────────────────────────

    /// Collect a run of consecutive identifiers (method attributes such as
    /// `const`). Duplicates collapse; order is not significant.
    pub fn scan_id_list(&self, mut pos: usize) -> (usize, BTreeSet<String>) {
        let mut ids = BTreeSet::new();
        while self.is_id(pos) {
            ids.insert(self.as_lexeme(pos).to_string());
            pos += 1;
        }
        (pos, ids)
    }

    // ── Grammar drivers ────────────────────────────────────

    /// Process tokens from the outer-most scope. Returns the final cursor
    /// position and the contract nodes in declaration order.
    pub fn parse_top(&self, mut pos: usize) -> Result<(usize, Vec<AstNode>)> {
        let mut contracts = Vec::new();

        while self.has_token(pos) {
            self.require_id(
                pos,
                "Statements in outer scope must begin with an identifier or keyword.",
            )?;

            if self.as_lexeme(pos) == "contract" {
                let (new_pos, contract) = self.parse_contract(pos + 1)?;
                pos = new_pos;
                contracts.push(AstNode::Contract(contract));
            } else {
                // The grammar recognizes exactly one top-level construct.
                return Err(Error::grammar(
                    format!("Unknown keyword '{}'.", self.as_lexeme(pos)),
                    pos,
                    Expected::Lexeme("contract".to_string()),
                ));
            }
        }

        Ok((pos, contracts))
    }

    /// We know we are in a contract definition; collect its header and
    /// members. `pos` is the token after the `contract` keyword.
    pub fn parse_contract(&self, mut pos: usize) -> Result<(usize, Contract)> {
        // A contract must begin with its name.
        self.require_id(pos, "Contract declaration must be followed by name identifier.")?;
        let name = self.as_lexeme(pos).to_string();
        pos += 1;

        // Next, must be a colon...
        self.require_char(':', pos, "Contract names must be followed by a colon (':').")?;
        pos += 1;

        // And then a base-type name.
        self.require_id(pos, "Contract declaration must include name of base type.")?;
        let base_name = self.as_lexeme(pos).to_string();
        pos += 1;

        let mut contract = Contract::new(name, base_name);
        self.trace(format!(
            "Defining contract '{}' with base type '{}'.",
            contract.name, contract.base_name
        ));

        // Next, must be an open brace...
        self.require_char('{', pos, "Contracts must be defined in braces ('{' and '}').")?;
        pos += 1;

        // Loop through the full definition, incorporating each member.
        while self.as_char(pos) != '}' {
            self.require_id(
                pos,
                "Contract members can be methods, data members, or using-statements.",
            )?;

            if self.as_lexeme(pos) == "using" {
                pos = self.parse_associated_type(pos + 1, &mut contract)?;
            } else {
                pos = self.parse_declared_member(pos, &mut contract)?;
            }
        }

        pos += 1; // Skip closing brace.
        self.require_char(';', pos, "Contract definitions must end in a semi-colon.")?;
        pos += 1;

        Ok((pos, contract))
    }

    /// `using ID = <default code> ;` — an associated-type placeholder.
    /// `pos` is the token after the `using` keyword.
    fn parse_associated_type(&self, mut pos: usize, contract: &mut Contract) -> Result<usize> {
        self.require_id(pos, "A 'using' statement must first specify the new type name.")?;

        let (new_pos, type_name) = self.scan_type(pos)?;
        pos = new_pos;
        self.trace(format!("...adding a type '{}'.", type_name));

        self.require_char(
            '=',
            pos,
            "A using statement must provide an equals ('=') to assign the type.",
        )?;
        pos += 1;

        let (new_pos, default_code) = self.scan_code(pos, false, false);
        pos = new_pos;
        self.trace(format!("   value: {}", default_code));

        contract.add_member(AstNode::AssociatedType(AssociatedType {
            type_name,
            default_code,
        }));
        Ok(pos)
    }

    /// `TYPE ID ...` — a method declaration if '(' follows the identifier,
    /// otherwise a data member.
    fn parse_declared_member(&self, mut pos: usize, contract: &mut Contract) -> Result<usize> {
        // Start with a type...
        let (new_pos, type_name) = self.scan_type(pos)?;
        pos = new_pos;

        // Then an identifier.
        self.require_id(
            pos,
            "Methods and data members in a contract definition must provide an identifier after the type name.",
        )?;
        let identifier = self.as_lexeme(pos).to_string();
        pos += 1;

        if self.as_char(pos) == '(' {
            pos = self.parse_method(pos + 1, type_name, identifier, contract)?;
        } else {
            pos = self.parse_data_member(pos, type_name, identifier, contract)?;
        }
        Ok(pos)
    }

    /// Method member; `pos` is the token after the open parenthesis.
    fn parse_method(
        &self,
        mut pos: usize,
        return_type: String,
        method_name: String,
        contract: &mut Contract,
    ) -> Result<usize> {
        let mut method = MethodDecl::new(return_type, method_name);

        // Read the arguments for this method.
        let (new_pos, args) = self.scan_code(pos, false, false);
        method.argument_text = args;
        pos = new_pos;

        self.require_char(
            ')',
            pos,
            "Method arguments must end with a close-parenthesis (')').",
        )?;
        pos += 1;

        self.trace(format!(
            "...adding a method '{} {}({})'",
            method.return_type, method.method_name, method.argument_text
        ));

        // Read in each of the method attributes, if any.
        let (new_pos, attributes) = self.scan_id_list(pos);
        method.attributes = attributes;
        pos = new_pos;
        self.trace(format!("   with attributes: {}", method.attribute_string()));

        let next_char = self.as_char(pos);
        pos += 1;

        if next_char == '=' {
            // Method is "= required;" or "= default;"
            self.require_id(pos, "Method must be assigned to 'required' or 'default'.")?;
            let marker = self.as_lexeme(pos).to_string();
            pos += 1;

            match marker.as_str() {
                "required" => method.is_required = true,
                "default" => method.is_default = true,
                _ => {
                    return Err(Error::grammar(
                        "Methods can only be set to 'required' or 'default'.",
                        pos - 1,
                        Expected::Lexeme("required".to_string()),
                    ));
                }
            }

            self.require_char(
                ';',
                pos,
                format!("'{}' methods must end in a semi-colon.", marker),
            )?;
            pos += 1;
        } else if next_char == '{' {
            // Method is defined in place; read the default body.
            let (new_pos, body) = self.scan_code(pos, false, true);
            method.default_code = body;
            pos = new_pos;
            self.trace(format!("   and code: {}", method.default_code));

            self.require_char(
                '}',
                pos,
                format!(
                    "Method body must end with close brace ('}}') not '{}'.",
                    self.as_lexeme(pos)
                ),
            )?;
            pos += 1;
        } else {
            return Err(Error::grammar(
                "Method body must begin with open brace or assignment ('{' or '=').",
                pos - 1,
                Expected::Construct,
            ));
        }

        contract.add_member(AstNode::MethodDecl(method));
        Ok(pos)
    }

    /// Data member: either terminated immediately by ';' or followed by a
    /// default-value expression (the '=' stays in the captured text).
    fn parse_data_member(
        &self,
        mut pos: usize,
        var_type: String,
        var_name: String,
        contract: &mut Contract,
    ) -> Result<usize> {
        let mut member = DataMember {
            var_type,
            var_name,
            default_code: String::new(),
        };

        if self.as_char(pos) == ';' {
            pos += 1;
        } else {
            let (new_pos, default_code) = self.scan_code(pos, false, false);
            member.default_code = default_code;
            pos = new_pos;
        }
        self.trace(format!(
            "...adding a data member '{} {}'.",
            member.var_type, member.var_name
        ));

        contract.add_member(AstNode::DataMember(member));
        Ok(pos)
    }
}
