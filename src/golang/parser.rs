//! Recursive-descent parser over the token stream.

use super::ast::{FieldDecl, File, OtherType, TypeExpr, TypeSpec};
use super::lexer::{Token, TokenKind};
use super::{Pos, SyntaxError};

pub struct Parser {
    tokens: Vec<Token>,
    idx: usize,
}

type PResult<T> = Result<T, SyntaxError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, idx: 0 }
    }

    pub fn parse_file(mut self) -> PResult<File> {
        self.skip_semicolons();
        self.expect(&TokenKind::Package)?;
        let package = self.expect_ident()?;
        self.expect_terminator()?;

        loop {
            self.skip_semicolons();
            if self.peek() != &TokenKind::Import { break; }
            self.bump();
            self.import_decl()?;
            self.expect_terminator()?;
        }

        let mut types = Vec::new();
        loop {
            self.skip_semicolons();
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Type => {
                    self.bump();
                    self.type_decl(&mut types)?;
                }
                TokenKind::Func => {
                    self.bump();
                    self.skip_func_decl()?;
                }
                TokenKind::Var | TokenKind::Const => {
                    self.bump();
                    self.skip_value_decl()?;
                }
                TokenKind::Import => {
                    return Err(self.error_here("imports must appear before other declarations"));
                }
                _ => return Err(self.unexpected("declaration")),
            }
            self.expect_terminator()?;
        }

        Ok(File { package, types })
    }

    // ------------------------------ Declarations ------------------------------ //

    fn import_decl(&mut self) -> PResult<()> {
        if self.eat(&TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.eat(&TokenKind::RParen) { return Ok(()); }
                self.import_spec()?;
                if self.peek() != &TokenKind::RParen {
                    self.expect(&TokenKind::Semicolon)?;
                }
            }
        }
        self.import_spec()
    }

    fn import_spec(&mut self) -> PResult<()> {
        if matches!(self.peek(), TokenKind::Ident(_) | TokenKind::Dot) {
            self.bump();
        }
        match self.peek() {
            TokenKind::Str { .. } => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn type_decl(&mut self, out: &mut Vec<TypeSpec>) -> PResult<()> {
        if self.eat(&TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.eat(&TokenKind::RParen) { return Ok(()); }
                out.push(self.type_spec()?);
                if self.peek() != &TokenKind::RParen {
                    self.expect(&TokenKind::Semicolon)?;
                }
            }
        }
        out.push(self.type_spec()?);
        Ok(())
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let pos = self.pos();
        let name = self.expect_ident()?;
        let generic = self.peek() == &TokenKind::LBracket && self.at_type_params();
        if generic {
            self.skip_balanced()?;
        }
        self.eat(&TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec { name, generic, ty, pos })
    }

    /// `[T any]` vs `[N]T` right after a type name.
    fn at_type_params(&self) -> bool {
        let Some(TokenKind::Ident(_)) = self.peek_at(1) else { return false };
        matches!(
            self.peek_at(2),
            Some(
                TokenKind::Ident(_)
                    | TokenKind::Comma
                    | TokenKind::Tilde
                    | TokenKind::LBracket
                    | TokenKind::Interface
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Func
                    | TokenKind::Struct
            )
        )
    }

    fn skip_func_decl(&mut self) -> PResult<()> {
        if self.peek() == &TokenKind::LParen {
            self.skip_balanced()?; // receiver
        }
        self.expect_ident()?;
        if self.peek() == &TokenKind::LBracket {
            self.skip_balanced()?; // type parameters
        }
        self.skip_signature()?;
        if self.peek() == &TokenKind::LBrace {
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn skip_value_decl(&mut self) -> PResult<()> {
        if self.peek() == &TokenKind::LParen {
            return self.skip_balanced();
        }
        loop {
            match self.peek() {
                TokenKind::Semicolon | TokenKind::Eof => return Ok(()),
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => self.skip_balanced()?,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    return Err(self.unexpected("expression"));
                }
                _ => self.bump(),
            }
        }
    }

    fn skip_signature(&mut self) -> PResult<()> {
        if self.peek() != &TokenKind::LParen {
            return Err(self.unexpected("'('"));
        }
        self.skip_balanced()?;
        match self.peek() {
            TokenKind::LParen => self.skip_balanced(),
            kind if starts_type(kind) => self.parse_type().map(|_| ()),
            _ => Ok(()),
        }
    }

    // --------------------------------- Types ---------------------------------- //

    pub fn parse_type(&mut self) -> PResult<TypeExpr> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                let ty = if self.eat(&TokenKind::Dot) {
                    let sel = self.expect_ident()?;
                    TypeExpr::Selector { package: name.clone(), name: sel }
                } else {
                    TypeExpr::Ident(name.clone())
                };
                if self.peek() == &TokenKind::LBracket {
                    self.skip_balanced()?; // type arguments
                    return Ok(TypeExpr::Other(OtherType::Instantiated));
                }
                Ok(ty)
            }
            TokenKind::Star => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBracket => {
                self.bump();
                if !self.eat(&TokenKind::RBracket) {
                    self.skip_array_length()?;
                }
                Ok(TypeExpr::Sequence(Box::new(self.parse_type()?)))
            }
            TokenKind::LParen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                Ok(ty)
            }
            TokenKind::Struct => {
                self.bump();
                self.struct_type()
            }
            TokenKind::Interface => {
                self.bump();
                if self.peek() != &TokenKind::LBrace {
                    return Err(self.unexpected("'{'"));
                }
                self.skip_balanced()?;
                Ok(TypeExpr::Other(OtherType::Interface))
            }
            TokenKind::Map => {
                self.bump();
                self.expect(&TokenKind::LBracket)?;
                self.parse_type()?;
                self.expect(&TokenKind::RBracket)?;
                self.parse_type()?;
                Ok(TypeExpr::Other(OtherType::Map))
            }
            TokenKind::Chan => {
                self.bump();
                self.eat(&TokenKind::Arrow);
                self.parse_type()?;
                Ok(TypeExpr::Other(OtherType::Chan))
            }
            TokenKind::Arrow => {
                self.bump();
                self.expect(&TokenKind::Chan)?;
                self.parse_type()?;
                Ok(TypeExpr::Other(OtherType::Chan))
            }
            TokenKind::Func => {
                self.bump();
                self.skip_signature()?;
                Ok(TypeExpr::Other(OtherType::Func))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// Consumes `N]` / `...]` after an opening bracket.
    fn skip_array_length(&mut self) -> PResult<()> {
        if self.eat(&TokenKind::Ellipsis) {
            return self.expect(&TokenKind::RBracket);
        }
        loop {
            match self.peek() {
                TokenKind::RBracket => {
                    self.bump();
                    return Ok(());
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_balanced()?,
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::RParen | TokenKind::RBrace => {
                    return Err(self.unexpected("array length"));
                }
                _ => self.bump(),
            }
        }
    }

    /// An unreadable field list is skipped to its closing brace. Unbalanced
    /// braces are still an error.
    fn struct_type(&mut self) -> PResult<TypeExpr> {
        let open = self.idx;
        match self.struct_fields() {
            Ok(fields) => Ok(TypeExpr::Struct(fields)),
            Err(err) => {
                self.idx = open;
                if self.peek() != &TokenKind::LBrace {
                    return Err(err);
                }
                match self.skip_balanced() {
                    Ok(()) => Ok(TypeExpr::Other(OtherType::MalformedStruct(err))),
                    Err(_) => Err(err),
                }
            }
        }
    }

    fn struct_fields(&mut self) -> PResult<Vec<FieldDecl>> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.eat(&TokenKind::RBrace) { return Ok(fields); }
            fields.push(self.field_decl()?);
            if self.peek() != &TokenKind::RBrace {
                self.expect(&TokenKind::Semicolon)?;
            }
        }
    }

    fn field_decl(&mut self) -> PResult<FieldDecl> {
        let (names, ty) = match self.peek() {
            TokenKind::Star => (Vec::new(), self.parse_type()?),
            TokenKind::Ident(_) => match self.peek_at(1) {
                Some(TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Str { .. } | TokenKind::Dot) => {
                    (Vec::new(), self.parse_type()?)
                }
                _ => {
                    let mut names = vec![self.expect_ident()?];
                    while self.eat(&TokenKind::Comma) {
                        names.push(self.expect_ident()?);
                    }
                    (names, self.parse_type()?)
                }
            },
            _ => return Err(self.unexpected("field name or embedded type")),
        };
        let tag = match self.peek() {
            TokenKind::Str { value, .. } => {
                let tag = value.clone();
                self.bump();
                Some(tag)
            }
            _ => None,
        };
        Ok(FieldDecl { names, ty, tag })
    }

    // -------------------------------- Helpers --------------------------------- //

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.idx.min(self.tokens.len() - 1)].kind
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.idx + offset).map(|t| &t.kind)
    }

    fn pos(&self) -> Pos {
        self.tokens[self.idx.min(self.tokens.len() - 1)].pos
    }

    fn bump(&mut self) {
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// A declaration ends at `;` (explicit or inserted) or end of file.
    fn expect_terminator(&mut self) -> PResult<()> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected("';' or newline")),
        }
    }

    fn skip_semicolons(&mut self) {
        while self.eat(&TokenKind::Semicolon) {}
    }

    /// Skips a bracketed region starting at the current opening delimiter,
    /// checking that nested delimiters pair up.
    fn skip_balanced(&mut self) -> PResult<()> {
        let mut stack: Vec<(TokenKind, Pos)> = Vec::new();
        loop {
            let pos = self.pos();
            match self.peek() {
                TokenKind::LParen => stack.push((TokenKind::RParen, pos)),
                TokenKind::LBrace => stack.push((TokenKind::RBrace, pos)),
                TokenKind::LBracket => stack.push((TokenKind::RBracket, pos)),
                closing @ (TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket) => {
                    match stack.pop() {
                        Some((expected, _)) if &expected == closing => {}
                        _ => return Err(SyntaxError::new(format!("unexpected {}", closing.describe()), pos)),
                    }
                }
                TokenKind::Eof => {
                    let open = stack.last().map(|(_, p)| *p).unwrap_or(pos);
                    return Err(SyntaxError::new("unclosed delimiter", open));
                }
                _ if stack.is_empty() => return Err(self.unexpected("opening delimiter")),
                _ => {}
            }
            self.bump();
            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::new(format!("expected {expected}, found {}", self.peek().describe()), self.pos())
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        SyntaxError::new(message, self.pos())
    }
}

fn starts_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Func
            | TokenKind::Arrow
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golang::parse_source;

    fn field_types(src: &str) -> Vec<(Vec<String>, TypeExpr)> {
        let file = parse_source(src).unwrap();
        match &file.types[0].ty {
            TypeExpr::Struct(fields) => fields.iter().map(|f| (f.names.clone(), f.ty.clone())).collect(),
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn parses_grouped_and_single_type_declarations() {
        let src = r#"
package handler

import (
	"encoding/json"
	"net/http"
)

type (
	// User represents a user
	User struct {
		ID    int    `json:"id"`
		Name  string `json:"name"`
	}
	Status string
)

type Alias = User
"#;
        let file = parse_source(src).unwrap();
        assert_eq!(file.package, "handler");
        let names: Vec<_> = file.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["User", "Status", "Alias"]);
        assert_eq!(file.types[2].ty, TypeExpr::Ident("User".into()));
        assert_eq!(file.types[1].ty, TypeExpr::Ident("string".into()));
    }

    #[test]
    fn field_types_keep_their_structure() {
        let fields = field_types(
            "package p\ntype T struct {\n A, B int\n When time.Time\n Next *T\n Tags []string\n Grid [3][]byte\n Meta map[string]any\n Done chan<- bool\n Hook func(int) error\n}\n",
        );
        assert_eq!(fields[0], (vec!["A".into(), "B".into()], TypeExpr::Ident("int".into())));
        assert_eq!(fields[1].1, TypeExpr::Selector { package: "time".into(), name: "Time".into() });
        assert_eq!(fields[2].1, TypeExpr::Pointer(Box::new(TypeExpr::Ident("T".into()))));
        assert_eq!(fields[3].1, TypeExpr::Sequence(Box::new(TypeExpr::Ident("string".into()))));
        assert_eq!(
            fields[4].1,
            TypeExpr::Sequence(Box::new(TypeExpr::Sequence(Box::new(TypeExpr::Ident("byte".into())))))
        );
        assert_eq!(fields[5].1, TypeExpr::Other(OtherType::Map));
        assert_eq!(fields[6].1, TypeExpr::Other(OtherType::Chan));
        assert_eq!(fields[7].1, TypeExpr::Other(OtherType::Func));
    }

    #[test]
    fn embedded_fields_have_no_names() {
        let fields = field_types("package p\ntype T struct {\n Base\n *pkg.Other `json:\"other\"`\n Name string\n}\n");
        assert!(fields[0].0.is_empty());
        assert!(fields[1].0.is_empty());
        assert_eq!(fields[2].0, vec!["Name".to_string()]);
    }

    #[test]
    fn skips_functions_vars_and_consts() {
        let src = r#"package p

const limit = 10

var (
	defaultUser = User{Name: "x"}
	seen        = map[string]bool{}
)

func (u *User) Greet() (string, error) {
	if u == nil {
		return "", nil
	}
	return "hi " + u.Name, nil
}

func New() struct{ X int } { return struct{ X int }{} }

type User struct {
	Name string
}
"#;
        let file = parse_source(src).unwrap();
        assert_eq!(file.types.len(), 1);
        assert_eq!(file.types[0].name, "User");
    }

    #[test]
    fn generic_declarations_are_flagged() {
        let file = parse_source("package p\ntype Page[T any] struct { Items []T }\ntype Buf [4]byte\n").unwrap();
        assert!(file.types[0].generic);
        assert!(!file.types[1].generic);
        assert!(matches!(file.types[1].ty, TypeExpr::Sequence(_)));
    }

    #[test]
    fn unbalanced_function_body_is_a_syntax_error() {
        let err = parse_source("package p\nfunc f() {\n if true {\n}\n").unwrap_err();
        assert!(err.message.contains("unclosed"), "{err}");
    }

    #[test]
    fn missing_package_clause_is_a_syntax_error() {
        let err = parse_source("type A struct{}").unwrap_err();
        assert_eq!(err.pos, Pos { line: 1, column: 1 });
    }

    #[test]
    fn bad_field_list_is_skipped_to_its_closing_brace() {
        let file = parse_source("package p\ntype A struct {\n Name string string\n Inner struct { X int }\n}\ntype B struct { Y int }\n").unwrap();
        let TypeExpr::Other(OtherType::MalformedStruct(err)) = &file.types[0].ty else {
            panic!("expected a malformed struct, got {:?}", file.types[0].ty)
        };
        assert_eq!(err.pos.line, 3);
        assert!(matches!(file.types[1].ty, TypeExpr::Struct(ref f) if f.len() == 1));
    }

    #[test]
    fn unclosed_struct_is_still_a_syntax_error() {
        assert!(parse_source("package p\ntype A struct {\n Name string string\n").is_err());
    }

    #[test]
    fn generic_instantiations_are_opaque() {
        let fields = field_types("package p\ntype T struct {\n Page Page[User]\n}\n");
        assert_eq!(fields[0].1, TypeExpr::Other(OtherType::Instantiated));
    }
}
