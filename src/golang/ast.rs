// Syntax tree for the parts of a Go file we read. Everything that is not a
// type declaration is validated and dropped by the parser.

use super::{Pos, SyntaxError};

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: String,
    /// Top-level type specs in source order (grouped specs flattened).
    pub types: Vec<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    /// Declared with a type parameter list (`type Page[T any] struct {...}`).
    pub generic: bool,
    pub ty: TypeExpr,
    pub pos: Pos,
}

impl TypeSpec {
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Empty for embedded fields.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Decoded tag literal, e.g. `json:"id,omitempty"`.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `string`, `User`
    Ident(String),
    /// `time.Time`
    Selector { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T` and `[N]T`
    Sequence(Box<TypeExpr>),
    /// `struct { ... }`
    Struct(Vec<FieldDecl>),
    /// map, chan, func, interface, generic instantiations and unreadable structs
    Other(OtherType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherType {
    Map,
    Chan,
    Func,
    Interface,
    Instantiated,
    /// `struct { ... }` whose field list did not parse; skipped up to its
    /// closing brace.
    MalformedStruct(SyntaxError),
}

/// A bottom-up view over a [`TypeExpr`].
///
/// Pointer and sequence arms receive the already folded inner type, so each
/// implementation only describes one level of structure.
pub trait TypeFold {
    type Out;
    fn ident(&self, name: &str) -> Self::Out;
    fn selector(&self, package: &str, name: &str) -> Self::Out;
    fn pointer(&self, inner: Self::Out) -> Self::Out;
    fn sequence(&self, elem: Self::Out) -> Self::Out;
    fn other(&self, ty: &TypeExpr) -> Self::Out;
}

impl TypeExpr {
    pub fn fold<F: TypeFold>(&self, f: &F) -> F::Out {
        match self {
            TypeExpr::Ident(name) => f.ident(name),
            TypeExpr::Selector { package, name } => f.selector(package, name),
            TypeExpr::Pointer(inner) => {
                let inner = inner.fold(f);
                f.pointer(inner)
            }
            TypeExpr::Sequence(elem) => {
                let elem = elem.fold(f);
                f.sequence(elem)
            }
            TypeExpr::Struct(_) | TypeExpr::Other(_) => f.other(self),
        }
    }
}
