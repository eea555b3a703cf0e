//! Core node types of the host type graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a type in a [`Compilation`](super::Compilation) arena.
///
/// Equality is identity: constructed generic types are interned, so two
/// handles are equal exactly when they name the same type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a method in a [`Compilation`](super::Compilation) arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MethodId(u32);

impl MethodId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Void,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Void => "void",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compile-time constant value of a type member (enum member or const field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

/// A positional or named argument of an applied attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArg {
    Int(i64),
    Bool(bool),
    Str(String),
    /// `typeof(T)`
    TypeOf(TypeId),
    /// Reference to a constant member, e.g. `StatusCodes.Status404NotFound`.
    Constant { owner: TypeId, member: String },
    /// Conversion of the inner argument, e.g. `(int)HttpStatusCode.NotFound`.
    Cast(Box<AttributeArg>),
}

/// An attribute applied to a type or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// The attribute class.
    pub class: TypeId,
    pub args: Vec<AttributeArg>,
    pub named: Vec<(String, AttributeArg)>,
}

impl AttributeData {
    pub fn new(class: TypeId, args: Vec<AttributeArg>) -> Self {
        Self {
            class,
            args,
            named: Vec::new(),
        }
    }

    /// Look up a named argument (case-insensitive).
    pub fn named_arg(&self, name: &str) -> Option<&AttributeArg> {
        self.named
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, arg)| arg)
    }
}

/// The symbol an attribute is declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOwner {
    Type(TypeId),
    Method(MethodId),
}

/// Stable reference to one applied attribute: its owner and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    pub owner: AttributeOwner,
    pub index: usize,
}

/// An attribute found by a hierarchy walk, with where it came from.
#[derive(Debug, Clone, Copy)]
pub struct AttributeHit<'a> {
    pub source: AttributeRef,
    pub data: &'a AttributeData,
}

/// Source location of a return statement or declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    /// 1-indexed, 0 when unknown.
    pub line: usize,
    /// 1-indexed, 0 when unknown.
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A location that points nowhere.
    pub fn none() -> Self {
        Self::default()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (0, _) => write!(f, "{}", self.file),
            (line, 0) => write!(f, "{}:{}", self.file, line),
            (line, col) => write!(f, "{}:{}:{}", self.file, line, col),
        }
    }
}

/// A `return` statement in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub location: Location,
    /// Static type of the returned expression; `None` for `null` or when the
    /// host could not bind the expression.
    pub expression_type: Option<TypeId>,
}

/// A method declared on a type.
#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub containing_type: TypeId,
    pub return_type: TypeId,
    pub attributes: Vec<AttributeData>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_override: bool,
    pub returns: Vec<ReturnStatement>,
    pub location: Location,
}

/// A type declaration, or a constructed instantiation of a generic one.
#[derive(Debug, Clone)]
pub struct TypeNode {
    /// Metadata name (``Task`1`` for generic definitions).
    pub name: String,
    pub kind: TypeKind,
    /// Number of type parameters of a generic definition.
    pub arity: usize,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub attributes: Vec<AttributeData>,
    pub constants: BTreeMap<String, ConstValue>,
    pub methods: Vec<MethodId>,
    /// Set for constructed types: the generic definition.
    pub definition: Option<TypeId>,
    /// Set for constructed types: the type arguments.
    pub type_args: Vec<TypeId>,
}

impl TypeNode {
    pub fn declaration(name: impl Into<String>, kind: TypeKind, arity: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            arity,
            base: None,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            constants: BTreeMap::new(),
            methods: Vec::new(),
            definition: None,
            type_args: Vec::new(),
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.definition.is_some()
    }
}
