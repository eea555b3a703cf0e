//! Loading compilation models from YAML or JSON files.
//!
//! A model file describes types, their attributes, constants and methods
//! (with the static types of their return statements). Loading runs in two
//! phases: every type name across every file is declared first, then all
//! references are resolved. Files may therefore reference each other in
//! any order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{
    parse_type_expr, AttributeArg, AttributeData, Compilation, ConstValue, Location,
    MethodSymbol, ReturnStatement, TypeExpr, TypeId, TypeKind,
};

/// Errors raised while loading a compilation model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML model {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid JSON model {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("duplicate type `{0}`")]
    DuplicateType(String),
    #[error("unknown type `{name}` referenced by {context}")]
    UnknownType { name: String, context: String },
    #[error("invalid type expression `{expr}`: {reason}")]
    InvalidTypeExpr { expr: String, reason: String },
    #[error("type `{name}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid constant reference `{0}`, expected `Owner.Member`")]
    InvalidConstantRef(String),
    #[error("base type cycle involving `{0}`")]
    BaseCycle(String),
}

/// Top-level model file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelFile {
    /// Source file used for locations that don't name one.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

/// A type declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Type parameter names; a non-empty list makes this a generic definition.
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub constants: BTreeMap<String, ConstDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl TypeDef {
    /// Metadata name: ``Task`1`` for `name: Task` with one type parameter.
    pub fn metadata_name(&self) -> String {
        if self.type_params.is_empty() || self.name.contains('`') {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.type_params.len())
        }
    }

    fn arity(&self) -> usize {
        if !self.type_params.is_empty() {
            return self.type_params.len();
        }
        self.name
            .rsplit_once('`')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }
}

/// An applied attribute.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub class: String,
    #[serde(default)]
    pub args: Vec<ArgDef>,
    #[serde(default)]
    pub named: BTreeMap<String, ArgDef>,
}

/// An attribute argument: `400`, `true`, `"text"`, `{typeof: Pet}`,
/// `{constant: StatusCodes.Status404NotFound}` or `{cast: <arg>}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ArgDef {
    Int(i64),
    Bool(bool),
    Str(String),
    TypeOf {
        #[serde(rename = "typeof")]
        type_of: String,
    },
    Constant {
        constant: String,
    },
    Cast {
        cast: Box<ArgDef>,
    },
}

/// A constant member value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConstDef {
    Int(i64),
    Bool(bool),
    Str(String),
}

/// A method declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default = "default_returns")]
    pub returns: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "override")]
    pub is_override: bool,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub return_statements: Vec<ReturnDef>,
}

fn default_returns() -> String {
    "void".to_string()
}

fn default_true() -> bool {
    true
}

/// A return statement; `type` is omitted for `return null;`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReturnDef {
    #[serde(default, rename = "type")]
    pub expression_type: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub column: usize,
}

/// Collects model files and builds one [`Compilation`] from them.
#[derive(Debug, Default)]
pub struct CompilationBuilder {
    files: Vec<(String, ModelFile)>,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model file from disk; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let display = path.to_string_lossy().to_string();
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let model: ModelFile = if is_json {
            serde_json::from_str(&content).map_err(|source| ModelError::Json {
                path: display.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|source| ModelError::Yaml {
                path: display.clone(),
                source,
            })?
        };
        self.add_model(display, model);
        Ok(())
    }

    /// Add a model parsed from a YAML string.
    pub fn add_yaml_str(&mut self, source: &str, yaml: &str) -> Result<(), ModelError> {
        let model: ModelFile = serde_yaml::from_str(yaml).map_err(|e| ModelError::Yaml {
            path: source.to_string(),
            source: e,
        })?;
        self.add_model(source, model);
        Ok(())
    }

    pub fn add_model(&mut self, source: impl Into<String>, model: ModelFile) {
        self.files.push((source.into(), model));
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Declare every type, then resolve every reference.
    pub fn build(self) -> Result<Compilation, ModelError> {
        let mut compilation = Compilation::new();

        let mut declared: Vec<(TypeId, &TypeDef, String)> = Vec::new();
        for (source, model) in &self.files {
            let default_file = model.file.clone().unwrap_or_else(|| source.clone());
            for def in &model.types {
                let id = compilation.declare_type(&def.metadata_name(), def.kind, def.arity())?;
                declared.push((id, def, default_file.clone()));
            }
        }

        for (id, def, default_file) in &declared {
            resolve_type(&mut compilation, *id, def, default_file)?;
        }

        for (id, def, _) in &declared {
            let chain = compilation.type_hierarchy(*id);
            let last = chain.last().copied().unwrap_or(*id);
            if compilation.base_type(last).is_some() {
                return Err(ModelError::BaseCycle(def.metadata_name()));
            }
        }

        Ok(compilation)
    }
}

impl Compilation {
    /// Build a compilation from a single inline YAML model.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ModelError> {
        let mut builder = CompilationBuilder::new();
        builder.add_yaml_str("<inline>", yaml)?;
        builder.build()
    }
}

fn resolve_type(
    compilation: &mut Compilation,
    id: TypeId,
    def: &TypeDef,
    default_file: &str,
) -> Result<(), ModelError> {
    let context = format!("type `{}`", def.name);

    let base = match &def.base {
        Some(expr) => Some(resolve_named(compilation, expr, &context)?),
        None => None,
    };
    let interfaces = def
        .interfaces
        .iter()
        .map(|expr| resolve_named(compilation, expr, &context))
        .collect::<Result<Vec<_>, _>>()?;
    let attributes = resolve_attributes(compilation, &def.attributes, &context)?;
    let constants = def
        .constants
        .iter()
        .map(|(name, value)| {
            let value = match value {
                ConstDef::Int(v) => ConstValue::Int(*v),
                ConstDef::Bool(v) => ConstValue::Bool(*v),
                ConstDef::Str(v) => ConstValue::Str(v.clone()),
            };
            (name.clone(), value)
        })
        .collect();

    {
        let node = compilation.type_mut(id);
        node.base = base;
        node.interfaces = interfaces;
        node.attributes = attributes;
        node.constants = constants;
    }

    for method in &def.methods {
        let context = format!("method `{}.{}`", def.name, method.name);
        let file = method.file.clone().unwrap_or_else(|| default_file.to_string());
        let return_type = resolve_named(compilation, &method.returns, &context)?;
        let attributes = resolve_attributes(compilation, &method.attributes, &context)?;

        let mut returns = Vec::with_capacity(method.return_statements.len());
        for ret in &method.return_statements {
            let expression_type = match &ret.expression_type {
                Some(expr) => Some(resolve_named(compilation, expr, &context)?),
                None => None,
            };
            returns.push(ReturnStatement {
                location: Location::new(
                    ret.file.clone().unwrap_or_else(|| file.clone()),
                    ret.line,
                    ret.column,
                ),
                expression_type,
            });
        }

        compilation.add_method(MethodSymbol {
            name: method.name.clone(),
            containing_type: id,
            return_type,
            attributes,
            is_public: method.public,
            is_static: method.is_static,
            is_override: method.is_override,
            returns,
            location: Location::new(file, method.line, 0),
        });
    }

    Ok(())
}

/// Parse and resolve a type expression, constructing generic instantiations.
fn resolve_named(compilation: &mut Compilation, expr: &str, context: &str) -> Result<TypeId, ModelError> {
    let parsed = parse_type_expr(expr)?;
    resolve_expr(compilation, &parsed, context)
}

fn resolve_expr(compilation: &mut Compilation, expr: &TypeExpr, context: &str) -> Result<TypeId, ModelError> {
    if expr.is_void() {
        return Ok(compilation.void());
    }
    let name = expr.metadata_name();
    let head = compilation
        .type_by_name(&name)
        .ok_or_else(|| ModelError::UnknownType {
            name: name.clone(),
            context: context.to_string(),
        })?;
    if expr.args.is_empty() {
        let arity = compilation.node(head).arity;
        if arity != 0 {
            return Err(ModelError::ArityMismatch {
                name,
                expected: arity,
                found: 0,
            });
        }
        return Ok(head);
    }
    let args = expr
        .args
        .iter()
        .map(|a| resolve_expr(compilation, a, context))
        .collect::<Result<Vec<_>, _>>()?;
    compilation.construct(head, args)
}

fn resolve_attributes(
    compilation: &mut Compilation,
    defs: &[AttributeDef],
    context: &str,
) -> Result<Vec<AttributeData>, ModelError> {
    let mut attributes = Vec::with_capacity(defs.len());
    for def in defs {
        let class = resolve_named(compilation, &def.class, context)?;
        let args = def
            .args
            .iter()
            .map(|a| resolve_arg(compilation, a, context))
            .collect::<Result<Vec<_>, _>>()?;
        let named = def
            .named
            .iter()
            .map(|(name, a)| Ok((name.clone(), resolve_arg(compilation, a, context)?)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        attributes.push(AttributeData { class, args, named });
    }
    Ok(attributes)
}

fn resolve_arg(compilation: &mut Compilation, arg: &ArgDef, context: &str) -> Result<AttributeArg, ModelError> {
    Ok(match arg {
        ArgDef::Int(v) => AttributeArg::Int(*v),
        ArgDef::Bool(v) => AttributeArg::Bool(*v),
        ArgDef::Str(v) => AttributeArg::Str(v.clone()),
        ArgDef::TypeOf { type_of } => AttributeArg::TypeOf(resolve_named(compilation, type_of, context)?),
        ArgDef::Constant { constant } => {
            // Members are resolved lazily; an unknown member is a malformed
            // attribute, not a broken model.
            let (owner, member) = constant
                .rsplit_once('.')
                .filter(|(o, m)| !o.is_empty() && !m.is_empty())
                .ok_or_else(|| ModelError::InvalidConstantRef(constant.clone()))?;
            AttributeArg::Constant {
                owner: resolve_named(compilation, owner, context)?,
                member: member.to_string(),
            }
        }
        ArgDef::Cast { cast } => AttributeArg::Cast(Box::new(resolve_arg(compilation, cast, context)?)),
    })
}
