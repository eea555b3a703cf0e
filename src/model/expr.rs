//! Parser for the type expressions used in model files.
//!
//! Grammar:
//!
//! ```text
//! type  := name ( '<' type ( ',' type )* '>' )?
//! name  := [A-Za-z_][A-Za-z0-9_.`]*
//! ```
//!
//! `Task<ActionResult<Pet>>` names the generic definition ``Task`1``
//! applied to ``ActionResult`1`` applied to `Pet`.

use regex::Regex;
use std::fmt;

use super::ModelError;

lazy_static::lazy_static! {
    /// Identifiers, angle brackets and commas; any other non-space character
    /// is a token of its own so the parser can report it.
    static ref TOKEN: Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_.`]*|[<>,]|\S").unwrap();
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Metadata name of the referenced declaration (``Name`N`` for generics).
    pub fn metadata_name(&self) -> String {
        if self.args.is_empty() || self.name.contains('`') {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.args.len())
        }
    }

    pub fn is_void(&self) -> bool {
        self.args.is_empty() && self.name == "void"
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Parse a type expression such as `Task<ActionResult<Pet>>`.
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, ModelError> {
    let tokens: Vec<&str> = TOKEN.find_iter(input).map(|m| m.as_str()).collect();
    let mut pos = 0;
    let expr = parse_at(input, &tokens, &mut pos)?;
    if let Some(extra) = tokens.get(pos) {
        return Err(invalid(input, format!("unexpected `{}`", extra)));
    }
    Ok(expr)
}

fn parse_at(input: &str, tokens: &[&str], pos: &mut usize) -> Result<TypeExpr, ModelError> {
    let name = match tokens.get(*pos) {
        Some(t) if is_identifier(t) => t.to_string(),
        Some(t) => return Err(invalid(input, format!("expected a type name, found `{}`", t))),
        None => return Err(invalid(input, "expected a type name".to_string())),
    };
    *pos += 1;

    let mut args = Vec::new();
    if tokens.get(*pos) == Some(&"<") {
        *pos += 1;
        loop {
            args.push(parse_at(input, tokens, pos)?);
            match tokens.get(*pos) {
                Some(&",") => *pos += 1,
                Some(&">") => {
                    *pos += 1;
                    break;
                }
                Some(t) => {
                    return Err(invalid(input, format!("expected `,` or `>`, found `{}`", t)))
                }
                None => return Err(invalid(input, "unclosed `<`".to_string())),
            }
        }
    }

    Ok(TypeExpr { name, args })
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
}

fn invalid(expr: &str, reason: String) -> ModelError {
    ModelError::InvalidTypeExpr {
        expr: expr.to_string(),
        reason,
    }
}
