//! TypeScript code emission via the Emit trait.
//!
//! Each syntax tree node renders itself at a nesting depth of two spaces per
//! level. The first line of the output is never indented; the caller already
//! placed it. Continuation lines are indented relative to `depth`.

use super::ast::{
    ArrowBody, BinOp, Binding, ObjectLit, ObjectProp, PatternProp, TemplatePart, TsArrow,
    TsExpr, TsLiteral, TsObjectType, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef,
    TypeDefKind,
};
use crate::generation::sanitizers::is_bare_identifier;

/// Trait for emitting TypeScript code from syntax tree nodes.
pub trait Emit {
    /// Render the node nested `depth` levels deep.
    fn emit_at(&self, depth: usize) -> String;

    /// Render the node at the top level.
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Property keys that aren't identifiers are double-quoted.
pub fn quote_if_needed(key: &str) -> String {
    if is_bare_identifier(key) {
        key.to_string()
    } else {
        double_quoted(key)
    }
}

fn double_quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn single_quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn escape_template(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

fn join<T: Emit>(items: &[T], depth: usize, separator: &str) -> String {
    items
        .iter()
        .map(|item| item.emit_at(depth))
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit_at(&self, _depth: usize) -> String {
        let name = match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Void => "void",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Any => "any",
        };
        name.to_string()
    }
}

impl Emit for TsLiteral {
    fn emit_at(&self, _depth: usize) -> String {
        match self {
            TsLiteral::String(s) => single_quoted(s),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit_at(&self, depth: usize) -> String {
        match self {
            TsType::Primitive(p) => p.emit_at(depth),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{}<{}>", name, join(args, depth, ", ")),
            TsType::Array(inner) => {
                let inner_str = inner.emit_at(depth);
                if matches!(
                    **inner,
                    TsType::Union(_) | TsType::Intersection(_) | TsType::Function { .. }
                ) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => join(types, depth, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit_at(depth);
                    if matches!(t, TsType::Union(_) | TsType::Function { .. }) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(object) => object.emit_at(depth),
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit_at(depth), value.emit_at(depth))
            }
            TsType::Literal(lit) => lit.emit_at(depth),
            TsType::TypeOf(expr) => format!("typeof {expr}"),
            TsType::Function { params, ret } => {
                format!("({}) => {}", join(params, depth, ", "), ret.emit_at(depth))
            }
        }
    }
}

impl Emit for TsObjectType {
    fn emit_at(&self, depth: usize) -> String {
        if self.props.is_empty() {
            return "{}".to_string();
        }
        if self.multiline {
            let mut output = String::from("{\n");
            for prop in &self.props {
                output.push_str(&format!("{}{};\n", indent(depth + 1), prop.emit_at(depth + 1)));
            }
            output.push_str(&format!("{}}}", indent(depth)));
            output
        } else {
            format!("{{ {} }}", join(&self.props, depth, "; "))
        }
    }
}

impl Emit for TsProp {
    fn emit_at(&self, depth: usize) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", key, opt, self.ty.emit_at(depth))
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit_at(&self, depth: usize) -> String {
        let prefix = indent(depth);
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                if properties.is_empty() {
                    return format!("{}export interface {} {{}}", prefix, self.name);
                }
                let mut output = format!("{}export interface {} {{\n", prefix, self.name);
                for prop in properties {
                    if let Some(doc) = &prop.doc {
                        let doc = doc.replace("*/", "*\\/");
                        output.push_str(&format!("{}/** {} */\n", indent(depth + 1), doc.trim()));
                    }
                    output.push_str(&format!(
                        "{}{};\n",
                        indent(depth + 1),
                        prop.emit_at(depth + 1)
                    ));
                }
                output.push_str(&format!("{prefix}}}"));
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("{}export type {} = {};", prefix, self.name, ty.emit_at(depth))
            }
        }
    }
}

// =============================================================================
// Bindings and parameters
// =============================================================================

impl Emit for PatternProp {
    fn emit_at(&self, _depth: usize) -> String {
        if self.key == self.alias {
            self.key.clone()
        } else {
            format!("{}: {}", quote_if_needed(&self.key), self.alias)
        }
    }
}

impl Emit for Binding {
    fn emit_at(&self, depth: usize) -> String {
        match self {
            Binding::Ident(name) => name.clone(),
            Binding::Object(props) if props.is_empty() => "{}".to_string(),
            Binding::Object(props) => format!("{{ {} }}", join(props, depth, ", ")),
        }
    }
}

impl Emit for TsParam {
    fn emit_at(&self, depth: usize) -> String {
        let rest = if self.rest { "..." } else { "" };
        let opt = if self.optional { "?" } else { "" };
        let binding = self.binding.emit_at(depth);
        match &self.ty {
            Some(ty) => format!("{rest}{binding}{opt}: {}", ty.emit_at(depth)),
            None => format!("{rest}{binding}{opt}"),
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit_at(&self, _depth: usize) -> String {
        let op = match self {
            BinOp::Add => "+",
            BinOp::Lt => "<",
            BinOp::StrictNotEqual => "!==",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Nullish => "??",
        };
        op.to_string()
    }
}

impl Emit for ObjectProp {
    fn emit_at(&self, depth: usize) -> String {
        match self {
            ObjectProp::Shorthand(name) => name.clone(),
            ObjectProp::KeyValue(key, value) => {
                format!("{}: {}", quote_if_needed(key), value.emit_at(depth))
            }
            ObjectProp::Spread(expr) => format!("...{}", expr.emit_at(depth)),
        }
    }
}

impl Emit for ObjectLit {
    fn emit_at(&self, depth: usize) -> String {
        if self.props.is_empty() {
            return "{}".to_string();
        }
        if self.multiline {
            let mut output = String::from("{\n");
            for prop in &self.props {
                output.push_str(&format!("{}{},\n", indent(depth + 1), prop.emit_at(depth + 1)));
            }
            output.push_str(&format!("{}}}", indent(depth)));
            output
        } else {
            format!("{{ {} }}", join(&self.props, depth, ", "))
        }
    }
}

impl Emit for TsArrow {
    fn emit_at(&self, depth: usize) -> String {
        let mut output = String::new();
        if self.is_async {
            output.push_str("async ");
        }
        if self.multiline_params && !self.params.is_empty() {
            output.push_str("(\n");
            let params: Vec<String> = self
                .params
                .iter()
                .map(|p| format!("{}{}", indent(depth + 1), p.emit_at(depth + 1)))
                .collect();
            output.push_str(&params.join(",\n"));
            output.push_str(&format!("\n{})", indent(depth)));
        } else {
            output.push_str(&format!("({})", join(&self.params, depth, ", ")));
        }
        if let Some(ret) = &self.return_type {
            output.push_str(&format!(": {}", ret.emit_at(depth)));
        }
        output.push_str(" => ");
        match &self.body {
            ArrowBody::Expr(expr) => output.push_str(&expr.emit_at(depth)),
            ArrowBody::Block(stmts) => {
                output.push_str("{\n");
                for stmt in stmts {
                    output.push_str(&stmt.emit_at(depth + 1));
                }
                output.push_str(&format!("{}}}", indent(depth)));
            }
        }
        output
    }
}

impl Emit for TsExpr {
    fn emit_at(&self, depth: usize) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit_at(depth),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => escape_template(s),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit_at(depth)),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Member {
                object,
                prop,
                optional,
            } => {
                let dot = if *optional { "?." } else { "." };
                format!("{}{}{}", object.emit_at(depth), dot, prop)
            }
            TsExpr::Index {
                object,
                index,
                optional,
            } => {
                let dot = if *optional { "?." } else { "" };
                format!("{}{}[{}]", object.emit_at(depth), dot, index.emit_at(depth))
            }
            TsExpr::Call {
                callee,
                args,
                optional,
                multiline,
            } => {
                let dot = if *optional { "?." } else { "" };
                let callee = callee.emit_at(depth);
                if *multiline && !args.is_empty() {
                    let args: Vec<String> = args
                        .iter()
                        .map(|a| format!("{}{}", indent(depth + 1), a.emit_at(depth + 1)))
                        .collect();
                    format!("{callee}{dot}(\n{}\n{})", args.join(",\n"), indent(depth))
                } else {
                    format!("{callee}{dot}({})", join(args, depth, ", "))
                }
            }
            TsExpr::Arrow(arrow) => arrow.emit_at(depth),
            TsExpr::Object(object) => object.emit_at(depth),
            TsExpr::Array(items) => format!("[{}]", join(items, depth, ", ")),
            TsExpr::Await(expr) => format!("await {}", expr.emit_at(depth)),
            TsExpr::Spread(expr) => format!("...{}", expr.emit_at(depth)),
            TsExpr::BinOp { left, op, right } => format!(
                "{} {} {}",
                left.emit_at(depth),
                op.emit_at(depth),
                right.emit_at(depth)
            ),
            TsExpr::Paren(expr) => format!("({})", expr.emit_at(depth)),
            TsExpr::Cast { expr, ty } => {
                format!("{} as {}", expr.emit_at(depth), ty.emit_at(depth))
            }
            TsExpr::AsConst(expr) => format!("{} as const", expr.emit_at(depth)),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    /// Statements include their own indentation and trailing newline.
    fn emit_at(&self, depth: usize) -> String {
        let prefix = indent(depth);
        match self {
            TsStmt::Const {
                export,
                binding,
                ty,
                init,
                break_after_eq,
            } => {
                let export = if *export { "export " } else { "" };
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit_at(depth)))
                    .unwrap_or_default();
                let head = format!("{prefix}{export}const {}{ty_str} =", binding.emit_at(depth));
                if *break_after_eq {
                    format!("{head}\n{}{};\n", indent(depth + 1), init.emit_at(depth + 1))
                } else {
                    format!("{head} {};\n", init.emit_at(depth))
                }
            }
            TsStmt::Expr(expr) => format!("{}{};\n", prefix, expr.emit_at(depth)),
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{}return {};\n", prefix, e.emit_at(depth)),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let mut output = format!("{}if ({}) {{\n", prefix, cond.emit_at(depth));
                for stmt in then_body {
                    output.push_str(&stmt.emit_at(depth + 1));
                }
                if let Some(else_stmts) = else_body {
                    output.push_str(&format!("{prefix}}} else {{\n"));
                    for stmt in else_stmts {
                        output.push_str(&stmt.emit_at(depth + 1));
                    }
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Try {
                body,
                catch_binding,
                handler,
            } => {
                let mut output = format!("{prefix}try {{\n");
                for stmt in body {
                    output.push_str(&stmt.emit_at(depth + 1));
                }
                output.push_str(&format!("{prefix}}} catch ({catch_binding}) {{\n"));
                for stmt in handler {
                    output.push_str(&stmt.emit_at(depth + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Blank => "\n".to_string(),
        }
    }
}
