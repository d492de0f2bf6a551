//! TypeScript syntax tree for generated fragments.
//!
//! Only the constructs the fragments and the type synthesizer need:
//! - TsType: type expressions (primitives, references, generics, objects, ...)
//! - TsExpr: expressions (calls, arrows, object literals, templates, ...)
//! - TsStmt: statements of an arrow function body
//! - TsTypeDef: top-level interfaces and type aliases

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Void,
    Unknown,
    Any,
}

/// TypeScript type expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Primitive(TsPrimitive),
    /// Named type reference: `User`
    Ref(String),
    /// Generic instantiation: `Promise<User>`
    Generic { name: String, args: Vec<TsType> },
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// Inline object type: `{ id: number; name?: string }`
    Object(TsObjectType),
    /// `Record<K, V>`
    Record { key: Box<TsType>, value: Box<TsType> },
    /// Literal type: `'items'`, `42`, `true`
    Literal(TsLiteral),
    /// `typeof expr`
    TypeOf(String),
    /// Function type: `(error: AxiosResponse) => void`
    Function {
        params: Vec<TsParam>,
        ret: Box<TsType>,
    },
}

impl TsType {
    pub fn any() -> Self {
        TsType::Primitive(TsPrimitive::Any)
    }

    pub fn void() -> Self {
        TsType::Primitive(TsPrimitive::Void)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn object(props: Vec<TsProp>) -> Self {
        TsType::Object(TsObjectType {
            props,
            multiline: false,
        })
    }

    pub fn multiline_object(props: Vec<TsProp>) -> Self {
        TsType::Object(TsObjectType {
            props,
            multiline: true,
        })
    }

    pub fn string_literal(value: impl Into<String>) -> Self {
        TsType::Literal(TsLiteral::String(value.into()))
    }
}

/// Inline object type
#[derive(Debug, Clone, PartialEq)]
pub struct TsObjectType {
    pub props: Vec<TsProp>,
    /// One property per line
    pub multiline: bool,
}

/// Property of an object type or interface
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    /// Emitted as a `/** ... */` comment in interfaces
    pub doc: Option<String>,
}

impl TsProp {
    pub fn required(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            doc: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Emitted single-quoted
    String(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    Null,
}

/// Binding target of a declaration or parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Ident(String),
    /// Object destructuring: `{ id, "post-id": postId }`
    Object(Vec<PatternProp>),
}

impl Binding {
    pub fn ident(name: impl Into<String>) -> Self {
        Binding::Ident(name.into())
    }

    /// Destructures each name into a variable of the same name.
    pub fn destructure<S: AsRef<str>>(names: &[S]) -> Self {
        Binding::Object(names.iter().map(|n| PatternProp::shorthand(n.as_ref())).collect())
    }
}

/// One property of an object pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProp {
    pub key: String,
    pub alias: String,
}

impl PatternProp {
    pub fn new(key: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alias: alias.into(),
        }
    }

    pub fn shorthand(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Function or arrow parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub binding: Binding,
    pub ty: Option<TsType>,
    pub optional: bool,
    /// Rest parameter: `...args`
    pub rest: bool,
}

impl TsParam {
    pub fn typed(binding: Binding, ty: TsType) -> Self {
        Self {
            binding,
            ty: Some(ty),
            optional: false,
            rest: false,
        }
    }

    pub fn named(name: &str, ty: TsType) -> Self {
        Self::typed(Binding::ident(name), ty)
    }

    pub fn rest(name: &str) -> Self {
        Self {
            binding: Binding::ident(name),
            ty: None,
            optional: false,
            rest: true,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Lt,
    StrictNotEqual,
    And,
    Or,
    Nullish,
}

/// Template literal part
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Static(String),
    /// `${expr}`
    Dynamic(TsExpr),
}

/// Property of an object literal
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    /// `name`
    Shorthand(String),
    /// `key: value`
    KeyValue(String, TsExpr),
    /// `...expr`
    Spread(TsExpr),
}

impl ObjectProp {
    /// `key: ident`, or the shorthand when they are equal.
    pub fn binding(key: &str, ident: &str) -> Self {
        if key == ident {
            ObjectProp::Shorthand(key.to_string())
        } else {
            ObjectProp::KeyValue(key.to_string(), TsExpr::ident(ident))
        }
    }
}

/// Object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub props: Vec<ObjectProp>,
    pub multiline: bool,
}

/// Body of an arrow function
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(TsExpr),
    Block(Vec<TsStmt>),
}

/// Arrow function expression
#[derive(Debug, Clone, PartialEq)]
pub struct TsArrow {
    pub is_async: bool,
    pub params: Vec<TsParam>,
    /// One parameter per line
    pub multiline_params: bool,
    pub return_type: Option<TsType>,
    pub body: ArrowBody,
}

impl TsArrow {
    pub fn block(params: Vec<TsParam>, body: Vec<TsStmt>) -> Self {
        Self {
            is_async: false,
            params,
            multiline_params: false,
            return_type: None,
            body: ArrowBody::Block(body),
        }
    }

    pub fn expr(params: Vec<TsParam>, body: TsExpr) -> Self {
        Self {
            body: ArrowBody::Expr(body),
            ..Self::block(params, Vec::new())
        }
    }
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    Ident(String),
    Literal(TsLiteral),
    /// Template literal: `` `/users/${id}` ``
    Template(Vec<TemplatePart>),
    /// `object.prop`, or `object?.prop` when optional
    Member {
        object: Box<TsExpr>,
        prop: String,
        optional: bool,
    },
    /// `object[index]`, or `object?.[index]` when optional
    Index {
        object: Box<TsExpr>,
        index: Box<TsExpr>,
        optional: bool,
    },
    /// `callee(args)`, or `callee?.(args)` when optional
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
        optional: bool,
        /// One argument per line
        multiline: bool,
    },
    Arrow(Box<TsArrow>),
    Object(ObjectLit),
    Array(Vec<TsExpr>),
    Await(Box<TsExpr>),
    /// `...expr`
    Spread(Box<TsExpr>),
    BinOp {
        left: Box<TsExpr>,
        op: BinOp,
        right: Box<TsExpr>,
    },
    Paren(Box<TsExpr>),
    /// `expr as Type`
    Cast { expr: Box<TsExpr>, ty: TsType },
    /// `expr as const`
    AsConst(Box<TsExpr>),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        TsExpr::Literal(TsLiteral::Int(value))
    }

    pub fn null() -> Self {
        TsExpr::Literal(TsLiteral::Null)
    }

    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
            optional: false,
        }
    }

    pub fn optional_member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
            optional: true,
        }
    }

    pub fn index(self, index: TsExpr) -> Self {
        TsExpr::Index {
            object: Box::new(self),
            index: Box::new(index),
            optional: false,
        }
    }

    pub fn call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
            optional: false,
            multiline: false,
        }
    }

    pub fn optional_call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
            optional: true,
            multiline: false,
        }
    }

    pub fn multiline_call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
            optional: false,
            multiline: true,
        }
    }

    pub fn arrow(arrow: TsArrow) -> Self {
        TsExpr::Arrow(Box::new(arrow))
    }

    pub fn object(props: Vec<ObjectProp>) -> Self {
        TsExpr::Object(ObjectLit {
            props,
            multiline: false,
        })
    }

    pub fn multiline_object(props: Vec<ObjectProp>) -> Self {
        TsExpr::Object(ObjectLit {
            props,
            multiline: true,
        })
    }

    pub fn awaited(self) -> Self {
        TsExpr::Await(Box::new(self))
    }

    pub fn binop(self, op: BinOp, right: TsExpr) -> Self {
        TsExpr::BinOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    pub fn paren(self) -> Self {
        TsExpr::Paren(Box::new(self))
    }

    pub fn cast(self, ty: TsType) -> Self {
        TsExpr::Cast {
            expr: Box::new(self),
            ty,
        }
    }
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// `const binding: Type = init;`
    Const {
        export: bool,
        binding: Binding,
        ty: Option<TsType>,
        init: TsExpr,
        /// Put the initializer on its own line
        break_after_eq: bool,
    },
    Expr(TsExpr),
    Return(Option<TsExpr>),
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
        else_body: Option<Vec<TsStmt>>,
    },
    Try {
        body: Vec<TsStmt>,
        catch_binding: String,
        handler: Vec<TsStmt>,
    },
    /// Empty line
    Blank,
}

impl TsStmt {
    pub fn const_(binding: Binding, init: TsExpr) -> Self {
        TsStmt::Const {
            export: false,
            binding,
            ty: None,
            init,
            break_after_eq: false,
        }
    }

    /// `export const name = init;`
    pub fn export_const(name: &str, init: TsExpr) -> Self {
        TsStmt::Const {
            export: true,
            binding: Binding::ident(name),
            ty: None,
            init,
            break_after_eq: false,
        }
    }

    pub fn ret(expr: TsExpr) -> Self {
        TsStmt::Return(Some(expr))
    }
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// `export interface Foo { ... }`
    Interface { properties: Vec<TsProp> },
    /// `export type Foo = ...;`
    TypeAlias { ty: TsType },
}

/// Top-level type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
}
