//! Builders for the api, queryKey and hook fragments.
//!
//! Each fragment is assembled as a syntax tree from a [`FragmentContext`] and
//! only turned into text by [`Emit`]. All three read identifiers from the same
//! variable mapping, so names agree across fragments.

use crate::config::CodegenConfig;
use crate::generation::emitter::ast::{
    ArrowBody, BinOp, Binding, ObjectProp, PatternProp, TemplatePart, TsArrow, TsExpr, TsLiteral,
    TsParam, TsPrimitive, TsProp, TsStmt, TsType,
};
use crate::generation::emitter::emit::Emit;
use crate::generation::sanitizers::is_bare_identifier;
use crate::generation::utils::FeatureNames;
use crate::generation::variables::{ExtractedVariables, UrlSegment};
use crate::generation::{HookType, HttpMethod};

/// Names the fragments bind or reference in scopes that also hold the variables
const FRAGMENT_LOCALS: &[&str] = &[
    "context",
    "signal",
    "queryKey",
    "pageParam",
    "CancelToken",
    "axios",
    "source",
    "response",
    "e",
    "Promise",
    "undefined",
    "options",
    "queryData",
    "invalidateQueries",
    "useQuery",
    "useInfiniteQuery",
    "useMutation",
];

/// Identifiers a variable of `names` must not be bound to.
///
/// Covers the fragment locals plus the feature's own api function and cache
/// key and the configured helpers.
pub fn reserved_identifiers(names: &FeatureNames, config: &CodegenConfig) -> Vec<String> {
    FRAGMENT_LOCALS
        .iter()
        .map(|name| name.to_string())
        .chain([
            names.camel().to_string(),
            names.query_key(),
            config.transport_factory.clone(),
            config.error_notifier.clone(),
            config.invalidation_hook.clone(),
        ])
        .collect()
}

/// Type of the variables object an endpoint takes
#[derive(Debug, Clone, PartialEq)]
pub enum VariablesType {
    /// A declared `<Feature>Variables` type
    Named(String),
    /// The endpoint takes no variables
    None,
}

impl VariablesType {
    pub fn to_ts(&self) -> TsType {
        match self {
            VariablesType::Named(name) => TsType::named(name.as_str()),
            VariablesType::None => TsType::void(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, VariablesType::None)
    }
}

/// Everything the fragment builders need for one endpoint
pub struct FragmentContext<'a> {
    pub names: &'a FeatureNames,
    pub method: HttpMethod,
    pub hook_type: HookType,
    pub variables: &'a ExtractedVariables,
    pub variables_type: VariablesType,
    /// Type the api function resolves to
    pub return_type: TsType,
    /// Envelope type the transport response is wrapped in
    pub envelope: Option<&'a str>,
    /// Key of the listed records, used to count fetched items
    pub records_key: &'a str,
    /// Body/query parameter receiving the page cursor
    pub page_field: Option<&'a str>,
    pub count_fields: (&'a str, &'a str),
    pub config: &'a CodegenConfig,
}

impl FragmentContext<'_> {
    /// `{ key: identifier, ... }` over the body/query parameters.
    fn body_object(&self, inject_cursor: bool) -> TsExpr {
        let mapping = &self.variables.mapping;
        let props = mapping
            .subset(&self.variables.body_params)
            .map(|binding| {
                if inject_cursor && Some(binding.original.as_str()) == self.page_field {
                    ObjectProp::KeyValue(
                        binding.original.clone(),
                        TsExpr::ident(binding.identifier.as_str())
                            .binop(BinOp::Nullish, TsExpr::ident("pageParam"))
                            .binop(BinOp::Nullish, TsExpr::int(1)),
                    )
                } else {
                    ObjectProp::binding(&binding.original, &binding.identifier)
                }
            })
            .collect();
        TsExpr::object(props)
    }

    fn has_body_params(&self) -> bool {
        !self.variables.body_params.is_empty()
    }

    /// Destructuring pattern over every variable.
    fn variables_pattern(&self, extra: &[&str]) -> Binding {
        let mut props: Vec<PatternProp> = self
            .variables
            .mapping
            .iter()
            .map(|b| PatternProp::new(b.original.as_str(), b.identifier.as_str()))
            .collect();
        props.extend(extra.iter().map(|name| PatternProp::shorthand(name)));
        Binding::Object(props)
    }

    /// The URL as a template literal over the mapped identifiers.
    fn url_template(&self, suffix: &str) -> TsExpr {
        let mut parts: Vec<TemplatePart> = self
            .variables
            .template
            .segments()
            .iter()
            .map(|segment| match segment {
                UrlSegment::Literal(text) => TemplatePart::Static(text.clone()),
                UrlSegment::Variable(name) => {
                    let ident = self
                        .variables
                        .mapping
                        .identifier_for(name)
                        .unwrap_or(name.as_str());
                    TemplatePart::Dynamic(TsExpr::ident(ident))
                }
            })
            .collect();
        if !suffix.is_empty() {
            parts.push(TemplatePart::Static(suffix.to_string()));
        }
        TsExpr::Template(parts)
    }

    /// `getInstance().<method>`
    fn transport(&self) -> TsExpr {
        TsExpr::ident(self.config.transport_factory.as_str())
            .call(vec![])
            .member(self.method.as_lowercase())
    }

    fn response_statements(&self, call: TsExpr) -> Vec<TsStmt> {
        let response_type = match self.envelope {
            Some(envelope) => TsType::generic(envelope, vec![self.return_type.clone()]),
            None => self.return_type.clone(),
        };
        let data = TsExpr::ident("response").member("data");
        let mut stmts = vec![TsStmt::Const {
            export: false,
            binding: Binding::ident("response"),
            ty: Some(TsType::generic("AxiosResponse", vec![response_type])),
            init: call.awaited(),
            break_after_eq: true,
        }];

        if self.envelope.is_some() {
            stmts.push(TsStmt::If {
                cond: data.clone().member("success").binop(
                    BinOp::StrictNotEqual,
                    TsExpr::Literal(TsLiteral::Bool(true)),
                ),
                then_body: vec![TsStmt::ret(
                    TsExpr::ident("Promise")
                        .member("reject")
                        .call(vec![TsExpr::string("Something went wrong!")]),
                )],
                else_body: None,
            });
            stmts.push(TsStmt::ret(data.optional_member("data")));
        } else {
            stmts.push(TsStmt::ret(data));
        }
        stmts
    }

    fn key_scope(&self) -> TsType {
        TsType::object(vec![TsProp::required(
            "scope",
            TsType::string_literal(self.names.camel()),
        )])
    }

    /// Arguments passed to `<feature>Key.keys(...)` by the hook.
    fn key_arguments(&self) -> TsExpr {
        let mut props = vec![ObjectProp::KeyValue(
            "scope".into(),
            TsExpr::string(self.names.camel()),
        )];
        props.extend(
            self.variables
                .mapping
                .iter()
                .map(|b| ObjectProp::binding(&b.original, &b.identifier)),
        );
        TsExpr::ident(self.names.query_key())
            .member("keys")
            .call(vec![TsExpr::multiline_object(props)])
    }

    fn hook_props_type(&self) -> TsType {
        let options = TsType::object(vec![TsProp::optional(
            "options",
            TsType::object(vec![TsProp::optional(
                "enabled",
                TsType::Primitive(TsPrimitive::Boolean),
            )]),
        )]);
        if self.variables_type.is_none() {
            options
        } else {
            TsType::Intersection(vec![self.variables_type.to_ts(), options])
        }
    }
}

fn exported_arrow(name: &str, arrow: TsArrow) -> TsStmt {
    TsStmt::export_const(name, TsExpr::arrow(arrow))
}

fn emit_statement(stmt: &TsStmt) -> String {
    stmt.emit().trim_end().to_string()
}

/// Cache key factory: `<feature>Key.keys(args) => [args]`
#[derive(Debug, Clone, PartialEq)]
pub struct QueryKeyFragment {
    pub name: String,
    /// Type of the single key element
    pub args_type: TsType,
}

impl QueryKeyFragment {
    /// Only cached hook types have a query key.
    pub fn build(ctx: &FragmentContext<'_>) -> Option<Self> {
        if !ctx.hook_type.is_cached() {
            return None;
        }
        let args_type = if ctx.variables_type.is_none() {
            ctx.key_scope()
        } else {
            TsType::Intersection(vec![ctx.key_scope(), ctx.variables_type.to_ts()])
        };
        Some(Self {
            name: ctx.names.query_key(),
            args_type,
        })
    }

    pub fn to_statement(&self) -> TsStmt {
        let keys = TsArrow::expr(
            vec![TsParam::named("args", self.args_type.clone())],
            TsExpr::AsConst(Box::new(TsExpr::Array(vec![TsExpr::ident("args")]))),
        );
        TsStmt::export_const(
            &self.name,
            TsExpr::multiline_object(vec![ObjectProp::KeyValue(
                "keys".into(),
                TsExpr::arrow(keys),
            )]),
        )
    }
}

impl Emit for QueryKeyFragment {
    fn emit_at(&self, _depth: usize) -> String {
        emit_statement(&self.to_statement())
    }
}

/// The async api function
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFragment {
    pub name: String,
    pub params: Vec<TsParam>,
    pub multiline_params: bool,
    pub return_type: TsType,
    pub body: Vec<TsStmt>,
}

impl ApiFragment {
    pub fn build(ctx: &FragmentContext<'_>) -> Self {
        match ctx.hook_type {
            HookType::Query | HookType::InfiniteQuery => Self::cached(ctx),
            HookType::Mutation => Self::mutation(ctx),
        }
    }

    /// Reads variables from the cache key and wires cancellation.
    fn cached(ctx: &FragmentContext<'_>) -> Self {
        let infinite = ctx.hook_type == HookType::InfiniteQuery;
        let context_fields: &[&str] = if infinite {
            &["signal", "queryKey", "pageParam"]
        } else {
            &["signal", "queryKey"]
        };

        let mut body = vec![TsStmt::const_(
            Binding::destructure(context_fields),
            TsExpr::ident("context"),
        )];
        if ctx.variables.has_variables() {
            body.push(TsStmt::const_(
                ctx.variables_pattern(&[]),
                TsExpr::ident("queryKey").index(TsExpr::int(0)),
            ));
        }
        body.push(TsStmt::Blank);
        body.push(TsStmt::const_(
            Binding::destructure(&["CancelToken"]),
            TsExpr::ident("axios"),
        ));
        body.push(TsStmt::const_(
            Binding::ident("source"),
            TsExpr::ident("CancelToken").member("source").call(vec![]),
        ));
        body.push(TsStmt::Expr(
            TsExpr::ident("signal")
                .optional_member("addEventListener")
                .call(vec![
                    TsExpr::string("abort"),
                    TsExpr::arrow(TsArrow::block(
                        vec![],
                        vec![TsStmt::Expr(
                            TsExpr::ident("source")
                                .member("cancel")
                                .call(vec![ctx.url_template(" - Request cancelled")]),
                        )],
                    )),
                ]),
        ));
        body.push(TsStmt::Blank);

        let cancel_token = ObjectProp::KeyValue(
            "cancelToken".into(),
            TsExpr::ident("source").member("token"),
        );
        let data = ctx.body_object(infinite);
        let args = if ctx.method.sends_query_params() {
            let mut config = Vec::new();
            if ctx.has_body_params() {
                config.push(ObjectProp::KeyValue("params".into(), data));
            }
            config.push(cancel_token);
            vec![ctx.url_template(""), TsExpr::object(config)]
        } else {
            vec![ctx.url_template(""), data, TsExpr::object(vec![cancel_token])]
        };

        let error_response = TsExpr::ident("e")
            .cast(TsType::any())
            .paren()
            .member("response")
            .cast(TsType::named("AxiosResponse"))
            .paren();
        body.push(TsStmt::Try {
            body: ctx.response_statements(ctx.transport().call(args)),
            catch_binding: "e".into(),
            handler: vec![reject_with(error_response)],
        });

        let key_type = TsType::generic(
            "ReturnType",
            vec![TsType::TypeOf(format!("{}.keys", ctx.names.query_key()))],
        );
        Self {
            name: ctx.names.camel().to_string(),
            params: vec![TsParam::named(
                "context",
                TsType::generic("QueryFunctionContext", vec![key_type]),
            )],
            multiline_params: true,
            return_type: ctx.return_type.clone(),
            body,
        }
    }

    /// Takes a typed variables object and sends it directly.
    fn mutation(ctx: &FragmentContext<'_>) -> Self {
        let mut args = vec![ctx.url_template("")];
        if ctx.has_body_params() {
            let data = ctx.body_object(false);
            if ctx.method.sends_query_params() {
                args.push(TsExpr::object(vec![ObjectProp::KeyValue(
                    "params".into(),
                    data,
                )]));
            } else {
                args.push(data);
            }
        }

        let error_response = TsExpr::ident("e")
            .cast(TsType::named("AxiosError"))
            .paren()
            .member("response");
        let body = vec![TsStmt::Try {
            body: ctx.response_statements(ctx.transport().call(args)),
            catch_binding: "e".into(),
            handler: vec![reject_with(error_response)],
        }];

        let params = if ctx.variables.has_variables() {
            vec![TsParam::typed(
                ctx.variables_pattern(&[]),
                ctx.variables_type.to_ts(),
            )]
        } else {
            Vec::new()
        };

        Self {
            name: ctx.names.camel().to_string(),
            params,
            multiline_params: false,
            return_type: ctx.return_type.clone(),
            body,
        }
    }

    pub fn to_statement(&self) -> TsStmt {
        let arrow = TsArrow {
            is_async: true,
            params: self.params.clone(),
            multiline_params: self.multiline_params,
            return_type: Some(TsType::generic("Promise", vec![self.return_type.clone()])),
            body: ArrowBody::Block(self.body.clone()),
        };
        exported_arrow(&self.name, arrow)
    }
}

impl Emit for ApiFragment {
    fn emit_at(&self, _depth: usize) -> String {
        emit_statement(&self.to_statement())
    }
}

/// `return Promise.reject(<error> ?? e);`
fn reject_with(error: TsExpr) -> TsStmt {
    TsStmt::ret(
        TsExpr::ident("Promise")
            .member("reject")
            .call(vec![error.binop(BinOp::Nullish, TsExpr::ident("e"))]),
    )
}

/// The consumer-facing hook
#[derive(Debug, Clone, PartialEq)]
pub struct HookFragment {
    pub name: String,
    pub params: Vec<TsParam>,
    pub body: Vec<TsStmt>,
}

impl HookFragment {
    pub fn build(ctx: &FragmentContext<'_>) -> Self {
        match ctx.hook_type {
            HookType::Query => Self::query(ctx),
            HookType::InfiniteQuery => Self::infinite(ctx),
            HookType::Mutation => Self::mutation(ctx),
        }
    }

    fn cached_params(ctx: &FragmentContext<'_>) -> Vec<TsParam> {
        vec![TsParam::typed(
            ctx.variables_pattern(&["options"]),
            ctx.hook_props_type(),
        )]
    }

    fn query(ctx: &FragmentContext<'_>) -> Self {
        let call = TsExpr::ident(ctx.hook_type.react_query_hook()).multiline_call(vec![
            ctx.key_arguments(),
            TsExpr::ident(ctx.names.camel()),
            TsExpr::multiline_object(vec![ObjectProp::Spread(TsExpr::ident("options"))]),
        ]);
        Self {
            name: ctx.names.hook(),
            params: Self::cached_params(ctx),
            body: vec![
                TsStmt::const_(Binding::ident("response"), call),
                TsStmt::ret(TsExpr::ident("response")),
            ],
        }
    }

    fn infinite(ctx: &FragmentContext<'_>) -> Self {
        let (total_field, filtered_field) = ctx.count_fields;
        let fetched_so_far = TsExpr::ident("pages").member("reduce").call(vec![
            TsExpr::arrow(TsArrow::block(
                vec![
                    TsParam::named("prev", TsType::Primitive(TsPrimitive::Number)),
                    TsParam::named("one", TsType::any()),
                ],
                vec![TsStmt::ret(TsExpr::ident("prev").binop(
                    BinOp::Add,
                    records_length(ctx.records_key)
                        .binop(BinOp::Or, TsExpr::int(0))
                        .paren(),
                ))],
            )),
            TsExpr::int(0),
        ]);

        let next_page = TsStmt::ret(
            TsExpr::ident("pages")
                .member("length")
                .binop(BinOp::Add, TsExpr::int(1)),
        );
        let has_more = |field: &str| TsStmt::If {
            cond: optional_field(TsExpr::ident("lastPage"), field)
                .binop(BinOp::StrictNotEqual, TsExpr::ident("undefined"))
                .binop(
                    BinOp::And,
                    TsExpr::ident("totalRecordsFetched")
                        .binop(BinOp::Lt, field_access(TsExpr::ident("lastPage"), field)),
                ),
            then_body: vec![next_page.clone()],
            else_body: None,
        };

        let get_next_page_param = TsArrow::block(
            vec![
                TsParam::named("lastPage", TsType::any()),
                TsParam::named("pages", TsType::any()),
            ],
            vec![
                TsStmt::const_(Binding::ident("totalRecordsFetched"), fetched_so_far),
                has_more(total_field),
                has_more(filtered_field),
                TsStmt::ret(TsExpr::null()),
            ],
        );
        let on_error = TsArrow::block(
            vec![TsParam::named(
                "e",
                TsType::generic("AxiosResponse", vec![TsType::any()]),
            )],
            vec![TsStmt::Expr(
                TsExpr::ident(ctx.config.error_notifier.as_str()).call(vec![TsExpr::ident("e")]),
            )],
        );

        let call = TsExpr::ident(ctx.hook_type.react_query_hook()).multiline_call(vec![
            ctx.key_arguments(),
            TsExpr::ident(ctx.names.camel()),
            TsExpr::multiline_object(vec![
                ObjectProp::KeyValue(
                    "getNextPageParam".into(),
                    TsExpr::arrow(get_next_page_param),
                ),
                ObjectProp::KeyValue("onError".into(), TsExpr::arrow(on_error)),
                ObjectProp::KeyValue(
                    "enabled".into(),
                    TsExpr::ident("options").optional_member("enabled"),
                ),
            ]),
        ]);

        Self {
            name: ctx.names.hook(),
            params: Self::cached_params(ctx),
            body: vec![
                TsStmt::const_(Binding::ident("queryData"), call),
                TsStmt::ret(TsExpr::ident("queryData")),
            ],
        }
    }

    fn mutation(ctx: &FragmentContext<'_>) -> Self {
        let options_type = TsType::multiline_object(vec![
            TsProp::optional(
                "onSuccess",
                TsType::Function {
                    params: vec![
                        TsParam::named("data", ctx.return_type.clone()),
                        TsParam::named("variables", ctx.variables_type.to_ts()),
                        TsParam::named("context", TsType::Primitive(TsPrimitive::Unknown)),
                    ],
                    ret: Box::new(TsType::void()),
                },
            ),
            TsProp::optional(
                "onError",
                TsType::Function {
                    params: vec![TsParam::named("error", TsType::named("AxiosResponse"))],
                    ret: Box::new(TsType::void()),
                },
            ),
        ]);
        let options_param = TsParam {
            optional: true,
            ..TsParam::named("options", options_type)
        };

        let on_success = TsArrow::block(
            vec![TsParam::rest("args")],
            vec![
                TsStmt::Expr(TsExpr::ident("invalidateQueries").call(vec![])),
                TsStmt::Expr(
                    TsExpr::ident("options")
                        .optional_member("onSuccess")
                        .optional_call(vec![TsExpr::Spread(Box::new(TsExpr::ident("args")))]),
                ),
            ],
        );
        let on_error = TsArrow::block(
            vec![TsParam::named("error", TsType::named("AxiosResponse"))],
            vec![
                TsStmt::Expr(
                    TsExpr::ident(ctx.config.error_notifier.as_str())
                        .call(vec![TsExpr::ident("error")]),
                ),
                TsStmt::Expr(
                    TsExpr::ident("options")
                        .optional_member("onError")
                        .optional_call(vec![TsExpr::ident("error")]),
                ),
            ],
        );

        let mutation = TsExpr::ident(ctx.hook_type.react_query_hook()).call(vec![
            TsExpr::multiline_object(vec![
                ObjectProp::KeyValue("mutationFn".into(), TsExpr::ident(ctx.names.camel())),
                ObjectProp::KeyValue("onSuccess".into(), TsExpr::arrow(on_success)),
                ObjectProp::KeyValue("onError".into(), TsExpr::arrow(on_error)),
            ]),
        ]);

        Self {
            name: ctx.names.hook(),
            params: vec![options_param],
            body: vec![
                TsStmt::const_(
                    Binding::ident("invalidateQueries"),
                    TsExpr::ident(ctx.config.invalidation_hook.as_str()).call(vec![]),
                ),
                TsStmt::ret(mutation),
            ],
        }
    }

    pub fn to_statement(&self) -> TsStmt {
        exported_arrow(&self.name, TsArrow::block(self.params.clone(), self.body.clone()))
    }
}

impl Emit for HookFragment {
    fn emit_at(&self, _depth: usize) -> String {
        emit_statement(&self.to_statement())
    }
}

/// `object.field`, bracketed when `field` isn't an identifier.
fn field_access(object: TsExpr, field: &str) -> TsExpr {
    if is_bare_identifier(field) {
        object.member(field)
    } else {
        object.index(TsExpr::string(field))
    }
}

/// `object?.field`, bracketed when `field` isn't an identifier.
fn optional_field(object: TsExpr, field: &str) -> TsExpr {
    if is_bare_identifier(field) {
        object.optional_member(field)
    } else {
        TsExpr::Index {
            object: Box::new(object),
            index: Box::new(TsExpr::string(field)),
            optional: true,
        }
    }
}

/// `one?.<records>?.length`
fn records_length(records_key: &str) -> TsExpr {
    optional_field(TsExpr::ident("one"), records_key).optional_member("length")
}
