//! Interpretation of the exported component definition.
//!
//! A Ractive component keeps its behavior in an object literal assigned to
//! `component.exports`. The literal is parsed with swc to learn its shape
//! (nothing is evaluated), each member's text is carved out with
//! [`extract`], and members are re-emitted as Svelte component script by
//! role:
//!
//! | member | emitted as |
//! |---|---|
//! | `onrender`, `oncomplete` | `onMount(...)` |
//! | `onteardown`, `onunrender`, `ondestruct` | `onDestroy(...)` |
//! | `oninit`, `onconfig` | body inlined into the script |
//! | `data` | `export let` fields and local functions |
//! | `computed` | reactive `$:` declarations |
//! | any other function | a component function |
//!
//! Anything that has no direct counterpart is emitted as a follow-up marker.

use crate::context::TransformContext;
use crate::extract::{extract, find_closing, ExtractError};
use crate::naming::to_upper_name;
use crate::rules::RuleSet;
use crate::TODO_MARKER;
use regex::{Captures, Regex};
use std::sync::{Arc, LazyLock};
use swc_common::{FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, EsVersion, Expr, Function, ObjectLit, Prop, PropName,
    PropOrSpread, ReturnStmt, Stmt,
};
use swc_ecma_parser::{parse_file_as_expr, EsSyntax, Syntax};
use thiserror::Error;

/// The assignment target holding a component definition.
pub const COMPONENT_EXPORT: &str = "component.exports";

static EXPORT_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"component\.exports\s*=\s*").expect("valid regex"));
static FIND_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"this\.findComponent\(\s*['"]([a-zA-Z0-9_-]+)['"]\s*\)"#).expect("valid regex")
});

const MOUNT_HOOKS: &[&str] = &["onrender", "oncomplete"];
const DESTROY_HOOKS: &[&str] = &["onteardown", "onunrender", "ondestruct"];
const INIT_HOOKS: &[&str] = &["oninit", "onconfig"];
/// Options whose Svelte behavior is already the default.
const INERT_OPTIONS: &[&str] = &["isolated", "twoway", "lazy", "magic", "modifyArrays", "noIntro"];

/// Errors produced while interpreting a component definition.
#[derive(Debug, Error)]
pub enum LiteralError {
    /// The definition is not valid JavaScript.
    #[error("component definition could not be parsed: {0}")]
    Parse(String),

    /// The definition is not an object literal.
    #[error("component definition is not an object literal")]
    NotAnObject,

    /// A member uses syntax that cannot be carved out by name.
    #[error("unsupported member in component definition: {0}")]
    UnsupportedMember(String),

    /// A member's text could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Svelte component script generated from a component definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScript {
    /// The generated statements.
    pub code: String,
    /// Lifecycle functions to import from `svelte`, in first-use order.
    pub lifecycle: Vec<&'static str>,
    /// Byte offset just past the definition in the interpreted text.
    pub end: usize,
}

/// Replaces the unit's component definition with generated Svelte script.
///
/// The definition runs from `component.exports =` to the end of the object
/// literal; text after it up to `</script>` is kept. When the definition
/// cannot be interpreted it is left in place behind a follow-up marker and a
/// warning is recorded.
pub fn component_literal(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    let Some(assignment) = EXPORT_ASSIGNMENT.find(source) else {
        return source.to_string();
    };
    let region_end = source[assignment.end()..]
        .find("</script>")
        .map_or(source.len(), |at| assignment.end() + at);
    let region = &source[assignment.end()..region_end];

    match interpret(region, rules) {
        Ok(script) => {
            for name in &script.lifecycle {
                cx.import_named(*name, "svelte");
            }
            let rest = &region[script.end..];
            let rest = rest.strip_prefix(';').unwrap_or(rest).trim_end();
            format!(
                "{}\n{}{}\n{}",
                source[..assignment.start()].trim_end(),
                script.code,
                rest,
                &source[region_end..]
            )
        }
        Err(err) => {
            tracing::debug!(error = %err, "component definition left unconverted");
            cx.warn("component-literal", err.to_string());
            format!(
                "{}/* {}: {} */\n{}{}",
                &source[..assignment.start()],
                TODO_MARKER,
                err,
                rules.indent(),
                &source[assignment.start()..]
            )
        }
    }
}

/// Interprets the component definition at the start of `text`.
pub fn interpret(text: &str, rules: &RuleSet) -> Result<ComponentScript, LiteralError> {
    let parsed = ParsedLiteral::parse(text)?;
    let object = as_object(&parsed.expr).ok_or(LiteralError::NotAnObject)?;
    let members = parsed.members(object, rules.indent())?;
    let mut emitter = Emitter::new(&parsed, rules.indent());

    for member in with_keys(&members, MOUNT_HOOKS) {
        emitter.hook("onMount", member)?;
    }
    for member in with_keys(&members, DESTROY_HOOKS) {
        emitter.hook("onDestroy", member)?;
    }
    for member in with_keys(&members, &["data"]) {
        emitter.data(member)?;
    }
    for member in with_keys(&members, INIT_HOOKS) {
        emitter.init(member)?;
    }
    for member in with_keys(&members, &["computed"]) {
        emitter.computed(member)?;
    }

    let reserved = |key: &str| {
        MOUNT_HOOKS.contains(&key)
            || DESTROY_HOOKS.contains(&key)
            || INIT_HOOKS.contains(&key)
            || key == "data"
            || key == "computed"
    };
    for member in members.iter().filter(|member| !reserved(&member.key)) {
        if member.shape.is_function() {
            emitter.method(member)?;
        } else if !INERT_OPTIONS.contains(&member.key.as_str()) {
            emitter.follow_up(&format!("COMPONENT OPTION \"{}\"", member.key));
        }
    }

    let code = rewrite_instance_idioms(&emitter.out);
    Ok(ComponentScript {
        code: code.trim_start_matches('\n').trim_end().to_string(),
        lifecycle: emitter.lifecycle,
        end: parsed.offset(parsed.expr.span().hi),
    })
}

struct ParsedLiteral<'a> {
    text: &'a str,
    expr: Box<Expr>,
    file_start: u32,
}

impl<'a> ParsedLiteral<'a> {
    fn parse(text: &'a str) -> Result<Self, LiteralError> {
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom(COMPONENT_EXPORT.to_string()).into(),
            text.to_string(),
        );

        let mut errors = Vec::new();
        let expr = parse_file_as_expr(
            &fm,
            Syntax::Es(EsSyntax::default()),
            EsVersion::Es2022,
            None,
            &mut errors,
        )
        .map_err(|e| LiteralError::Parse(format!("{:?}", e.kind())))?;
        if let Some(error) = errors.first() {
            return Err(LiteralError::Parse(format!("{:?}", error.kind())));
        }

        Ok(Self {
            text,
            expr,
            file_start: fm.start_pos.0,
        })
    }

    fn offset(&self, pos: swc_common::BytePos) -> usize {
        (pos.0.saturating_sub(self.file_start) as usize).min(self.text.len())
    }

    fn slice(&self, span: Span) -> &'a str {
        let text: &'a str = self.text;
        text.get(self.offset(span.lo)..self.offset(span.hi))
            .unwrap_or_default()
    }

    fn members<'p>(
        &'p self,
        object: &'p ObjectLit,
        unit: &str,
    ) -> Result<Vec<Member<'p>>, LiteralError>
    where
        'a: 'p,
    {
        let mut members = Vec::with_capacity(object.props.len());
        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                return Err(LiteralError::UnsupportedMember("spread".to_string()));
            };
            let (key, lo, hi, shape) = match prop.as_ref() {
                Prop::Shorthand(ident) => (
                    ident.sym.to_string(),
                    ident.span.lo,
                    ident.span.hi,
                    Shape::Shorthand,
                ),
                Prop::KeyValue(kv) => (
                    key_name(&kv.key)?,
                    kv.key.span().lo,
                    kv.value.span().hi,
                    Shape::of_expr(&kv.value),
                ),
                Prop::Method(method) => (
                    key_name(&method.key)?,
                    method.key.span().lo.min(method.function.span.lo),
                    method.function.span.hi,
                    Shape::Method(&method.function),
                ),
                Prop::Getter(getter) => (
                    key_name(&getter.key)?,
                    getter.span.lo,
                    getter.span.hi,
                    Shape::Accessor,
                ),
                Prop::Setter(setter) => (
                    key_name(&setter.key)?,
                    setter.span.lo,
                    setter.span.hi,
                    Shape::Accessor,
                ),
                Prop::Assign(_) => {
                    return Err(LiteralError::UnsupportedMember("assignment".to_string()))
                }
            };

            let start = self.offset(lo);
            members.push(Member {
                key,
                source: self.text.get(start..self.offset(hi)).unwrap_or_default(),
                levels: indent_levels(self.text, start, unit),
                shape,
            });
        }
        Ok(members)
    }
}

fn with_keys<'m, 'p>(
    members: &'m [Member<'p>],
    keys: &'static [&'static str],
) -> impl Iterator<Item = &'m Member<'p>> {
    members
        .iter()
        .filter(move |member| keys.contains(&member.key.as_str()))
}

fn key_name(key: &PropName) -> Result<String, LiteralError> {
    match key {
        PropName::Ident(ident) => Ok(ident.sym.to_string()),
        other => Err(LiteralError::UnsupportedMember(format!(
            "non-identifier key {:?}",
            other
        ))),
    }
}

/// One member of a definition object.
struct Member<'p> {
    key: String,
    /// From the key to the end of the value.
    source: &'p str,
    /// Indent units before the key's line.
    levels: usize,
    shape: Shape<'p>,
}

impl Member<'_> {
    /// The value text as written.
    fn definition(&self) -> Result<&str, LiteralError> {
        Ok(extract(self.source, &self.key)?.as_str())
    }

    /// Indent levels to remove so the member's lines sit one level deep.
    fn shift(&self) -> usize {
        self.levels.saturating_sub(1)
    }
}

enum Shape<'p> {
    Shorthand,
    Method(&'p Function),
    FnExpr(&'p Function),
    Arrow(&'p ArrowExpr),
    Object(&'p ObjectLit),
    Accessor,
    Value,
}

impl<'p> Shape<'p> {
    fn of_expr(expr: &'p Expr) -> Self {
        match expr {
            Expr::Paren(paren) => Self::of_expr(&paren.expr),
            Expr::Fn(function) => Self::FnExpr(&function.function),
            Expr::Arrow(arrow) => Self::Arrow(arrow),
            Expr::Object(object) => Self::Object(object),
            _ => Self::Value,
        }
    }

    fn is_function(&self) -> bool {
        matches!(self, Self::Method(_) | Self::FnExpr(_) | Self::Arrow(_))
    }

    fn is_async(&self) -> bool {
        match self {
            Self::Method(function) | Self::FnExpr(function) => function.is_async,
            _ => false,
        }
    }

    /// The block body of a function-like member.
    fn block(&self) -> Option<&'p BlockStmt> {
        match self {
            Self::Method(function) | Self::FnExpr(function) => function.body.as_ref(),
            Self::Arrow(arrow) => match arrow.body.as_ref() {
                BlockStmtOrExpr::BlockStmt(block) => Some(block),
                BlockStmtOrExpr::Expr(_) => None,
            },
            _ => None,
        }
    }

    /// The object a `data` member provides: the literal itself, or the
    /// object returned by a function.
    fn data_object(&self) -> Option<&'p ObjectLit> {
        match self {
            Self::Object(object) => Some(object),
            Self::Arrow(arrow) => match arrow.body.as_ref() {
                BlockStmtOrExpr::Expr(expr) => as_object(expr),
                BlockStmtOrExpr::BlockStmt(block) => returned_object(block),
            },
            _ => self.block().and_then(returned_object),
        }
    }
}

fn as_object(expr: &Expr) -> Option<&ObjectLit> {
    match expr {
        Expr::Object(object) => Some(object),
        Expr::Paren(paren) => as_object(&paren.expr),
        _ => None,
    }
}

fn returned_object(block: &BlockStmt) -> Option<&ObjectLit> {
    block.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Return(ReturnStmt { arg: Some(arg), .. }) => as_object(arg),
        _ => None,
    })
}

struct Emitter<'p, 'a> {
    parsed: &'p ParsedLiteral<'a>,
    unit: &'p str,
    out: String,
    lifecycle: Vec<&'static str>,
}

impl<'p, 'a> Emitter<'p, 'a> {
    fn new(parsed: &'p ParsedLiteral<'a>, unit: &'p str) -> Self {
        Self {
            parsed,
            unit,
            out: String::new(),
            lifecycle: Vec::new(),
        }
    }

    fn hook(&mut self, hook: &'static str, member: &Member<'_>) -> Result<(), LiteralError> {
        let Some(closure) = self.closure(member)? else {
            self.follow_up(&format!("LIFECYCLE \"{}\" IS NOT A FUNCTION", member.key));
            return Ok(());
        };
        if !self.lifecycle.contains(&hook) {
            self.lifecycle.push(hook);
        }
        self.out
            .push_str(&format!("{}{}({})\n", self.unit, hook, closure));
        Ok(())
    }

    fn data(&mut self, member: &Member<'_>) -> Result<(), LiteralError> {
        let Some(object) = member.shape.data_object() else {
            self.follow_up("DATA IS NOT AN OBJECT");
            return Ok(());
        };
        if let Some(block) = member.shape.block() {
            if block.stmts.len() > 1 {
                self.follow_up("STATEMENTS BEFORE THE DATA OBJECT WERE DROPPED");
            }
        }

        let parsed = self.parsed;
        for field in parsed.members(object, self.unit)? {
            let unit = self.unit;
            match &field.shape {
                Shape::Shorthand => {
                    self.follow_up(&format!(
                        "\"{}\" WAS INITIALIZED FROM A BINDING OF THE SAME NAME",
                        field.key
                    ));
                    self.out
                        .push_str(&format!("{}export let {}\n", unit, field.key));
                }
                Shape::Method(_) | Shape::FnExpr(_) => {
                    let declaration = self.function_declaration(&field)?;
                    self.out.push_str(&format!("{}{}\n", unit, declaration));
                }
                Shape::Arrow(_) => {
                    let definition = deindent(field.definition()?, field.shift(), unit);
                    self.out
                        .push_str(&format!("{}let {} = {}\n", unit, field.key, definition));
                }
                Shape::Accessor => {
                    self.follow_up(&format!("DATA ACCESSOR \"{}\"", field.key));
                }
                Shape::Object(_) | Shape::Value => {
                    let definition = deindent(field.definition()?, field.shift(), unit);
                    self.out.push_str(&format!(
                        "{}export let {} = {}\n",
                        unit, field.key, definition
                    ));
                }
            }
        }
        Ok(())
    }

    fn init(&mut self, member: &Member<'_>) -> Result<(), LiteralError> {
        let body = match (member.shape.block(), &member.shape) {
            (Some(block), _) => {
                let text = self.parsed.slice(block.span);
                let inner = text
                    .strip_prefix('{')
                    .and_then(|t| t.strip_suffix('}'))
                    .unwrap_or(text);
                deindent(inner.trim(), member.levels, self.unit)
            }
            (None, Shape::Arrow(arrow)) => match arrow.body.as_ref() {
                BlockStmtOrExpr::Expr(expr) => {
                    deindent(self.parsed.slice(expr.span()), member.levels, self.unit)
                }
                BlockStmtOrExpr::BlockStmt(_) => String::new(),
            },
            _ => {
                self.follow_up(&format!("\"{}\" IS NOT A FUNCTION", member.key));
                return Ok(());
            }
        };
        if !body.is_empty() {
            self.out.push_str(&format!("\n{}{}\n", self.unit, body));
        }
        Ok(())
    }

    fn computed(&mut self, member: &Member<'_>) -> Result<(), LiteralError> {
        let Shape::Object(object) = &member.shape else {
            self.follow_up("COMPUTED IS NOT AN OBJECT");
            return Ok(());
        };

        let parsed = self.parsed;
        for property in parsed.members(object, self.unit)? {
            if let Some(closure) = self.closure(&property)? {
                self.reactive(&property.key, &closure);
                continue;
            }

            let Shape::Object(accessors) = &property.shape else {
                self.follow_up(&format!("COMPUTED \"{}\"", property.key));
                continue;
            };
            let accessors = parsed.members(accessors, self.unit)?;
            if accessors.iter().any(|a| a.key == "set") {
                self.follow_up(&format!("COMPUTED \"{}\" HAS A SETTER", property.key));
            }
            let getter = accessors.iter().find(|a| a.key == "get");
            match getter.map(|get| self.closure(get)).transpose()?.flatten() {
                Some(closure) => self.reactive(&property.key, &closure),
                None => self.follow_up(&format!("COMPUTED \"{}\" HAS NO GETTER", property.key)),
            }
        }
        Ok(())
    }

    fn method(&mut self, member: &Member<'_>) -> Result<(), LiteralError> {
        let text = match member.shape {
            Shape::Arrow(_) => format!(
                "const {} = {}",
                member.key,
                deindent(member.definition()?, member.shift(), self.unit)
            ),
            _ => self.function_declaration(member)?,
        };
        self.out.push_str(&format!("\n{}{}\n", self.unit, text));
        Ok(())
    }

    fn reactive(&mut self, key: &str, closure: &str) {
        self.out
            .push_str(&format!("\n{}$: {} = ({})()\n", self.unit, key, closure));
    }

    fn follow_up(&mut self, what: &str) {
        self.out
            .push_str(&format!("{}/* {}: {} */\n", self.unit, TODO_MARKER, what));
    }

    /// The member's function as an arrow function, or `None` when the member
    /// is not function-like.
    fn closure(&self, member: &Member<'_>) -> Result<Option<String>, LiteralError> {
        if !member.shape.is_function() {
            return Ok(None);
        }
        let arrow = to_arrow(member.definition()?);
        let arrow = if member.shape.is_async() {
            format!("async {}", arrow)
        } else {
            arrow
        };
        Ok(Some(deindent(&arrow, member.shift(), self.unit)))
    }

    /// `function name(params) { body }` for a method or function member.
    fn function_declaration(&self, member: &Member<'_>) -> Result<String, LiteralError> {
        let definition = member.definition()?;
        let tail = definition
            .find('(')
            .map_or(definition, |open| &definition[open..]);
        let prefix = if member.shape.is_async() { "async " } else { "" };
        Ok(deindent(
            &format!("{}function {}{}", prefix, member.key, tail),
            member.shift(),
            self.unit,
        ))
    }
}

/// Rewrites a function definition as an arrow function.
///
/// `function name(a) { ... }` and `(a) { ... }` both become
/// `(a) => { ... }`; arrow functions are returned unchanged.
pub fn to_arrow(definition: &str) -> String {
    let rest = definition.trim();
    let rest = rest
        .strip_prefix("async")
        .filter(|r| r.starts_with(char::is_whitespace) || r.starts_with('('))
        .map_or(rest, str::trim_start);
    let rest = match rest.strip_prefix("function") {
        Some(after) => after.trim_start_matches(|c: char| c != '('),
        None => rest,
    };

    if !rest.starts_with('(') {
        return rest.to_string();
    }
    let Some(close) = find_closing(rest, 0) else {
        return rest.to_string();
    };
    let after = rest[close + 1..].trim_start();
    if after.starts_with("=>") {
        rest.to_string()
    } else {
        format!("{} => {}", &rest[..=close], after)
    }
}

/// Counts the indent units that open the line containing `offset`.
fn indent_levels(text: &str, offset: usize, unit: &str) -> usize {
    if unit.is_empty() {
        return 0;
    }
    let line_start = text[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    let mut rest = &text[line_start..offset];
    let mut levels = 0;
    while let Some(after) = rest.strip_prefix(unit) {
        levels += 1;
        rest = after;
    }
    levels
}

/// Removes up to `levels` indent units from every line but the first.
fn deindent(text: &str, levels: usize, unit: &str) -> String {
    if levels == 0 || unit.is_empty() {
        return text.to_string();
    }
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        let mut rest = line;
        for _ in 0..levels {
            match rest.strip_prefix(unit) {
                Some(after) => rest = after,
                None => break,
            }
        }
        out.push('\n');
        out.push_str(rest);
    }
    out
}

/// Rewrites instance lookups that have no Svelte equivalent.
fn rewrite_instance_idioms(code: &str) -> String {
    let code = FIND_COMPONENT.replace_all(code, |caps: &Captures| to_upper_name(&caps[1]));

    let mut out = String::with_capacity(code.len());
    for line in code.split_inclusive('\n') {
        if line.contains("this.find(") || line.contains("this.findAll(") {
            let indent = &line[..line.len() - line.trim_start().len()];
            out.push_str(&format!(
                "{}/* {}: `bind:this={{myEl}}` FOR THIS.FIND */\n",
                indent, TODO_MARKER
            ));
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    fn convert(source: &str) -> (String, TransformContext) {
        let mut cx = TransformContext::new();
        let out = component_literal(source, &mut cx, &rules());
        (out, cx)
    }

    #[test]
    fn arrow_conversion() {
        assert_eq!(to_arrow("(a, b) {\n\treturn a\n}"), "(a, b) => {\n\treturn a\n}");
        assert_eq!(to_arrow("function named(x) { x() }"), "(x) => { x() }");
        assert_eq!(to_arrow("async function () {}"), "() => {}");
        assert_eq!(to_arrow("(x) => x * 2"), "(x) => x * 2");
        assert_eq!(to_arrow("x => x"), "x => x");
    }

    #[test]
    fn lifecycle_hooks() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tonrender() {\n\t\t\tstart()\n\t\t},\n\t\tonteardown: function () {\n\t\t\tstop()\n\t\t}\n\t}\n</script>";
        let (out, cx) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tonMount(() => {\n\t\tstart()\n\t})\n\tonDestroy(() => {\n\t\tstop()\n\t})\n</script>"
        );
        let imports: Vec<String> = cx.imports().iter().map(ToString::to_string).collect();
        assert_eq!(imports, vec!["import { onMount, onDestroy } from 'svelte'"]);
    }

    #[test]
    fn data_fields() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tdata() {\n\t\t\treturn {\n\t\t\t\ttitle: 'Hello',\n\t\t\t\titems: [1, 2],\n\t\t\t\tshout: (s) => s.toUpperCase(),\n\t\t\t\tformat(value) {\n\t\t\t\t\treturn value\n\t\t\t\t},\n\t\t\t}\n\t\t}\n\t};\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\texport let title = 'Hello'\n\texport let items = [1, 2]\n\tlet shout = (s) => s.toUpperCase()\n\tfunction format(value) {\n\t\treturn value\n\t}\n</script>"
        );
    }

    #[test]
    fn shorthand_data_field_gets_marker() {
        let source = "<script>\ncomponent.exports = {\n\tdata: { user }\n}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\t/* TODO CONVERT: \"user\" WAS INITIALIZED FROM A BINDING OF THE SAME NAME */\n\texport let user\n</script>"
        );
    }

    #[test]
    fn init_body_is_inlined() {
        let source = "<script>\n\tcomponent.exports = {\n\t\toninit() {\n\t\t\tload()\n\t\t\tif (ready) {\n\t\t\t\tgo()\n\t\t\t}\n\t\t}\n\t}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tload()\n\tif (ready) {\n\t\tgo()\n\t}\n</script>"
        );
    }

    #[test]
    fn computed_become_reactive_declarations() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tcomputed: {\n\t\t\tcount() {\n\t\t\t\treturn items.length\n\t\t\t},\n\t\t\ttotal: {\n\t\t\t\tget: () => a + b\n\t\t\t}\n\t\t}\n\t}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\t$: count = (() => {\n\t\treturn items.length\n\t})()\n\n\t$: total = (() => a + b)()\n</script>"
        );
    }

    #[test]
    fn methods_become_functions() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tisolated: true,\n\t\tasync save(item) {\n\t\t\tawait api.save(item)\n\t\t},\n\t\treset: () => clear()\n\t}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tasync function save(item) {\n\t\tawait api.save(item)\n\t}\n\n\tconst reset = () => clear()\n</script>"
        );
    }

    #[test]
    fn regex_literals_in_methods() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tclean(s) {\n\t\t\treturn s.replace(/'/g, '')\n\t\t},\n\t\tother() {}\n\t}\n</script>";
        let (out, cx) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tfunction clean(s) {\n\t\treturn s.replace(/'/g, '')\n\t}\n\n\tfunction other() {}\n</script>"
        );
        assert!(cx.warnings().is_empty());
    }

    #[test]
    fn unknown_options_get_markers() {
        let source = "<script>\ncomponent.exports = {\n\ttemplate: '#tpl'\n}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\t/* TODO CONVERT: COMPONENT OPTION \"template\" */\n</script>"
        );
    }

    #[test]
    fn trailing_code_is_kept() {
        let source = "<script>\ncomponent.exports = {\n\tclose() {}\n};\n\nfunction helper() {}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tfunction close() {}\n\nfunction helper() {}\n</script>"
        );
    }

    #[test]
    fn instance_idioms() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tfocus() {\n\t\t\tthis.findComponent('input-text').focus()\n\t\t\tthis.find('input').select()\n\t\t}\n\t}\n</script>";
        let (out, _) = convert(source);
        assert_eq!(
            out,
            "<script>\n\tfunction focus() {\n\t\tInputText.focus()\n\t\t/* TODO CONVERT: `bind:this={myEl}` FOR THIS.FIND */\n\t\tthis.find('input').select()\n\t}\n</script>"
        );
    }

    #[test]
    fn invalid_definition_is_left_with_warning() {
        let source = "<script>\n\tcomponent.exports = {\n\t\tsave( {\n\t}\n</script>";
        let (out, cx) = convert(source);
        assert!(out.starts_with("<script>\n\t/* TODO CONVERT: "));
        assert!(out.contains("\n\tcomponent.exports = {"));
        assert_eq!(cx.warnings().len(), 1);
        assert_eq!(cx.warnings()[0].pass, "component-literal");
    }

    #[test]
    fn non_object_definition_is_rejected() {
        let err = interpret("createComponent()", &rules()).unwrap_err();
        assert!(matches!(err, LiteralError::NotAnObject));
    }

    #[test]
    fn units_without_definition_are_untouched() {
        let source = "<p>{{x}}</p>";
        assert_eq!(convert(source).0, source);
    }

    #[test]
    fn indentation_helpers() {
        assert_eq!(indent_levels("a\n\t\tkey", 4, "\t"), 2);
        assert_eq!(deindent("x\n\t\t\ty\n\tz", 2, "\t"), "x\n\ty\nz");
    }
}
