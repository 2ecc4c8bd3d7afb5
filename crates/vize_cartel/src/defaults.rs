//! Default value mining.
//!
//! Types erase default values, so they are recovered from the component's
//! declaration syntax instead:
//!
//! - options objects: `props: { foo: { type: Number, default: 1 } }`
//! - `withDefaults(defineProps<Props>(), { foo: 1 })`
//! - `defineProps({ foo: { type: Number, default: 1 } })`
//! - `const { foo = 1 } = defineProps<Props>()`
//! - `defineModel('count', { default: 0 })`
//!
//! Mining is best-effort: anything that does not parse or does not match one
//! of the shapes above yields no default.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, CallExpression, Declaration, Expression, ObjectExpression, ObjectPattern,
    ObjectProperty, ObjectPropertyKind, Program, PropertyKey, PropertyKind, Statement,
};
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use vize_carton::FxHashMap;

use crate::options::PrinterOptions;
use crate::sfc;

/// `default` and `required` read from one prop declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropOption {
    /// Default value expression.
    pub default: Option<String>,
    /// Literal `required: true | false`.
    pub required: Option<bool>,
}

/// What the declaration syntax says about a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSyntax {
    /// `name` option or `defineOptions({ name })`.
    pub name: Option<String>,
    /// Per-prop options keyed by prop name.
    pub props: FxHashMap<String, PropOption>,
}

impl ComponentSyntax {
    /// Default expression of a prop, if any.
    pub fn default_of(&self, prop: &str) -> Option<&str> {
        self.props
            .get(prop)
            .and_then(|option| option.default.as_deref())
    }
}

/// Mine a `.vue` file.
///
/// `<script setup>` macros are read first; options of the `<script>` block's
/// default export override them.
pub fn read_vue_component(
    source: &str,
    force_typed: bool,
    printer: Option<&PrinterOptions>,
) -> ComponentSyntax {
    let blocks = sfc::split_scripts(source);
    let mut result = ComponentSyntax::default();

    if let Some(setup) = blocks.script_setup {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, setup.content, setup.source_type(force_typed)).parse();
        if ret.panicked {
            tracing::debug!("could not parse <script setup>, skipping default mining");
        } else {
            result = read_script_setup(&ret.program, setup.content, printer);
        }
    }

    if let Some(script) = blocks.script {
        let options = read_script_component(
            script.content,
            script.source_type(force_typed),
            "default",
            printer,
        );
        if result.name.is_none() {
            result.name = options.name;
        }
        result.props.extend(options.props);
    }

    result
}

/// Mine the options object of `export_name` in a script file.
pub fn read_script_component(
    source: &str,
    source_type: SourceType,
    export_name: &str,
    printer: Option<&PrinterOptions>,
) -> ComponentSyntax {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked {
        tracing::debug!("could not parse script, skipping default mining");
        return ComponentSyntax::default();
    }

    let Some(options) = find_component_options(&ret.program, export_name) else {
        return ComponentSyntax::default();
    };

    let mut result = ComponentSyntax {
        name: read_string_option(options, "name"),
        props: FxHashMap::default(),
    };
    if let Some(Expression::ObjectExpression(props)) =
        find_property(options, "props").map(|p| &p.value)
    {
        result.props = resolve_props_option(props, source, printer);
    }
    result
}

/// Read `default`/`required` from the source text of a prop options object.
pub fn read_prop_option_source(source: &str, printer: Option<&PrinterOptions>) -> PropOption {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::ts()).parse_expression();
    match ret {
        Ok(Expression::ObjectExpression(obj)) => read_prop_option(&obj, source, printer),
        Ok(_) => PropOption::default(),
        Err(_) => {
            tracing::debug!("could not parse prop options `{}`", source);
            PropOption::default()
        }
    }
}

/// Compile macros found at the top level of `<script setup>`.
#[derive(Default)]
struct SetupMacros<'a> {
    with_defaults: Option<&'a ObjectExpression<'a>>,
    props_options: Option<&'a ObjectExpression<'a>>,
    destructure: Option<&'a ObjectPattern<'a>>,
    models: Vec<(String, &'a ObjectExpression<'a>)>,
    name: Option<String>,
}

impl<'a> SetupMacros<'a> {
    fn collect(program: &'a Program<'a>) -> Self {
        let mut macros = Self::default();
        for stmt in program.body.iter() {
            match stmt {
                Statement::ExpressionStatement(stmt) => macros.visit(&stmt.expression, None),
                Statement::VariableDeclaration(var) => {
                    for declarator in var.declarations.iter() {
                        if let Some(init) = &declarator.init {
                            macros.visit(init, Some(&declarator.id));
                        }
                    }
                }
                _ => {}
            }
        }
        macros
    }

    fn visit(&mut self, expr: &'a Expression<'a>, binding: Option<&'a BindingPattern<'a>>) {
        let Some(call) = extract_call_expression(expr) else {
            return;
        };
        match callee_name(call) {
            Some("withDefaults") => {
                self.with_defaults = call
                    .arguments
                    .get(1)
                    .and_then(|arg| arg.as_expression().and_then(extract_object_expression));
            }
            Some("defineProps") => {
                self.props_options = first_object_argument(call);
                if let Some(BindingPattern::ObjectPattern(pattern)) = binding {
                    self.destructure = Some(&**pattern);
                }
            }
            Some("defineModel") => {
                let name = call
                    .arguments
                    .first()
                    .and_then(|arg| match arg.as_expression() {
                        Some(Expression::StringLiteral(lit)) => Some(lit.value.to_string()),
                        _ => None,
                    })
                    .unwrap_or_else(|| "modelValue".to_string());
                let options = call
                    .arguments
                    .iter()
                    .find_map(|arg| arg.as_expression().and_then(extract_object_expression));
                if let Some(options) = options {
                    self.models.push((name, options));
                }
            }
            Some("defineOptions") => {
                self.name = first_object_argument(call)
                    .and_then(|options| read_string_option(options, "name"));
            }
            _ => {}
        }
    }
}

fn read_script_setup(
    program: &Program<'_>,
    source: &str,
    printer: Option<&PrinterOptions>,
) -> ComponentSyntax {
    let macros = SetupMacros::collect(program);
    let mut props: FxHashMap<String, PropOption> = FxHashMap::default();

    // First match wins, no merging between the three forms.
    if let Some(defaults) = macros.with_defaults {
        for prop in object_properties(defaults) {
            let Some(name) = resolve_object_key(&prop.key) else {
                continue;
            };
            let default = resolve_default_option(&prop.value);
            props.insert(
                name,
                PropOption {
                    default: Some(expression_text(default, source, printer)),
                    required: None,
                },
            );
        }
    } else if let Some(options) = macros.props_options {
        props = resolve_props_option(options, source, printer);
    } else if let Some(pattern) = macros.destructure {
        for prop in pattern.properties.iter() {
            let Some(name) = resolve_object_key(&prop.key) else {
                continue;
            };
            if let BindingPattern::AssignmentPattern(assign) = &prop.value {
                props.insert(
                    name,
                    PropOption {
                        default: Some(expression_text(&assign.right, source, printer)),
                        required: None,
                    },
                );
            }
        }
    }

    for (name, options) in macros.models {
        props.insert(name, read_prop_option(options, source, printer));
    }

    ComponentSyntax {
        name: macros.name,
        props,
    }
}

/// `{ foo: { default, required }, bar: String }`
fn resolve_props_option(
    props: &ObjectExpression<'_>,
    source: &str,
    printer: Option<&PrinterOptions>,
) -> FxHashMap<String, PropOption> {
    let mut result = FxHashMap::default();
    for prop in object_properties(props) {
        let Some(name) = resolve_object_key(&prop.key) else {
            continue;
        };
        if let Expression::ObjectExpression(options) = &prop.value {
            result.insert(name, read_prop_option(options, source, printer));
        }
    }
    result
}

fn read_prop_option(
    options: &ObjectExpression<'_>,
    source: &str,
    printer: Option<&PrinterOptions>,
) -> PropOption {
    let mut result = PropOption::default();
    if let Some(required) = find_property(options, "required") {
        if let Expression::BooleanLiteral(lit) = &required.value {
            result.required = Some(lit.value);
        }
    }
    if let Some(default) = find_property(options, "default") {
        let expr = resolve_default_option(&default.value);
        result.default = Some(expression_text(expr, source, printer));
    }
    result
}

/// Unwrap factory defaults: `() => expr` and `() => (expr)` yield `expr`.
/// Block-bodied arrows are kept as they are.
fn resolve_default_option<'b, 'a>(expr: &'b Expression<'a>) -> &'b Expression<'a> {
    let Expression::ArrowFunctionExpression(arrow) = expr else {
        return expr;
    };
    if !arrow.expression {
        return expr;
    }
    match arrow.body.statements.first() {
        Some(Statement::ExpressionStatement(stmt)) => match &stmt.expression {
            Expression::ParenthesizedExpression(paren) => &paren.expression,
            body => body,
        },
        _ => expr,
    }
}

/// Options object of a component export.
///
/// `export default { .. }`, `export default defineComponent({ .. })`, and
/// `export const Name = defineComponent({ .. })`.
fn find_component_options<'a>(
    program: &'a Program<'a>,
    export_name: &str,
) -> Option<&'a ObjectExpression<'a>> {
    let mut component: Option<&'a Expression<'a>> = None;
    for stmt in program.body.iter() {
        match stmt {
            Statement::ExportDefaultDeclaration(decl) if export_name == "default" => {
                if let Some(expr) = decl.declaration.as_expression() {
                    component = Some(expr);
                }
            }
            Statement::ExportNamedDeclaration(decl) if export_name != "default" => {
                let Some(Declaration::VariableDeclaration(var)) = &decl.declaration else {
                    continue;
                };
                for declarator in var.declarations.iter() {
                    if let BindingPattern::BindingIdentifier(id) = &declarator.id {
                        if id.name.as_str() == export_name {
                            component = declarator.init.as_ref();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let component = component?;
    if let Some(obj) = extract_object_expression(component) {
        return Some(obj);
    }
    extract_call_expression(component).and_then(first_object_argument)
}

fn extract_call_expression<'a>(expr: &'a Expression<'a>) -> Option<&'a CallExpression<'a>> {
    match expr {
        Expression::CallExpression(call) => Some(call),
        Expression::TSAsExpression(ts_as) => extract_call_expression(&ts_as.expression),
        Expression::TSSatisfiesExpression(ts_satisfies) => {
            extract_call_expression(&ts_satisfies.expression)
        }
        Expression::TSNonNullExpression(ts_non_null) => {
            extract_call_expression(&ts_non_null.expression)
        }
        Expression::ParenthesizedExpression(paren) => extract_call_expression(&paren.expression),
        _ => None,
    }
}

fn extract_object_expression<'a>(expr: &'a Expression<'a>) -> Option<&'a ObjectExpression<'a>> {
    match expr {
        Expression::ObjectExpression(obj) => Some(obj),
        Expression::TSAsExpression(ts_as) => extract_object_expression(&ts_as.expression),
        Expression::TSSatisfiesExpression(ts_satisfies) => {
            extract_object_expression(&ts_satisfies.expression)
        }
        Expression::ParenthesizedExpression(paren) => extract_object_expression(&paren.expression),
        _ => None,
    }
}

fn first_object_argument<'a>(call: &'a CallExpression<'a>) -> Option<&'a ObjectExpression<'a>> {
    call.arguments
        .first()
        .and_then(|arg| arg.as_expression())
        .and_then(extract_object_expression)
}

fn callee_name<'a>(call: &'a CallExpression<'_>) -> Option<&'a str> {
    match &call.callee {
        Expression::Identifier(id) => Some(id.name.as_str()),
        _ => None,
    }
}

/// `key: value` entries; shorthands, methods, accessors and spreads are skipped.
fn object_properties<'b, 'a>(
    obj: &'b ObjectExpression<'a>,
) -> impl Iterator<Item = &'b ObjectProperty<'a>> {
    obj.properties.iter().filter_map(|prop| match prop {
        ObjectPropertyKind::ObjectProperty(p)
            if !p.shorthand && !p.method && p.kind == PropertyKind::Init =>
        {
            Some(&**p)
        }
        _ => None,
    })
}

fn find_property<'b, 'a>(
    obj: &'b ObjectExpression<'a>,
    name: &str,
) -> Option<&'b ObjectProperty<'a>> {
    object_properties(obj).find(|p| resolve_object_key(&p.key).as_deref() == Some(name))
}

fn read_string_option(obj: &ObjectExpression<'_>, name: &str) -> Option<String> {
    match find_property(obj, name).map(|p| &p.value) {
        Some(Expression::StringLiteral(lit)) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn resolve_object_key(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        PropertyKey::NumericLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// Source text of `expr`, re-printed when printer options are set.
fn expression_text(
    expr: &Expression<'_>,
    source: &str,
    printer: Option<&PrinterOptions>,
) -> String {
    let span = expr.span();
    let text = &source[span.start as usize..span.end as usize];
    match printer {
        Some(printer) => print_expression(text, printer).unwrap_or_else(|| text.to_string()),
        None => text.to_string(),
    }
}

fn print_expression(text: &str, printer: &PrinterOptions) -> Option<String> {
    const PREFIX: &str = "const _default_ = ";

    let mut wrapped = String::with_capacity(PREFIX.len() + text.len() + 1);
    wrapped.push_str(PREFIX);
    wrapped.push_str(text);
    wrapped.push(';');

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &wrapped, SourceType::ts()).parse();
    if !ret.errors.is_empty() {
        return None;
    }

    let code = Codegen::new()
        .with_options(CodegenOptions {
            single_quote: printer.single_quote,
            minify: printer.minify,
            ..CodegenOptions::default()
        })
        .build(&ret.program)
        .code;

    // Minified output drops the spaces around `=`.
    let start = code.find('=')? + 1;
    let end = code.rfind(';').unwrap_or(code.len());
    (start <= end).then(|| code[start..end].trim().to_string())
}
