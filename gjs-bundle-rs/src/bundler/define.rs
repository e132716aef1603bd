//! Compile-time constants substituted into bundled code.

use deno_ast::swc::ast::{Expr, Ident, IdentName, KeyValueProp, Lit, Prop, PropName, Str};
use deno_ast::swc::common::{Mark, Span};
use deno_ast::swc::ecma_visit::{VisitMut, VisitMutWith};

/// A global identifier replaced by a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: String,
}

impl Define {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Replaces unbound references to defined names.
///
/// Must run after the resolver pass, since only identifiers carrying the unresolved
/// mark are global references. Local bindings that shadow a define are left alone.
pub(crate) struct DefineReplacer<'a> {
    defines: &'a [Define],
    unresolved: Mark,
}

impl<'a> DefineReplacer<'a> {
    pub fn new(defines: &'a [Define], unresolved: Mark) -> Self {
        Self {
            defines,
            unresolved,
        }
    }

    fn lookup(&self, ident: &Ident) -> Option<&'a str> {
        if ident.ctxt.outer() != self.unresolved {
            return None;
        }
        self.defines
            .iter()
            .find(|define| &*ident.sym == define.name.as_str())
            .map(|define| define.value.as_str())
    }
}

fn string_literal(value: &str, span: Span) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(Str {
        span,
        value: value.into(),
        raw: None,
    })))
}

impl VisitMut for DefineReplacer<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if let Expr::Ident(ident) = expr {
            if let Some(value) = self.lookup(ident) {
                *expr = *string_literal(value, ident.span);
                return;
            }
        }
        expr.visit_mut_children_with(self);
    }

    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        // `{ SRC }` needs to become `{ SRC: "..." }`
        if let Prop::Shorthand(ident) = prop {
            if let Some(value) = self.lookup(ident) {
                *prop = Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName::new(ident.sym.clone(), ident.span)),
                    value: string_literal(value, ident.span),
                });
                return;
            }
        }
        prop.visit_mut_children_with(self);
    }
}
