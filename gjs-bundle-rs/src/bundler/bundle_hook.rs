use deno_ast::swc::ast::{
    Bool, Expr, KeyValueProp, Lit, MemberExpr, MemberProp, MetaPropExpr, MetaPropKind, PropName,
};
use deno_ast::swc::bundler::{Hook, ModuleRecord};
use deno_ast::swc::common::Span;
use deno_core::anyhow;

/// Rewrites `import.meta` inside inlined modules.
///
/// `import.meta.url` keeps pointing at the bundle as installed, since GJS code derives
/// resource paths from it. Only the entry module keeps the runtime's `import.meta.main`.
pub struct BundleHook;

impl Hook for BundleHook {
    fn get_import_meta_props(
        &self,
        span: Span,
        module_record: &ModuleRecord,
    ) -> Result<Vec<KeyValueProp>, anyhow::Error> {
        let main = if module_record.is_entry {
            import_meta_member(span, "main")
        } else {
            Expr::Lit(Lit::Bool(Bool { span, value: false }))
        };

        Ok(vec![
            meta_prop("url", import_meta_member(span, "url")),
            meta_prop("main", main),
        ])
    }
}

fn import_meta_member(span: Span, name: &str) -> Expr {
    Expr::Member(MemberExpr {
        span,
        obj: Box::new(Expr::MetaProp(MetaPropExpr {
            span,
            kind: MetaPropKind::ImportMeta,
        })),
        prop: MemberProp::Ident(name.into()),
    })
}

fn meta_prop(name: &str, value: Expr) -> KeyValueProp {
    KeyValueProp {
        key: PropName::Ident(name.into()),
        value: Box::new(value),
    }
}
