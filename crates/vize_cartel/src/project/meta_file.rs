//! Companion meta file synthesis.
//!
//! For `Button.vue` the host serves `Button.vue.meta.ts`, whose default
//! export is an object type with one member per export of the component
//! file. Each member exposes `type`, `props`, `emit`, `slots` and `exposed`
//! as plain properties, so facets can be queried the same way whatever the
//! component's own type encoding is.

use std::fmt::Write;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Declaration, ExportDefaultDeclarationKind, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::sfc;

/// Suffix appended to component file names.
pub const META_SUFFIX: &str = ".meta.ts";

/// File name of the global pseudo-component, relative to the project root.
pub const GLOBAL_COMPONENT_FILE: &str = "__cartel_global__.vue";

/// Text of the global pseudo-component.
pub const GLOBAL_COMPONENT_TEXT: &str = "<script setup lang=\"ts\"></script>";

const SCRIPT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"];

/// Meta file name of a component file.
///
/// `Foo.vue` becomes `Foo.vue.meta.ts`, `foo.ts` becomes `foo.meta.ts`.
pub fn meta_file_name(component: &str) -> String {
    let stem = strip_script_extension(component).unwrap_or(component);
    let mut name = String::with_capacity(stem.len() + META_SUFFIX.len());
    name.push_str(stem);
    name.push_str(META_SUFFIX);
    name
}

/// Candidate component files of a meta file name, most likely first.
pub(crate) fn component_candidates(meta: &str) -> Vec<String> {
    let Some(stem) = meta.strip_suffix(META_SUFFIX) else {
        return Vec::new();
    };
    if stem.ends_with(".vue") {
        return vec![stem.to_string()];
    }
    SCRIPT_EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}{ext}"))
        .collect()
}

fn strip_script_extension(path: &str) -> Option<&str> {
    SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
}

/// Export names of a component file, in declaration order.
///
/// `.vue` files always export `default`; named exports of the plain
/// `<script>` block follow.
pub fn collect_export_names(path: &str, source: &str, force_typed: bool) -> Vec<String> {
    if path.ends_with(".vue") {
        let mut names = vec!["default".to_string()];
        if let Some(script) = sfc::split_scripts(source).script {
            let exports = collect_script_exports(script.content, script.source_type(force_typed));
            for name in exports {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        return names;
    }

    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    collect_script_exports(source, source_type)
}

fn collect_script_exports(source: &str, source_type: SourceType) -> Vec<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked {
        tracing::debug!("could not parse exports, treating module as empty");
        return Vec::new();
    }

    let mut names: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !names.contains(&name) {
            names.push(name);
        }
    };

    for stmt in ret.program.body.iter() {
        match stmt {
            Statement::ExportDefaultDeclaration(decl) => {
                if !matches!(
                    decl.declaration,
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)
                ) {
                    push("default".to_string());
                }
            }
            Statement::ExportNamedDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    continue;
                }
                match &decl.declaration {
                    Some(Declaration::VariableDeclaration(var)) => {
                        for declarator in var.declarations.iter() {
                            for id in declarator.id.get_binding_identifiers() {
                                push(id.name.to_string());
                            }
                        }
                    }
                    Some(Declaration::FunctionDeclaration(func)) => {
                        if let Some(id) = &func.id {
                            push(id.name.to_string());
                        }
                    }
                    Some(Declaration::ClassDeclaration(class)) => {
                        if let Some(id) = &class.id {
                            push(id.name.to_string());
                        }
                    }
                    _ => {}
                }
                for specifier in decl.specifiers.iter() {
                    if !specifier.export_kind.is_type() {
                        push(specifier.exported.name().to_string());
                    }
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                if let Some(exported) = &decl.exported {
                    push(exported.name().to_string());
                }
            }
            _ => {}
        }
    }
    names
}

/// Synthesize the meta file text of `component` with the given exports.
pub fn meta_file_text(component: &str, exports: &[String]) -> String {
    let file_name = component.rsplit('/').next().unwrap_or(component);
    let specifier = strip_script_extension(file_name).unwrap_or(file_name);

    let mut text = String::with_capacity(512 + exports.len() * 64);
    text.push_str(
        "import type { ComponentProps, ComponentEmit, ComponentSlots, ComponentExposed } from 'vue-component-type-helpers';\n",
    );
    let _ = writeln!(text, "import type * as Components from './{specifier}';");
    text.push('\n');
    text.push_str("export default {} as {\n");
    for name in exports {
        let key = quote(name);
        let _ = writeln!(text, "  {key}: ComponentMeta<typeof Components[{key}]>;");
    }
    text.push_str("};\n\n");
    text.push_str(
        "type ComponentType<T> = T extends new (...args: any) => {} ? 1 : T extends (...args: any) => any ? 2 : 0;\n\n",
    );
    text.push_str("interface ComponentMeta<T> {\n");
    text.push_str("  type: ComponentType<T>;\n");
    text.push_str("  props: ComponentProps<T>;\n");
    text.push_str("  emit: ComponentEmit<T>;\n");
    text.push_str("  slots: ComponentSlots<T>;\n");
    text.push_str("  exposed: ComponentExposed<T>;\n");
    text.push_str("}\n");
    text
}

fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_file_name() {
        assert_eq!(meta_file_name("/src/Foo.vue"), "/src/Foo.vue.meta.ts");
        assert_eq!(meta_file_name("/src/foo.ts"), "/src/foo.meta.ts");
        assert_eq!(meta_file_name("/src/foo.tsx"), "/src/foo.meta.ts");
        assert_eq!(meta_file_name("/src/foo.js"), "/src/foo.meta.ts");
    }

    #[test]
    fn test_component_candidates() {
        assert_eq!(
            component_candidates("/src/Foo.vue.meta.ts"),
            vec!["/src/Foo.vue".to_string()]
        );
        let candidates = component_candidates("/src/foo.meta.ts");
        assert_eq!(candidates[0], "/src/foo.ts");
        assert!(candidates.contains(&"/src/foo.js".to_string()));
        assert!(component_candidates("/src/foo.ts").is_empty());
    }

    #[test]
    fn test_vue_exports() {
        let source = r#"<script lang="ts">
export const helper = 1
export function util() {}
export type Props = { a: string }
</script>
<script setup lang="ts">
defineProps<{ a: string }>()
</script>"#;
        assert_eq!(
            collect_export_names("/src/Foo.vue", source, false),
            vec!["default", "helper", "util"]
        );
    }

    #[test]
    fn test_vue_without_script_exports_default() {
        assert_eq!(
            collect_export_names("/src/Empty.vue", "<template><div /></template>", false),
            vec!["default"]
        );
    }

    #[test]
    fn test_script_exports() {
        let source = r#"import { defineComponent } from 'vue'
const Inner = defineComponent({})
export const A = defineComponent({}), B = defineComponent({})
export class C {}
export { Inner as D, Inner }
export type { Inner as E }
export * as ns from './other'
export * from './all'
export default defineComponent({})"#;
        assert_eq!(
            collect_export_names("/src/components.ts", source, false),
            vec!["A", "B", "C", "D", "Inner", "ns", "default"]
        );
    }

    #[test]
    fn test_meta_file_text() {
        let text = meta_file_text("/src/Button.vue", &["default".to_string(), "helper".to_string()]);
        insta::assert_snapshot!(text, @r###"
        import type { ComponentProps, ComponentEmit, ComponentSlots, ComponentExposed } from 'vue-component-type-helpers';
        import type * as Components from './Button.vue';

        export default {} as {
          'default': ComponentMeta<typeof Components['default']>;
          'helper': ComponentMeta<typeof Components['helper']>;
        };

        type ComponentType<T> = T extends new (...args: any) => {} ? 1 : T extends (...args: any) => any ? 2 : 0;

        interface ComponentMeta<T> {
          type: ComponentType<T>;
          props: ComponentProps<T>;
          emit: ComponentEmit<T>;
          slots: ComponentSlots<T>;
          exposed: ComponentExposed<T>;
        }
        "###);
    }

    #[test]
    fn test_meta_file_text_for_script_component() {
        let text = meta_file_text("/src/button.ts", &["Button".to_string()]);
        assert!(text.contains("from './button';"));
        assert!(text.contains("'Button': ComponentMeta<typeof Components['Button']>;"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), r"'it\'s'");
    }
}
