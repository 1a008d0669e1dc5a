/**
 * Template Pipeline Tests
 *
 * Templates built from source text, ingested and run through every phase.
 */

#[cfg(test)]
mod tests {
    use ng_template_compiler::render3::builder::TemplateBuilder;
    use ng_template_compiler::render3::defer::DeferBlockConfig;
    use ng_template_compiler::render3::r3_ast::R3Node;
    use ng_template_compiler::template::pipeline::ir::{CreateOp, Expression, OpKind, UpdateOp};
    use ng_template_compiler::template::pipeline::src::phases::optimize_variables;
    use ng_template_compiler::{compile_template, CompiledTemplate};
    use pretty_assertions::assert_eq;

    fn compile(nodes: Vec<R3Node>) -> CompiledTemplate {
        compile_template("TestCmp", &nodes).expect("template should compile")
    }

    fn create_kinds(compiled: &CompiledTemplate) -> Vec<OpKind> {
        compiled.job.root_view().create.iter().map(CreateOp::kind).collect()
    }

    mod slots {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_count_root_declarations() {
            let t = TemplateBuilder::new("<div>{{ name }}</div>hello");
            let compiled = compile(vec![
                t.element("div").child(t.bound_text("{{ name }}")).build(),
                t.text("hello"),
            ]);

            assert_eq!(
                create_kinds(&compiled),
                vec![OpKind::ElementStart, OpKind::Text, OpKind::ElementEnd, OpKind::Text]
            );
            assert_eq!(compiled.job.root_view().decls, Some(3));
        }

        #[test]
        fn should_count_declarations_per_view() {
            let t = TemplateBuilder::new(
                "@for (item of items; track item.id) {<li>{{ item.name }}</li>} @empty {none}",
            );
            let compiled = compile(vec![t
                .for_block("item", "items", "item.id")
                .body(vec![t.element("li").child(t.bound_text("{{ item.name }}")).build()])
                .empty(vec![t.text("none")])
                .build()]);

            let root = compiled.job.root_view();
            let Some(CreateOp::RepeaterCreate(repeater)) = root.create.get(0) else {
                panic!("expected a repeater");
            };
            let empty = repeater.empty_view.expect("an @empty view");

            assert_eq!(root.decls, Some(2));
            assert_eq!(compiled.job.view(repeater.xref).unwrap().decls, Some(2));
            assert_eq!(compiled.job.view(empty).unwrap().decls, Some(1));
            assert_eq!(compiled.slots[&repeater.xref], 0);
        }

        #[test]
        fn should_reject_unknown_loop_variables() {
            let t = TemplateBuilder::new("@for (item of items; track $index; let weird = $foo) {}");
            let nodes = vec![t
                .for_block("item", "items", "$index")
                .context_variable("weird", "$foo")
                .body(vec![])
                .build()];

            let err = compile_template("TestCmp", &nodes).unwrap_err();
            assert!(err.to_string().contains("unknown @for loop variable $foo"), "{}", err);
        }
    }

    mod let_declarations {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_drop_unused_declarations() {
            let t = TemplateBuilder::new("@let total = 1 + 2; <span></span>");
            let compiled = compile(vec![t.let_declaration("total", "1 + 2"), t.element("span").build()]);

            assert_eq!(create_kinds(&compiled), vec![OpKind::ElementStart, OpKind::ElementEnd]);
            assert!(compiled.job.root_view().update.is_empty());
            assert_eq!(compiled.job.root_view().decls, Some(1));
        }

        #[test]
        fn should_keep_declarations_read_by_child_views() {
            let t = TemplateBuilder::new("@let user = name; @if (ok) {{{ user }}}");
            let compiled = compile(vec![
                t.let_declaration("user", "name"),
                t.if_block().branch("ok", vec![t.bound_text("{{ user }}")]).build(),
            ]);

            let root = compiled.job.root_view();
            let declared = root.create.iter().find_map(|op| match op {
                CreateOp::DeclareLet(decl) => Some(decl.xref),
                _ => None,
            });
            let declared = declared.expect("the @let keeps its slot");

            let mut read = false;
            compiled.job.visit_all_expressions(&mut |expr, _| {
                if *expr == Expression::ContextLetReference(declared) {
                    read = true;
                }
            });
            assert!(read, "the branch reads the stored value");
        }

        #[test]
        fn should_settle_variable_optimization() {
            let t = TemplateBuilder::new("@let a = x; @let b = a; <p [title]=\"b\"></p>");
            let mut compiled = compile(vec![
                t.let_declaration("a", "x"),
                t.let_declaration("b", "a"),
                t.element("p").input("title", "b").build(),
            ]);
            let before = compiled.job.root_view().update.clone();

            optimize_variables(&mut compiled.job);

            assert_eq!(compiled.job.root_view().update, before);
        }
    }

    mod callbacks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_share_identical_context_callbacks() {
            let t = TemplateBuilder::new(r#"<a [x]="() => a" [y]="() => a"></a>"#);
            let compiled = compile(vec![t.element("a").input("x", "() => a").input("y", "() => a").build()]);

            assert_eq!(compiled.job.callbacks.len(), 1);
            assert_eq!(
                create_kinds(&compiled),
                vec![OpKind::ElementStart, OpKind::ElementEnd, OpKind::StoredCallback]
            );

            let bound: Vec<&Expression> = compiled
                .job
                .root_view()
                .update
                .iter()
                .filter_map(|op| match op {
                    UpdateOp::Property(prop) => Some(&prop.expression),
                    _ => None,
                })
                .collect();
            assert_eq!(bound.len(), 2);
            assert!(matches!(bound[0], Expression::StoredCallback(_)));
            assert_eq!(bound[0], bound[1]);
            assert_eq!(compiled.job.root_view().decls, Some(2));
        }

        #[test]
        fn should_leave_callbacks_closing_over_outer_parameters_unstored() {
            let t = TemplateBuilder::new(r#"<a [x]="(p) => () => p"></a>"#);
            let compiled = compile(vec![t.element("a").input("x", "(p) => () => p").build()]);

            assert_eq!(compiled.job.callbacks.len(), 2);
            assert!(compiled.job.callbacks.values().all(|callback| !callback.uses_context));
            assert_eq!(create_kinds(&compiled), vec![OpKind::ElementStart, OpKind::ElementEnd]);
            assert_eq!(compiled.job.root_view().decls, Some(1));
        }
    }

    mod defer_blocks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_point_at_the_sub_view_slots() {
            let t = TemplateBuilder::new(
                "@defer (on idle) {main} @loading {wait} @placeholder (minimum 500ms) {soon}",
            );
            let compiled = compile(vec![t
                .defer_block()
                .on("idle")
                .body(vec![t.text("main")])
                .loading(None, None, vec![t.text("wait")])
                .placeholder(Some(500), vec![t.text("soon")])
                .build()]);

            assert_eq!(compiled.defer_blocks.len(), 1);
            let (xref, details) = &compiled.defer_blocks[0];
            assert_eq!(compiled.slots[xref], 3);
            assert_eq!(details.primary_tmpl_index, 0);
            assert_eq!(details.loading_tmpl_index, Some(1));
            assert_eq!(details.placeholder_tmpl_index, Some(2));
            assert_eq!(details.error_tmpl_index, None);
            assert_eq!(
                details.placeholder_block_config,
                Some(DeferBlockConfig { minimum_time: Some(500), after_time: None })
            );
            assert_eq!(details.loading_block_config, Some(DeferBlockConfig::default()));
            assert_eq!(compiled.job.root_view().decls, Some(5));
        }
    }
}
