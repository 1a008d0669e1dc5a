//! Shared helpers for the type-check integration tests.

#![allow(dead_code)]

use ng_template_compiler::render3::r3_ast::R3Node;
use ng_template_compiler_cli::ngtsc::typecheck::api::{ComponentClass, TypeCheckableDirectiveMeta, TypeCheckingConfig};
use ng_template_compiler_cli::ngtsc::typecheck::src::{
    bind_template, ComponentRegistration, GeneratedTcb, TypeCheckingContext,
};

pub const COMPONENT: &str = "TestCmp";

pub fn registration(directives: Vec<TypeCheckableDirectiveMeta>, template: Vec<R3Node>) -> ComponentRegistration {
    let bound = bind_template(directives, template).expect("template should bind");
    ComponentRegistration::new(ComponentClass::new(COMPONENT), bound)
}

pub fn generate_with(config: TypeCheckingConfig, registration: ComponentRegistration) -> GeneratedTcb {
    let mut context = TypeCheckingContext::new(config);
    context.add_component(registration);
    let mut tcbs = context.generate().expect("type-check block should generate");
    assert_eq!(tcbs.len(), 1);
    tcbs.remove(0)
}

pub fn generate(registration: ComponentRegistration) -> GeneratedTcb {
    generate_with(TypeCheckingConfig::full(), registration)
}

/// The type-check block of a template without directives, fully checked.
pub fn tcb(template: Vec<R3Node>) -> String {
    generate(registration(Vec::new(), template)).source
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
