// TypeCheck Environment
//
// Declarations shared by the statements of one type-check block: import
// aliases, directive type constructors and pipe instances.

use indexmap::IndexMap;

use super::super::api::{PipeMeta, TypeCheckableDirectiveMeta, TypeCheckingConfig};
use super::expression::quote;

pub const ANGULAR_CORE: &str = "@angular/core";
pub const ANGULAR_ANIMATIONS: &str = "@angular/animations";

#[derive(Debug, Clone)]
pub struct Environment {
    pub config: TypeCheckingConfig,
    /// Module specifier to namespace alias, in first-use order. `i0` is always
    /// `@angular/core`.
    imports: IndexMap<String, String>,
    /// Directive class to type constructor name.
    type_ctors: IndexMap<String, String>,
    type_ctor_statements: Vec<String>,
    /// Pipe class to instance name.
    pipe_insts: IndexMap<String, String>,
    pipe_statements: Vec<String>,
}

impl Environment {
    pub fn new(config: TypeCheckingConfig) -> Self {
        let mut imports = IndexMap::new();
        imports.insert(ANGULAR_CORE.to_string(), "i0".to_string());
        Self {
            config,
            imports,
            type_ctors: IndexMap::new(),
            type_ctor_statements: Vec::new(),
            pipe_insts: IndexMap::new(),
            pipe_statements: Vec::new(),
        }
    }

    /// `iN.name`, allocating an alias for `module` on first use.
    pub fn reference_external(&mut self, module: &str, name: &str) -> String {
        let next = format!("i{}", self.imports.len());
        let alias = self.imports.entry(module.to_string()).or_insert(next);
        format!("{}.{}", alias, name)
    }

    pub fn reference_core(&mut self, name: &str) -> String {
        self.reference_external(ANGULAR_CORE, name)
    }

    /// Name of the type constructor of a generic directive, declaring it on first use:
    ///
    /// `const _ctor1: <T = any>(init: Pick<Dir<T>, "a">) => Dir<T> = null!;`
    pub fn type_ctor_for(&mut self, dir: &TypeCheckableDirectiveMeta) -> String {
        if let Some(name) = self.type_ctors.get(&dir.name) {
            return name.clone();
        }
        let name = format!("_ctor{}", self.type_ctors.len() + 1);
        let params: Vec<String> = dir
            .type_parameters
            .iter()
            .map(|param| {
                let mut decl = param.name.clone();
                if let Some(bound) = &param.bound {
                    decl.push_str(" extends ");
                    decl.push_str(bound);
                }
                decl.push_str(" = ");
                decl.push_str(param.default.as_deref().unwrap_or("any"));
                decl
            })
            .collect();
        let raw_type = format!("{}{}", dir.name, dir.type_arguments(|param| param.name.clone()));
        let init = self.type_ctor_init(dir, &raw_type);
        let statement = format!(
            "const {}: <{}>(init: {}) => {} = null!;",
            name,
            params.join(", "),
            init,
            raw_type
        );
        self.type_ctors.insert(dir.name.clone(), name.clone());
        self.type_ctor_statements.push(statement);
        name
    }

    /// Plain inputs are picked from the class, coerced inputs use their accepted
    /// type and signal inputs are unwrapped.
    fn type_ctor_init(&mut self, dir: &TypeCheckableDirectiveMeta, raw_type: &str) -> String {
        let mut plain = Vec::new();
        let mut coerced = Vec::new();
        let mut signals = Vec::new();
        for input in &dir.inputs {
            let field = &input.class_property_name;
            if plain.contains(&quote(field)) || signals.contains(&quote(field)) {
                continue;
            }
            if input.is_signal {
                signals.push(quote(field));
            } else if !dir.coerced_input_fields.contains(field) {
                plain.push(quote(field));
            } else {
                let coercion = match &input.transform_type {
                    Some(transform) => transform.clone(),
                    None => format!("typeof {}.ngAcceptInputType_{}", dir.name, field),
                };
                coerced.push(format!("{}: {}", quote(field), coercion));
            }
        }

        let mut parts = Vec::new();
        if !plain.is_empty() {
            parts.push(format!("Pick<{}, {}>", raw_type, plain.join(" | ")));
        }
        if !coerced.is_empty() {
            parts.push(format!("{{ {} }}", coerced.join("; ")));
        }
        if !signals.is_empty() {
            let unwrap = self.reference_core("ɵUnwrapDirectiveSignalInputs");
            parts.push(format!("{}<{}, {}>", unwrap, raw_type, signals.join(" | ")));
        }
        if parts.is_empty() {
            "{}".to_string()
        } else {
            parts.join(" & ")
        }
    }

    /// `_pipeN`, declaring `var _pipeN: Pipe = null!;` on first use.
    pub fn pipe_inst(&mut self, pipe: &PipeMeta) -> String {
        if let Some(name) = self.pipe_insts.get(&pipe.class_name) {
            return name.clone();
        }
        let name = format!("_pipe{}", self.pipe_insts.len() + 1);
        self.pipe_statements.push(format!("var {}: {} = null!;", name, pipe.class_name));
        self.pipe_insts.insert(pipe.class_name.clone(), name.clone());
        name
    }

    pub fn pipe_statements(&self) -> &[String] {
        &self.pipe_statements
    }

    pub fn type_ctor_statements(&self) -> &[String] {
        &self.type_ctor_statements
    }

    /// `import * as iN from "module";` for every module referenced so far.
    pub fn import_statements(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|(module, alias)| format!("import * as {} from {};", alias, quote(module)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngtsc::typecheck::api::{InputMapping, TypeParameter};
    use pretty_assertions::assert_eq;

    #[test]
    fn should_alias_modules_in_first_use_order() {
        let mut env = Environment::new(TypeCheckingConfig::full());
        assert_eq!(env.reference_external(ANGULAR_ANIMATIONS, "AnimationEvent"), "i1.AnimationEvent");
        assert_eq!(env.reference_core("TemplateRef"), "i0.TemplateRef");
        assert_eq!(
            env.import_statements(),
            vec![
                r#"import * as i0 from "@angular/core";"#.to_string(),
                r#"import * as i1 from "@angular/animations";"#.to_string(),
            ]
        );
    }

    #[test]
    fn should_declare_type_ctors_once() {
        let mut env = Environment::new(TypeCheckingConfig::full());
        let mut dir = TypeCheckableDirectiveMeta::new("GenericDir", "[dir]");
        dir.type_parameters.push(TypeParameter { bound: Some("string".to_string()), ..TypeParameter::new("T") });
        dir.inputs.push(InputMapping::new("value"));
        let mut sig = InputMapping::new("count");
        sig.is_signal = true;
        dir.inputs.push(sig);

        assert_eq!(env.type_ctor_for(&dir), "_ctor1");
        assert_eq!(env.type_ctor_for(&dir), "_ctor1");
        assert_eq!(
            env.type_ctor_statements(),
            &[r#"const _ctor1: <T extends string = any>(init: Pick<GenericDir<T>, "value"> & i0.ɵUnwrapDirectiveSignalInputs<GenericDir<T>, "count">) => GenericDir<T> = null!;"#
                .to_string()]
        );
    }

    #[test]
    fn should_share_pipe_instances() {
        let mut env = Environment::new(TypeCheckingConfig::full());
        let date = PipeMeta::new("date", "DatePipe");
        assert_eq!(env.pipe_inst(&date), "_pipe1");
        assert_eq!(env.pipe_inst(&PipeMeta::new("async", "AsyncPipe")), "_pipe2");
        assert_eq!(env.pipe_inst(&date), "_pipe1");
        assert_eq!(env.pipe_statements()[1], "var _pipe2: AsyncPipe = null!;");
    }
}
