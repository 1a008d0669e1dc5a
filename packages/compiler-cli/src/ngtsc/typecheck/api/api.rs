// TypeCheck API
//
// Public API types for template type-checking.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use ng_template_compiler::render3::r3_ast::HostElement;
use ng_template_compiler::render3::view::{DirectiveMeta, R3BoundTarget};
pub use ng_template_compiler::schema::SchemaMetadata;
use serde::{Deserialize, Serialize};

/// Configuration for type-checking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeCheckingConfig {
    /// Narrow template bodies through `ngTemplateContextGuard`.
    pub apply_template_context_guards: bool,
    /// Whether the bodies of `<ng-template>`s are checked at all.
    pub check_template_bodies: bool,
    /// Run DOM schema checks inside template bodies even when the bodies are skipped.
    pub always_check_schema_in_template_bodies: bool,
    /// Whether input bindings are checked against their directive input types.
    pub check_type_of_input_bindings: bool,
    /// Assign restricted (private, protected, readonly) inputs directly.
    pub honor_access_modifiers_for_input_bindings: bool,
    /// Keep `null`/`undefined` in input binding types.
    pub strict_null_input_bindings: bool,
    /// Whether static attributes are checked against matching inputs.
    pub check_type_of_attributes: bool,
    /// Whether property bindings on DOM elements are checked.
    pub check_type_of_dom_bindings: bool,
    /// Infer `$event` for directive outputs.
    pub check_type_of_output_events: bool,
    /// Type `$event` of legacy animation callbacks as `AnimationEvent`.
    pub check_type_of_animation_events: bool,
    /// Infer `$event` for DOM events through `addEventListener`.
    pub check_type_of_dom_events: bool,
    /// Give references to DOM elements their element type.
    pub check_type_of_dom_references: bool,
    /// Give references to templates and directives their real type.
    pub check_type_of_non_dom_references: bool,
    /// Whether pipe `transform` signatures are checked.
    pub check_type_of_pipes: bool,
    /// Lower `a?.b` so the result keeps the `undefined` type.
    pub strict_safe_navigation_types: bool,
    /// Give the TCB function the component's type parameters.
    pub use_context_generic_type: bool,
    /// Keep precise types for array and object literals.
    pub strict_literal_types: bool,
    /// Emit completion anchors for the template type-checker.
    pub enable_template_type_checker: bool,
    /// Infer generic directive types through type constructors.
    pub use_inline_type_constructors: bool,
    /// Check the bodies of `@if`, `@switch` and `@for` blocks.
    pub check_control_flow_bodies: bool,
    /// Two-way bindings accept writable signals.
    pub allow_signals_in_two_way_bindings: bool,
    /// Check the event half of two-way bindings.
    pub check_two_way_bound_events: bool,
}

impl TypeCheckingConfig {
    /// Everything checked, as with `strictTemplates`.
    pub fn full() -> Self {
        Self {
            apply_template_context_guards: true,
            check_template_bodies: true,
            always_check_schema_in_template_bodies: true,
            check_type_of_input_bindings: true,
            honor_access_modifiers_for_input_bindings: false,
            strict_null_input_bindings: true,
            check_type_of_attributes: true,
            check_type_of_dom_bindings: false,
            check_type_of_output_events: true,
            check_type_of_animation_events: true,
            check_type_of_dom_events: true,
            check_type_of_dom_references: true,
            check_type_of_non_dom_references: true,
            check_type_of_pipes: true,
            strict_safe_navigation_types: true,
            use_context_generic_type: true,
            strict_literal_types: true,
            enable_template_type_checker: false,
            use_inline_type_constructors: true,
            check_control_flow_bodies: true,
            allow_signals_in_two_way_bindings: true,
            check_two_way_bound_events: true,
        }
    }

    /// Only the top level of the template is checked and most types widen to `any`.
    pub fn basic() -> Self {
        Self {
            apply_template_context_guards: false,
            check_template_bodies: false,
            always_check_schema_in_template_bodies: true,
            check_type_of_input_bindings: false,
            honor_access_modifiers_for_input_bindings: false,
            strict_null_input_bindings: false,
            check_type_of_attributes: false,
            check_type_of_dom_bindings: false,
            check_type_of_output_events: false,
            check_type_of_animation_events: false,
            check_type_of_dom_events: false,
            check_type_of_dom_references: false,
            check_type_of_non_dom_references: false,
            check_type_of_pipes: false,
            strict_safe_navigation_types: false,
            use_context_generic_type: false,
            strict_literal_types: false,
            enable_template_type_checker: false,
            use_inline_type_constructors: true,
            check_control_flow_bodies: false,
            allow_signals_in_two_way_bindings: true,
            check_two_way_bound_events: false,
        }
    }
}

impl Default for TypeCheckingConfig {
    fn default() -> Self {
        Self::full()
    }
}

/// How the component's generic type parameters reach the TCB signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TcbGenericContextBehavior {
    /// Re-emit the type parameters from their metadata.
    #[default]
    UseEmitter,
    /// Copy the declared type parameter list verbatim.
    CopyClassNodes,
    /// Use `any` for every type parameter.
    FallbackToAny,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeParameter {
    pub name: String,
    pub bound: Option<String>,
    pub default: Option<String>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// `T extends Bound = Default`
    pub fn declaration(&self) -> String {
        let mut out = self.name.clone();
        if let Some(bound) = &self.bound {
            out.push_str(" extends ");
            out.push_str(bound);
        }
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(default);
        }
        out
    }
}

/// The class a TCB is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentClass {
    pub name: String,
    pub type_parameters: Vec<TypeParameter>,
    /// The type parameter list as written in the class declaration, without
    /// the angle brackets.
    pub type_parameter_source: Option<String>,
}

impl ComponentClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// An input of a directive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputMapping {
    pub class_property_name: String,
    pub binding_property_name: String,
    pub required: bool,
    pub is_signal: bool,
    /// Type accepted by the input's transform function.
    pub transform_type: Option<String>,
}

impl InputMapping {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { class_property_name: name.clone(), binding_property_name: name, ..Self::default() }
    }
}

/// An output of a directive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputMapping {
    pub class_property_name: String,
    pub binding_property_name: String,
}

impl OutputMapping {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { class_property_name: name.clone(), binding_property_name: name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateGuardKind {
    /// The bound expression itself narrows the template body.
    Binding,
    /// `ngTemplateGuard_<input>` is called to narrow the template body.
    Invocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateGuardMeta {
    pub input_name: String,
    #[serde(rename = "type")]
    pub kind: TemplateGuardKind,
}

/// Metadata of a directive as needed to type-check its usages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeCheckableDirectiveMeta {
    /// Class name.
    pub name: String,
    pub selector: Option<String>,
    pub is_component: bool,
    pub export_as: Vec<String>,
    pub inputs: Vec<InputMapping>,
    pub outputs: Vec<OutputMapping>,
    pub type_parameters: Vec<TypeParameter>,
    /// Inputs with an `ngAcceptInputType_` declaration.
    pub coerced_input_fields: HashSet<String>,
    /// Inputs that are private, protected or readonly.
    pub restricted_input_fields: HashSet<String>,
    /// Inputs whose class property name is not a valid identifier.
    pub string_literal_input_fields: HashSet<String>,
    /// Inputs declared only in decorator metadata.
    pub undeclared_input_fields: HashSet<String>,
    pub ng_template_guards: Vec<TemplateGuardMeta>,
    pub has_ng_template_context_guard: bool,
    /// Imported through `@Component.deferredImports`.
    pub is_explicitly_deferred: bool,
    /// Host directives, already narrowed to their exposed inputs and outputs.
    pub host_directives: Vec<Arc<TypeCheckableDirectiveMeta>>,
}

impl TypeCheckableDirectiveMeta {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self { name: name.into(), selector: Some(selector.into()), ..Self::default() }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// Inputs bound under the public name `name`.
    pub fn inputs_by_binding_name(&self, name: &str) -> Vec<&InputMapping> {
        self.inputs.iter().filter(|input| input.binding_property_name == name).collect()
    }

    pub fn output_by_binding_name(&self, name: &str) -> Option<&OutputMapping> {
        self.outputs.iter().find(|output| output.binding_property_name == name)
    }

    pub fn has_input_property(&self, class_property_name: &str) -> bool {
        self.inputs.iter().any(|input| input.class_property_name == class_property_name)
    }

    /// `<T, U>`, or an empty string for non-generic directives.
    pub fn type_arguments(&self, argument: impl Fn(&TypeParameter) -> String) -> String {
        if self.type_parameters.is_empty() {
            return String::new();
        }
        let args: Vec<String> = self.type_parameters.iter().map(argument).collect();
        format!("<{}>", args.join(", "))
    }
}

impl DirectiveMeta for TypeCheckableDirectiveMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    fn is_component(&self) -> bool {
        self.is_component
    }

    fn export_as(&self) -> &[String] {
        &self.export_as
    }

    fn input_binding_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|input| input.binding_property_name.as_str()).collect()
    }

    fn output_binding_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|output| output.binding_property_name.as_str()).collect()
    }

    fn host_directives(&self) -> Vec<Arc<Self>> {
        self.host_directives.clone()
    }
}

/// A pipe available to a template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipeMeta {
    /// Name used in templates.
    pub name: String,
    /// Class name.
    pub class_name: String,
    pub is_explicitly_deferred: bool,
}

impl PipeMeta {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self { name: name.into(), class_name: class_name.into(), is_explicitly_deferred: false }
    }
}

/// Everything the generator needs to know about one component besides its class.
pub struct TypeCheckBlockMetadata<'a> {
    /// Unique id of the TCB, also used in diagnostics.
    pub id: String,
    pub bound_target: &'a R3BoundTarget<TypeCheckableDirectiveMeta>,
    /// Synthetic element carrying the component's host bindings.
    pub host: Option<&'a HostElement>,
    /// Pipes in scope, by template name.
    pub pipes: &'a IndexMap<String, PipeMeta>,
    pub schemas: &'a [SchemaMetadata],
    pub is_standalone: bool,
    pub preserve_whitespaces: bool,
    pub generic_context_behavior: TcbGenericContextBehavior,
}
