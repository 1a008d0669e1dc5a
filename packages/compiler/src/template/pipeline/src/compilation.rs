//! Compilation Module
//!
//! The compilation job of one component template and its view units.

use indexmap::IndexMap;

use crate::template::pipeline::ir;

/// Compilation-in-progress of a whole component template: the root view, every
/// embedded view and every callback lifted out of their expressions.
#[derive(Debug, Clone)]
pub struct ComponentCompilationJob {
    pub component_name: String,
    pub root: ir::XrefId,
    /// All views in declaration order, the root view first.
    pub views: IndexMap<ir::XrefId, ViewCompilationUnit>,
    pub callbacks: IndexMap<ir::XrefId, CallbackDefinition>,
    pub xrefs: ir::XrefAllocator,
}

impl ComponentCompilationJob {
    pub fn new(component_name: impl Into<String>) -> Self {
        let root = ir::XrefId::new(0);
        let mut views = IndexMap::new();
        views.insert(root, ViewCompilationUnit::new(root, None));
        ComponentCompilationJob {
            component_name: component_name.into(),
            root,
            views,
            callbacks: IndexMap::new(),
            xrefs: ir::XrefAllocator::new(root),
        }
    }

    pub fn allocate_xref_id(&mut self) -> ir::XrefId {
        self.xrefs.allocate()
    }

    /// Adds a unit for a new embedded view under `parent`.
    pub fn allocate_view(&mut self, parent: ir::XrefId) -> ir::XrefId {
        let xref = self.allocate_xref_id();
        self.views.insert(xref, ViewCompilationUnit::new(xref, Some(parent)));
        xref
    }

    pub fn root_view(&self) -> &ViewCompilationUnit {
        &self.views[&self.root]
    }

    pub fn view(&self, xref: ir::XrefId) -> Option<&ViewCompilationUnit> {
        self.views.get(&xref)
    }

    pub fn view_mut(&mut self, xref: ir::XrefId) -> Option<&mut ViewCompilationUnit> {
        self.views.get_mut(&xref)
    }

    /// Visits every expression in the job: create and update ops of every view,
    /// listener handlers and callback bodies.
    pub fn visit_all_expressions(&self, visitor: &mut dyn FnMut(&ir::Expression, ir::VisitorContextFlag)) {
        for unit in self.views.values() {
            unit.visit_expressions(visitor);
        }
        for callback in self.callbacks.values() {
            for op in callback.ops.iter() {
                op.visit_expressions(visitor, ir::VisitorContextFlag::IN_CHILD_OPERATION);
            }
        }
    }

    /// Every update-style op list of the job: listener handlers and update
    /// ops of each view, then callback bodies.
    pub fn update_op_lists_mut(&mut self) -> Vec<&mut ir::OpList<ir::UpdateOp>> {
        let mut lists = Vec::new();
        for unit in self.views.values_mut() {
            let ViewCompilationUnit { create, update, .. } = unit;
            for op in create.iter_mut() {
                if let ir::CreateOp::Listener(listener) = op {
                    lists.push(&mut listener.handler_ops);
                }
            }
            lists.push(update);
        }
        for callback in self.callbacks.values_mut() {
            lists.push(&mut callback.ops);
        }
        lists
    }

    /// Transforms every expression in the job, in the same order as
    /// [`Self::visit_all_expressions`].
    pub fn transform_all_expressions(
        &mut self,
        transform: &mut dyn FnMut(ir::Expression, ir::VisitorContextFlag) -> ir::Expression,
    ) {
        for unit in self.views.values_mut() {
            unit.transform_expressions(transform);
        }
        for callback in self.callbacks.values_mut() {
            for op in callback.ops.iter_mut() {
                op.transform_expressions(transform, ir::VisitorContextFlag::IN_CHILD_OPERATION);
            }
        }
    }
}

/// Compilation-in-progress of one view: its create and update op lists plus
/// the names its context makes available.
#[derive(Debug, Clone)]
pub struct ViewCompilationUnit {
    pub xref: ir::XrefId,
    pub parent: Option<ir::XrefId>,
    pub create: ir::OpList<ir::CreateOp>,
    pub update: ir::OpList<ir::UpdateOp>,
    /// Template name to context property (or [`ir::CTX_REF`]).
    pub context_variables: IndexMap<String, String>,
    pub aliases: Vec<ir::AliasVariable>,
    /// Number of slots used, set by slot allocation.
    pub decls: Option<usize>,
}

impl ViewCompilationUnit {
    pub fn new(xref: ir::XrefId, parent: Option<ir::XrefId>) -> Self {
        ViewCompilationUnit {
            xref,
            parent,
            create: ir::OpList::new(),
            update: ir::OpList::new(),
            context_variables: IndexMap::new(),
            aliases: Vec::new(),
            decls: None,
        }
    }

    pub fn visit_expressions(&self, visitor: &mut dyn FnMut(&ir::Expression, ir::VisitorContextFlag)) {
        for op in self.create.iter() {
            op.visit_expressions(visitor, ir::VisitorContextFlag::NONE);
        }
        for op in self.update.iter() {
            op.visit_expressions(visitor, ir::VisitorContextFlag::NONE);
        }
    }

    pub fn transform_expressions(
        &mut self,
        transform: &mut dyn FnMut(ir::Expression, ir::VisitorContextFlag) -> ir::Expression,
    ) {
        for op in self.create.iter_mut() {
            op.transform_expressions(transform, ir::VisitorContextFlag::NONE);
        }
        for op in self.update.iter_mut() {
            op.transform_expressions(transform, ir::VisitorContextFlag::NONE);
        }
    }
}

/// An arrow function of the template lifted into its own op list.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackDefinition {
    pub xref: ir::XrefId,
    /// View the arrow function was written in.
    pub view: ir::XrefId,
    pub params: Vec<String>,
    /// Parameters of the arrow functions this one is nested in, outermost first.
    pub enclosing_params: Vec<String>,
    /// Variable preamble followed by one returning statement.
    pub ops: ir::OpList<ir::UpdateOp>,
    /// Reads `$event` of an enclosing listener.
    pub uses_dollar_event: bool,
    /// Reads anything from the template context beyond its own parameters.
    pub uses_context: bool,
}
