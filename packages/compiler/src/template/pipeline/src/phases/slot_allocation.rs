//! Slot Allocation Phase
//!
//! Assigns data slots to every create operation which consumes them and
//! records the number of slots used by each view in its `decls`.

use std::collections::HashMap;

use crate::template::pipeline::ir;
use crate::template::pipeline::src::compilation::ComponentCompilationJob;

/// Returns the slot of every declaration, keyed by its xref. Views declared by
/// a `Template` op share the xref with it, so the map also gives the slot each
/// embedded view was declared in.
pub fn allocate_slots(job: &mut ComponentCompilationJob) -> HashMap<ir::XrefId, usize> {
    let mut slot_map = HashMap::new();

    for unit in job.views.values_mut() {
        let mut slot_count = 0;
        for op in unit.create.iter_mut() {
            let xref = op.xref();
            let Some((handle, num_slots)) = op.slot_handle_mut() else {
                continue;
            };
            handle.slot = Some(slot_count);
            if let Some(xref) = xref {
                slot_map.insert(xref, slot_count);
            }
            slot_count += num_slots;
        }
        unit.decls = Some(slot_count);
    }

    slot_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_util::ParseSourceSpan;

    #[test]
    fn repeaters_with_empty_views_take_two_slots() {
        let mut job = ComponentCompilationJob::new("Cmp");
        let root = job.root;
        let body = job.allocate_view(root);
        let empty = job.allocate_view(root);
        let text = job.allocate_xref_id();
        let unit = job.view_mut(root).unwrap();
        unit.create.push(ir::CreateOp::RepeaterCreate(ir::RepeaterCreateOp {
            xref: body,
            empty_view: Some(empty),
            item_name: "item".to_string(),
            index_names: vec!["$index".to_string()],
            track: ir::Expression::ReadVar("$index".to_string()),
            handle: ir::SlotHandle::new(),
            source_span: ParseSourceSpan::new(0, 1),
        }));
        unit.create.push(ir::CreateOp::Text(ir::TextOp {
            xref: text,
            initial_value: "x".to_string(),
            handle: ir::SlotHandle::new(),
            source_span: ParseSourceSpan::new(1, 2),
        }));

        let slots = allocate_slots(&mut job);

        assert_eq!(slots[&body], 0);
        assert_eq!(slots[&text], 2);
        assert_eq!(job.root_view().decls, Some(3));
        assert_eq!(job.view(body).unwrap().decls, Some(0));
    }
}
