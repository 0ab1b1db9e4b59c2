use tracing::{debug, info};

use crate::collect::attributes::{
    aria_flag, attribute_value, autocomplete_type, boolean_attribute, element_value, form_action,
    is_field_element, is_form_or_field_element, max_length,
};
use crate::collect::collector::{PageCollector, UNRESOLVED_OPID};
use crate::collect::snapshot_model::{FieldDescriptor, FormDescriptor, PageSnapshot};
use crate::dom::dom_model::{Document, MutationRecord, NodeId};

impl PageCollector {
    // ========================================================================
    // Observer entry point
    // ========================================================================

    /// Accept one batch of mutation records from the host's observer.
    ///
    /// Records are queued and drained later by [`run_pending`](Self::run_pending);
    /// a changed document address clears everything and schedules a rebuild.
    pub fn handle_mutations(&mut self, doc: &Document, records: Vec<MutationRecord>) {
        if !self.observers_installed {
            return;
        }

        if doc.url() != self.current_location {
            self.handle_navigation(doc);
            return;
        }

        if records.is_empty() {
            return;
        }
        let now = self.clock.now_ms();
        self.drain.touch(now);
        self.mutation_queue.push_back(records);
    }

    fn handle_navigation(&mut self, doc: &Document) {
        info!(from = %self.current_location, to = doc.url(), "document location changed");
        self.current_location = doc.url().to_string();
        self.recently_mutated = true;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.page_details_stale();
            overlay.clear_user_filled_fields();
        }
        self.no_fields_found = false;
        self.forms.clear();
        self.fields.clear();
        self.mutation_queue.clear();
        self.drain.cancel();
        self.deferred.clear();

        let now = self.clock.now_ms();
        self.rebuild.touch(now);
    }

    /// Earliest instant at which [`run_pending`](Self::run_pending) has work.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.drain.deadline(), self.rebuild.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.drain.is_pending() || self.rebuild.is_pending() || !self.deferred.is_empty()
    }

    // ========================================================================
    // Scheduler tick
    // ========================================================================

    /// Run whatever is due at the clock's current time. Returns the rebuilt
    /// snapshot when a rebuild pass ran.
    pub fn run_pending(&mut self, doc: &Document) -> Option<PageSnapshot> {
        let now = self.clock.now_ms();

        if self.drain.take_due(now) {
            self.drain_queue(doc);
        }

        self.run_deferred_builds(doc);

        if !self.rebuild.take_due(self.clock.now_ms()) {
            return None;
        }
        self.stats.rebuild_passes += 1;
        debug!(pass = self.stats.rebuild_passes, "rebuilding page details");
        Some(self.get_snapshot(doc))
    }

    fn drain_queue(&mut self, doc: &Document) {
        self.stats.mutation_drains += 1;
        if !self.query.page_contains_shadow_dom() && self.query.check_page_contains_shadow_dom(doc) {
            debug!("shadow roots found on page");
            self.flag_update_required();
        }

        let batches: Vec<Vec<MutationRecord>> = self.mutation_queue.drain(..).collect();
        let records = batches.iter().map(Vec::len).sum::<usize>();
        for record in batches.into_iter().flatten() {
            self.process_record(doc, &record);
        }
        debug!(records, mutated = self.recently_mutated, "mutation queue drained");

        if self.recently_mutated {
            let now = self.clock.now_ms();
            self.rebuild.touch(now);
        }
    }

    fn flag_update_required(&mut self) {
        self.recently_mutated = true;
        self.no_fields_found = false;
    }

    fn process_record(&mut self, doc: &Document, record: &MutationRecord) {
        match record {
            MutationRecord::ChildList { removed, added, .. } => {
                let removed_hit = self.evict_removed(doc, removed);
                let added_hit = self.queue_added(doc, added);
                if removed_hit || added_hit {
                    self.flag_update_required();
                }
            }
            MutationRecord::Attributes { target, name } => {
                self.apply_attribute(doc, *target, &name.to_ascii_lowercase());
            }
        }
    }

    /// Form and field elements among `nodes` and their subtrees, shadow
    /// trees included.
    fn autofill_elements_in(&self, doc: &Document, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut found = Vec::new();
        for node in nodes.iter().copied().filter(|n| doc.is_element(*n)) {
            if is_form_or_field_element(doc, node) {
                found.push(node);
            }
            found.extend(self.query.query_all(doc, node, &is_form_or_field_element, true));
        }
        found
    }

    fn evict_removed(&mut self, doc: &Document, removed: &[NodeId]) -> bool {
        let elements = self.autofill_elements_in(doc, removed);
        for node in &elements {
            if self.forms.remove(*node).is_none() {
                self.fields.remove(*node);
            }
            self.intersections.unobserve(*node);
        }
        !elements.is_empty()
    }

    fn queue_added(&mut self, doc: &Document, added: &[NodeId]) -> bool {
        let elements = self.autofill_elements_in(doc, added);
        self.deferred.extend(elements.iter().copied());
        !elements.is_empty()
    }

    /// Describe fields added since the last collection and cache them under
    /// [`UNRESOLVED_OPID`]. The rebuild that follows reuses the descriptor
    /// and assigns its real opid.
    fn run_deferred_builds(&mut self, doc: &Document) {
        for node in std::mem::take(&mut self.deferred) {
            if !doc.is_connected(node) || !is_field_element(doc, node) || self.fields.contains(node) {
                continue;
            }
            let descriptor = self.describe_field(doc, node, None);
            self.fields.insert(node, descriptor);
            self.stats.deferred_builds += 1;
        }
    }

    // ========================================================================
    // Attribute projections
    // ========================================================================

    fn apply_attribute(&mut self, doc: &Document, target: NodeId, name: &str) {
        if !doc.is_element(target) {
            return;
        }
        if let Some(form) = self.forms.get_mut(target) {
            project_form_attribute(doc, target, name, form);
            return;
        }
        if let Some(field) = self.fields.get_mut(target) {
            project_field_attribute(doc, target, name, field);
        }
    }
}

fn project_form_attribute(doc: &Document, node: NodeId, name: &str, form: &mut FormDescriptor) {
    match name {
        "action" => form.html_action = form_action(doc, node),
        "name" => form.html_name = attribute_value(doc, node, "name"),
        "id" => form.html_id = attribute_value(doc, node, "id"),
        "method" => form.html_method = attribute_value(doc, node, "method"),
        _ => {}
    }
}

fn project_field_attribute(doc: &Document, node: NodeId, name: &str, field: &mut FieldDescriptor) {
    match name {
        "maxlength" => field.max_length = max_length(doc, node),
        "id" => field.html_id = attribute_value(doc, node, "id"),
        "name" => field.html_name = attribute_value(doc, node, "name"),
        "class" => field.html_class = attribute_value(doc, node, "class"),
        "tabindex" => field.tabindex = attribute_value(doc, node, "tabindex"),
        "title" => field.title = attribute_value(doc, node, "title"),
        "rel" => field.rel = attribute_value(doc, node, "rel"),
        "type" => field.field_type = doc.element_type(node),
        "value" => field.value = Some(element_value(doc, node)),
        "checked" => field.checked = boolean_attribute(doc, node, "checked"),
        "disabled" => field.disabled = boolean_attribute(doc, node, "disabled"),
        "readonly" => field.readonly = boolean_attribute(doc, node, "readonly"),
        "autocomplete" => field.auto_complete_type = autocomplete_type(doc, node),
        "data-label" => field.label_data = attribute_value(doc, node, "data-label"),
        "aria-label" => field.label_aria = attribute_value(doc, node, "aria-label"),
        "aria-hidden" => field.aria_hidden = aria_flag(doc, node, "aria-hidden"),
        "aria-disabled" => field.aria_disabled = aria_flag(doc, node, "aria-disabled"),
        "aria-haspopup" => field.aria_haspopup = aria_flag(doc, node, "aria-haspopup"),
        "data-stripe" => field.data_stripe = attribute_value(doc, node, "data-stripe"),
        _ => {}
    }
}
