use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::collect::attributes::{
    aria_flag, attribute_value, autocomplete_type, boolean_attribute, data_set_values,
    element_value, form_action, is_field_element, is_form_element, is_form_or_field_element,
    is_important_field, is_inside_submit_button, max_length, owning_form, select_options,
};
use crate::collect::cache::DescriptorCache;
use crate::collect::intersection::IntersectionRegistry;
use crate::collect::labels::{label_tag_text, left_label_text, right_label_text, top_label_text};
use crate::collect::overlay::OverlayNotifier;
use crate::collect::scheduler::{Clock, Debouncer, SystemClock};
use crate::collect::snapshot_model::{FieldDescriptor, FormDescriptor, PageSnapshot};
use crate::dom::dom_model::{Document, MutationRecord, NodeId};
use crate::dom::query::{DomQuery, TreeWalkerQuery};
use crate::dom::visibility::{StyleVisibility, VisibilityOracle, viewable_or_hidden};

// ============================================================================
// Configuration and counters
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Maximum number of fields kept per collection
    pub max_fields: usize,
    /// Quiet window before queued mutations are drained
    pub debounce_ms: u64,
    /// Latest a queued mutation may wait before it is drained
    pub max_wait_ms: u64,
    /// Latest a scheduled rebuild may wait for an idle slot
    pub rebuild_timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_fields: 100,
            debounce_ms: 100,
            max_wait_ms: 500,
            rebuild_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Snapshots produced by a full query of the document
    pub full_collections: usize,
    /// Snapshots served from the cache
    pub cached_snapshots: usize,
    /// Times the mutation queue was drained
    pub mutation_drains: usize,
    /// Rebuilds run by the scheduler after mutations or navigation
    pub rebuild_passes: usize,
    /// Descriptors built for fields added between collections
    pub deferred_builds: usize,
}

// ============================================================================
// PageCollector
// ============================================================================

/// Incremental index of the forms and fields of one document.
///
/// The collector owns its caches, the mutation queue and both observers'
/// state. The host feeds it mutation records and intersection reports and
/// calls [`run_pending`](PageCollector::run_pending) when idle.
pub struct PageCollector {
    pub(crate) config: CollectorConfig,
    pub(crate) visibility: Box<dyn VisibilityOracle>,
    pub(crate) query: Box<dyn DomQuery>,
    pub(crate) overlay: Option<Box<dyn OverlayNotifier>>,
    pub(crate) clock: Box<dyn Clock>,

    pub(crate) forms: DescriptorCache<FormDescriptor>,
    pub(crate) fields: DescriptorCache<FieldDescriptor>,
    pub(crate) recently_mutated: bool,
    pub(crate) no_fields_found: bool,
    pub(crate) observers_installed: bool,
    pub(crate) current_location: String,

    pub(crate) mutation_queue: VecDeque<Vec<MutationRecord>>,
    pub(crate) drain: Debouncer,
    pub(crate) rebuild: Debouncer,
    pub(crate) deferred: Vec<NodeId>,
    pub(crate) intersections: IntersectionRegistry,
    pub(crate) stats: CollectorStats,
}

impl Default for PageCollector {
    fn default() -> Self {
        Self::new(
            CollectorConfig::default(),
            Box::new(StyleVisibility),
            Box::new(TreeWalkerQuery::new()),
            Box::new(SystemClock),
        )
    }
}

impl PageCollector {
    pub fn new(
        config: CollectorConfig,
        visibility: Box<dyn VisibilityOracle>,
        query: Box<dyn DomQuery>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let drain = Debouncer::new(config.debounce_ms, config.max_wait_ms);
        // Idle callback: runs at the next idle slot, at the latest after the timeout.
        let rebuild = Debouncer::new(0, config.rebuild_timeout_ms);
        Self {
            config,
            visibility,
            query,
            overlay: None,
            clock,
            forms: DescriptorCache::new(),
            fields: DescriptorCache::new(),
            recently_mutated: true,
            no_fields_found: false,
            observers_installed: false,
            current_location: String::new(),
            mutation_queue: VecDeque::new(),
            drain,
            rebuild,
            deferred: Vec::new(),
            intersections: IntersectionRegistry::default(),
            stats: CollectorStats::default(),
        }
    }

    pub fn with_overlay(mut self, overlay: Box<dyn OverlayNotifier>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    pub fn observers_installed(&self) -> bool {
        self.observers_installed
    }

    pub fn is_observing_intersection(&self, node: NodeId) -> bool {
        self.intersections.is_observed(node)
    }

    pub fn cached_field(&self, node: NodeId) -> Option<&FieldDescriptor> {
        self.fields.get(node)
    }

    pub fn cached_form(&self, node: NodeId) -> Option<&FormDescriptor> {
        self.forms.get(node)
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    /// Current page details. Serves the cache when nothing relevant changed
    /// since the last call; otherwise re-queries the document.
    pub fn get_snapshot(&mut self, doc: &Document) -> PageSnapshot {
        if !self.observers_installed {
            self.install_observers(doc);
        }

        if !self.recently_mutated && self.no_fields_found {
            return self.empty_snapshot(doc);
        }

        if !self.recently_mutated && !self.fields.is_empty() {
            self.refresh_cached_visibility(doc);
            self.stats.cached_snapshots += 1;
            return self.snapshot_from_cache(doc);
        }

        self.full_collection(doc)
    }

    fn install_observers(&mut self, doc: &Document) {
        self.observers_installed = true;
        self.current_location = doc.url().to_string();
        self.query.check_page_contains_shadow_dom(doc);
        debug!(url = doc.url(), "collector observers installed");
    }

    fn full_collection(&mut self, doc: &Document) -> PageSnapshot {
        let root = doc.root();
        let candidates = self
            .query
            .query_all(doc, root, &is_form_or_field_element, false);

        let form_nodes: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|n| is_form_element(doc, *n))
            .collect();
        let field_nodes = self.cap_fields(
            doc,
            candidates
                .iter()
                .copied()
                .filter(|n| is_field_element(doc, *n))
                .collect(),
        );

        self.build_forms(doc, &form_nodes);
        self.build_fields(doc, &field_nodes);

        self.no_fields_found = self.fields.is_empty();
        self.recently_mutated = false;
        self.stats.full_collections += 1;

        let snapshot = self.snapshot_from_cache(doc);
        info!(
            url = doc.url(),
            forms = snapshot.forms.len(),
            fields = snapshot.fields.len(),
            "page details collected"
        );
        snapshot
    }

    /// Keep every important field first, then backfill checkboxes and radios,
    /// up to the cap. Document order is preserved in the result.
    fn cap_fields(&self, doc: &Document, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let cap = self.config.max_fields;
        if nodes.len() <= cap {
            return nodes;
        }

        let (important, unimportant): (Vec<NodeId>, Vec<NodeId>) =
            nodes.iter().copied().partition(|n| is_important_field(doc, *n));
        let mut kept: HashSet<NodeId> = important.into_iter().take(cap).collect();
        let room = cap - kept.len();
        kept.extend(unimportant.into_iter().take(room));

        debug!(found = nodes.len(), kept = kept.len(), "field cap applied");
        nodes.into_iter().filter(|n| kept.contains(n)).collect()
    }

    fn build_forms(&mut self, doc: &Document, nodes: &[NodeId]) {
        let mut previous = std::mem::take(&mut self.forms);
        for (index, node) in nodes.iter().copied().enumerate() {
            let opid = format!("__form__{}", index);
            let descriptor = match previous.remove(node) {
                Some(mut cached) => {
                    cached.opid = opid;
                    cached
                }
                None => FormDescriptor {
                    opid,
                    html_action: form_action(doc, node),
                    html_name: attribute_value(doc, node, "name"),
                    html_class: attribute_value(doc, node, "class"),
                    html_id: attribute_value(doc, node, "id"),
                    html_method: attribute_value(doc, node, "method"),
                },
            };
            self.forms.insert(node, descriptor);
        }
    }

    fn build_fields(&mut self, doc: &Document, nodes: &[NodeId]) {
        let mut previous = std::mem::take(&mut self.fields);
        for (index, node) in nodes.iter().copied().enumerate() {
            if is_inside_submit_button(doc, node) {
                continue;
            }
            let descriptor = match previous.remove(node) {
                Some(mut cached) => {
                    cached.opid = field_opid(index);
                    cached.element_number = index;
                    cached.form = self.form_opid_for(doc, node);
                    cached
                }
                None => self.describe_field(doc, node, Some(index)),
            };
            self.fields.insert(node, descriptor);
        }
    }

    /// Build a descriptor for one element. `index` is `None` for elements
    /// added between collections; the next full collection assigns it.
    pub(crate) fn describe_field(&mut self, doc: &Document, node: NodeId, index: Option<usize>) -> FieldDescriptor {
        let viewable = viewable_or_hidden(self.visibility.as_ref(), doc, node);
        let tag_name = doc.tag(node).unwrap_or_default().to_string();

        let mut field = FieldDescriptor {
            opid: index.map(field_opid).unwrap_or_else(|| UNRESOLVED_OPID.to_string()),
            element_number: index.unwrap_or_default(),
            max_length: max_length(doc, node),
            viewable,
            html_id: attribute_value(doc, node, "id"),
            html_name: attribute_value(doc, node, "name"),
            html_class: attribute_value(doc, node, "class"),
            tabindex: attribute_value(doc, node, "tabindex"),
            title: attribute_value(doc, node, "title"),
            tag_name,
            data_set_values: Some(data_set_values(doc, node)),
            ..FieldDescriptor::default()
        };

        if !viewable {
            self.intersections.observe(node);
        }

        if field.is_span() {
            return field;
        }

        let field_type = doc.element_type(node);
        if field_type.as_deref() != Some("hidden") {
            field.label_tag = Some(label_tag_text(doc, node));
            field.label_data = attribute_value(doc, node, "data-label");
            field.label_aria = attribute_value(doc, node, "aria-label");
            field.label_top = top_label_text(doc, node);
            field.label_right = Some(right_label_text(doc, node));
            field.label_left = Some(left_label_text(doc, node));
            field.placeholder = attribute_value(doc, node, "placeholder");
        }

        field.rel = attribute_value(doc, node, "rel");
        field.field_type = field_type;
        field.value = Some(element_value(doc, node));
        field.checked = boolean_attribute(doc, node, "checked");
        field.auto_complete_type = autocomplete_type(doc, node);
        field.disabled = boolean_attribute(doc, node, "disabled");
        field.readonly = boolean_attribute(doc, node, "readonly");
        field.select_info = select_options(doc, node);
        field.form = self.form_opid_for(doc, node);
        field.aria_hidden = aria_flag(doc, node, "aria-hidden");
        field.aria_disabled = aria_flag(doc, node, "aria-disabled");
        field.aria_haspopup = aria_flag(doc, node, "aria-haspopup");
        field.data_stripe = attribute_value(doc, node, "data-stripe");

        field
    }

    fn form_opid_for(&self, doc: &Document, node: NodeId) -> Option<String> {
        owning_form(doc, node)
            .and_then(|form| self.forms.get(form))
            .map(|form| form.opid.clone())
    }

    fn refresh_cached_visibility(&mut self, doc: &Document) {
        for node in self.fields.nodes() {
            let viewable = viewable_or_hidden(self.visibility.as_ref(), doc, node);
            let was_viewable = match self.fields.get_mut(node) {
                Some(field) => std::mem::replace(&mut field.viewable, viewable),
                None => continue,
            };
            if !was_viewable && viewable {
                self.announce_viewable(doc, node);
            }
        }
    }

    /// Notify the overlay once per element that it became viewable.
    pub(crate) fn announce_viewable(&mut self, doc: &Document, node: NodeId) {
        if !self.intersections.mark_announced(node) {
            return;
        }
        let page = self.snapshot_from_cache(doc);
        if let (Some(overlay), Some(field)) = (self.overlay.as_mut(), self.fields.get(node)) {
            overlay.field_became_viewable(field, &page);
        }
    }

    pub(crate) fn snapshot_from_cache(&self, doc: &Document) -> PageSnapshot {
        let forms: BTreeMap<String, FormDescriptor> = self
            .forms
            .iter()
            .map(|(_, form)| (form.opid.clone(), form.clone()))
            .collect();
        let mut fields: Vec<FieldDescriptor> = self.fields.iter().map(|(_, f)| f.clone()).collect();
        fields.sort_by_key(|f| f.element_number);

        PageSnapshot {
            title: doc.title().to_string(),
            url: doc.url().to_string(),
            document_url: doc.url().to_string(),
            forms,
            fields,
            collected_timestamp: self.clock.now_ms(),
        }
    }

    fn empty_snapshot(&self, doc: &Document) -> PageSnapshot {
        PageSnapshot {
            title: doc.title().to_string(),
            url: doc.url().to_string(),
            document_url: doc.url().to_string(),
            forms: BTreeMap::new(),
            fields: Vec::new(),
            collected_timestamp: self.clock.now_ms(),
        }
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Element addressed by `opid`. Falls back to the index encoded in `__N`
    /// when the element is no longer cached under that opid.
    pub fn field_element_by_opid(&self, doc: &Document, opid: &str) -> Option<NodeId> {
        if let Some(node) = self.fields.node_for_opid(opid).filter(|n| doc.is_connected(*n)) {
            return Some(node);
        }

        let index: usize = opid.strip_prefix("__")?.parse().ok()?;
        let fields: Vec<NodeId> = self
            .query
            .query_all(doc, doc.root(), &is_field_element, false);
        self.cap_fields(doc, fields).get(index).copied()
    }

    pub fn is_password_field_within_document(&self, doc: &Document) -> bool {
        let password = |d: &Document, n: NodeId| {
            d.tag(n) == Some("input") && d.element_type(n).as_deref() == Some("password")
        };
        !self.query.query_all(doc, doc.root(), &password, false).is_empty()
    }

    // ------------------------------------------------------------------------
    // Viewport intersection
    // ------------------------------------------------------------------------

    /// Handle intersection reports for observed elements.
    pub fn handle_intersections(&mut self, doc: &Document, entries: &[NodeId]) {
        for node in entries.iter().copied() {
            if !self.intersections.is_observed(node) {
                continue;
            }
            if self.intersections.take_initializing(node) {
                continue;
            }
            if !self.fields.contains(node) {
                self.intersections.unobserve(node);
                continue;
            }

            if !viewable_or_hidden(self.visibility.as_ref(), doc, node) {
                continue;
            }
            if let Some(field) = self.fields.get_mut(node) {
                field.viewable = true;
            }
            self.announce_viewable(doc, node);
        }
    }

    /// Drop every cache, queue, schedule and observer.
    pub fn destroy(&mut self) {
        self.forms.clear();
        self.fields.clear();
        self.mutation_queue.clear();
        self.drain.cancel();
        self.rebuild.cancel();
        self.deferred.clear();
        self.intersections.clear();
        self.observers_installed = false;
        self.recently_mutated = true;
        self.no_fields_found = false;
        debug!("collector destroyed");
    }
}

/// Placeholder opid for descriptors built outside a full collection.
pub const UNRESOLVED_OPID: &str = "__-1";

pub fn field_opid(index: usize) -> String {
    format!("__{}", index)
}
