use crate::collect::snapshot_model::{FieldDescriptor, PageSnapshot};

/// Inline menu collaborator. The collector only notifies it; rendering and
/// user-entered-field tracking live on the other side.
pub trait OverlayNotifier {
    /// The page changed address; held page details must be re-requested.
    fn page_details_stale(&mut self);

    /// Forget any fields the user typed into before navigation.
    fn clear_user_filled_fields(&mut self);

    /// A field that was collected while hidden is now viewable.
    fn field_became_viewable(&mut self, field: &FieldDescriptor, page: &PageSnapshot);
}
