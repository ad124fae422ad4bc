//! Wrapping data files as external resources with their companions.

use std::path::Path;

use tracing::debug;

use super::location::resolve_location;
use crate::model::{DataSet, ExternalResource, SubResourceSlot};

/// Suffixes of index files. These are attached to a primary resource and
/// never registered on their own.
pub const FILE_INDICES: [&str; 7] = [
    ".fai",
    ".pbi",
    ".bai",
    ".metadata.xml",
    ".index",
    ".contig.index",
    ".sa",
];

/// True when `path` names an index file.
pub fn is_index_file(path: &str) -> bool {
    FILE_INDICES.iter().any(|suffix| path.ends_with(suffix))
}

/// True when `path` names a sub-resource (scraps, control reads).
pub fn is_sub_resource_file(path: &str) -> bool {
    SubResourceSlot::ALL
        .iter()
        .any(|slot| path.ends_with(slot.suffix()))
}

/// Index files present on disk next to `resource_id`, in suffix order.
pub fn companion_indices(resource_id: &str) -> Vec<String> {
    FILE_INDICES
        .iter()
        .map(|suffix| format!("{resource_id}{suffix}"))
        .filter(|candidate| Path::new(candidate).exists())
        .collect()
}

/// Wraps a primary data file as an [`ExternalResource`].
///
/// Returns `None` for index files. The path is resolved, existing index
/// files are attached, and for `subreads.bam` files the sibling scraps and
/// control BAMs are wrapped and attached to their slots.
pub fn wrap_new_resource(path: &Path) -> Option<ExternalResource> {
    let raw = path.to_string_lossy();
    if is_index_file(&raw) {
        debug!(
            "Index file {raw} given as regular file, will be treated as an index file instead"
        );
        return None;
    }

    let resource_id = resolve_location(path, None)
        .to_string_lossy()
        .into_owned();
    let mut resource = ExternalResource::new(resource_id.clone());
    resource.add_indices(companion_indices(&resource_id));

    // Only subreads carry sub-resources; this keeps scraps off scraps.
    if resource_id.ends_with("subreads.bam") {
        for slot in SubResourceSlot::ALL {
            let sibling = sibling_path(&resource_id, slot);
            if !Path::new(&sibling).exists() {
                continue;
            }
            if let Some(sub) = wrap_new_resource(Path::new(&sibling)) {
                resource.set_sub_resource(slot, sub);
            }
        }
    }

    Some(resource)
}

/// `movie.subreads.bam` -> `movie` + slot suffix.
fn sibling_path(resource_id: &str, slot: SubResourceSlot) -> String {
    let mut parts = resource_id.rsplitn(3, '.');
    let stem = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(stem)) => stem,
        _ => "",
    };
    format!("{stem}{}", slot.suffix())
}

/// Adds a single data file to `dataset` as a top-level resource.
///
/// Index and sub-resource files are skipped with a debug diagnostic; they
/// are only ever attached to a primary resource. Counts are not refreshed.
pub fn add_generic_file(dataset: &mut DataSet, path: &Path) {
    let raw = path.to_string_lossy();
    if is_sub_resource_file(&raw) || is_index_file(&raw) {
        debug!(
            "Sub resource file {raw} given as regular file, will be treated as a sub resource file instead"
        );
        return;
    }

    if let Some(resource) = wrap_new_resource(path) {
        dataset.add_external_resources([resource], false);
    }
}
