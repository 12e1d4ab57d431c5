//! Transform trait for record batches.

use gf_types::Record;

/// Trait for batch transformations run by the host.
///
/// A transform receives the batch by value and hands back the same records,
/// possibly modified. It has no way to fail the batch: anything that goes
/// wrong for one record is handled (and logged) inside the transform.
///
/// # Thread Safety
///
/// Transforms must be `Send + Sync` so a host may share one across threads.
pub trait Transform: Send + Sync {
    /// Applies the transform to a batch.
    fn apply(&self, batch: Vec<Record>) -> Vec<Record>;

    /// Returns the name of this transform for logging.
    fn name(&self) -> &str {
        "transform"
    }
}
