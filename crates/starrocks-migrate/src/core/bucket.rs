//! Bucket planning: derives a hash-bucket count from the planned
//! per-partition size and the backend count.

use crate::core::partition::GIB;

/// Compute the default bucket count for a partition of `basis_bytes`,
/// distributed across `be_num` backends.
///
/// Below 1 GiB a single bucket suffices. Up to one bucket per backend the
/// count tracks the size in GiB. Beyond that the count is rounded up to a
/// multiple of the backend count so buckets distribute evenly.
///
/// A rule-level `bucket_num` override always replaces this value; the
/// emitters apply it.
pub fn plan_buckets(basis_bytes: u64, be_num: u64) -> u64 {
    if basis_bytes < GIB {
        return 1;
    }
    if basis_bytes < be_num * GIB {
        return basis_bytes.div_ceil(GIB);
    }
    basis_bytes.div_ceil(be_num * GIB) * be_num
}
