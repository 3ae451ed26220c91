//! Minimum resolvable feature size.

use crate::settings::StudyPurpose;

/// Smallest feature (µm) that can be studied at the given voxel size.
pub fn compute_minimum_feature(voxel_size_um: i64, purpose: StudyPurpose) -> i64 {
    voxel_size_um * purpose.voxel_multiplier()
}
