use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a facility placed on a floorplan. Stays valid until the
    /// facility is removed.
    pub struct FacilityId;
}

/// Identifies a facility type in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacilityTypeId(pub u32);
