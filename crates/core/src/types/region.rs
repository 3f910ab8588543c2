//! Geography: states and provinces.

use serde::{Deserialize, Serialize};

use super::id::RegionId;

/// A state or province within a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Canonical region id.
    pub id: RegionId,
    /// Short code, unique within the country (e.g. `CA` for California).
    pub code: String,
    /// Display name.
    pub name: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_id: String,
}

/// Region lookup service.
///
/// Lookups never fail; a miss is `None`.
pub trait RegionDirectory: Send + Sync {
    /// Find a region by its canonical id.
    fn find_by_id(&self, id: RegionId) -> Option<Region>;

    /// Find a region by its code within a country.
    fn find_by_code(&self, code: &str, country_id: &str) -> Option<Region>;

    /// Find a region by its display name within a country.
    fn find_by_name(&self, name: &str, country_id: &str) -> Option<Region>;

    /// Whether the directory knows any regions for the country.
    ///
    /// Addresses in such countries must carry a resolved region.
    fn has_regions(&self, country_id: &str) -> bool;
}
