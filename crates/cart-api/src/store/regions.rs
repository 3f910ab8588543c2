//! In-memory region directory.

use std::collections::BTreeMap;

use cart_api_core::{Region, RegionDirectory, RegionId};

/// `(id, country, code, name)` rows the default directory is seeded with.
const DEFAULT_REGIONS: &[(i32, &str, &str, &str)] = &[
    (1, "US", "AL", "Alabama"),
    (2, "US", "AK", "Alaska"),
    (4, "US", "AZ", "Arizona"),
    (12, "US", "CA", "California"),
    (13, "US", "CO", "Colorado"),
    (18, "US", "FL", "Florida"),
    (43, "US", "NY", "New York"),
    (57, "US", "TX", "Texas"),
    (62, "US", "WA", "Washington"),
    (66, "CA", "AB", "Alberta"),
    (67, "CA", "BC", "British Columbia"),
    (74, "CA", "ON", "Ontario"),
    (76, "CA", "QC", "Quebec"),
    (79, "DE", "NDS", "Niedersachsen"),
    (80, "DE", "BAW", "Baden-Württemberg"),
    (81, "DE", "BAY", "Bayern"),
    (82, "DE", "BER", "Berlin"),
    (83, "DE", "BRG", "Brandenburg"),
];

/// Regions indexed by id.
///
/// Code lookups are exact; name lookups ignore case. Country codes are
/// compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegionDirectory {
    regions: BTreeMap<RegionId, Region>,
}

impl InMemoryRegionDirectory {
    #[must_use]
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            regions: regions.into_iter().map(|region| (region.id, region)).collect(),
        }
    }

    /// The directory seeded with US, Canadian and German regions.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_REGIONS
                .iter()
                .map(|&(id, country_id, code, name)| Region {
                    id: RegionId::new(id),
                    code: code.to_string(),
                    name: name.to_string(),
                    country_id: country_id.to_string(),
                }),
        )
    }

    fn in_country<'a>(&'a self, country_id: &'a str) -> impl Iterator<Item = &'a Region> + 'a {
        self.regions
            .values()
            .filter(move |region| region.country_id.eq_ignore_ascii_case(country_id))
    }
}

impl RegionDirectory for InMemoryRegionDirectory {
    fn find_by_id(&self, id: RegionId) -> Option<Region> {
        self.regions.get(&id).cloned()
    }

    fn find_by_code(&self, code: &str, country_id: &str) -> Option<Region> {
        self.in_country(country_id)
            .find(|region| region.code == code)
            .cloned()
    }

    fn find_by_name(&self, name: &str, country_id: &str) -> Option<Region> {
        self.in_country(country_id)
            .find(|region| region.name.to_lowercase() == name.to_lowercase())
            .cloned()
    }

    fn has_regions(&self, country_id: &str) -> bool {
        self.in_country(country_id).next().is_some()
    }
}
