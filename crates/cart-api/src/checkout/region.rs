//! Region resolution for address mutations.
//!
//! Customers type regions as ids, codes ("TX") or names ("Texas"). Before an
//! address mutation is applied, the submitted region is resolved against the
//! region directory into the canonical (name, id, country) triple. A region
//! that cannot be resolved is kept verbatim; address validation rejects it
//! later.

use cart_api_core::scalar;
use cart_api_core::{Attributes, Region, RegionDirectory, RegionId};
use serde_json::Value;

/// Resolve the region fields of an inbound address mutation (domain codes).
///
/// `fallback_country` and `fallback_region` are the address's current
/// country and region id, used when the mutation leaves them out. Mutations
/// that touch neither `country_id` nor `region` are returned unchanged.
#[must_use]
pub fn resolve_region(
    mut data: Attributes,
    fallback_country: Option<&str>,
    fallback_region: Option<RegionId>,
    regions: &dyn RegionDirectory,
) -> Attributes {
    // Changing country without naming a region keeps the old region, which
    // then has to prove it belongs to the new country.
    if data.contains_key("country_id") && !data.contains_key("region") {
        data.insert(
            "region".into(),
            fallback_region.map_or(Value::Null, |id| Value::from(id.as_i32())),
        );
    }

    let Some(submitted) = data.get("region").cloned() else {
        return data;
    };

    data.insert("region_id".into(), Value::Null);

    let country = match data.get("country_id") {
        Some(value) => scalar::to_opt_string(value),
        None => fallback_country.map(str::to_string),
    };

    if scalar::is_numeric(&submitted) {
        let region = scalar::to_i64(&submitted)
            .and_then(|id| i32::try_from(id).ok())
            .and_then(|id| regions.find_by_id(RegionId::new(id)));

        match region {
            Some(region)
                if country
                    .as_deref()
                    .is_none_or(|c| c.eq_ignore_ascii_case(&region.country_id)) =>
            {
                data.insert("country_id".into(), Value::from(region.country_id.clone()));
                apply(&mut data, &region);
            }
            Some(region) => {
                tracing::debug!(
                    region_id = %region.id,
                    region_country = %region.country_id,
                    country = ?country,
                    "region id belongs to another country, keeping submitted value"
                );
            }
            None => {
                tracing::debug!(region = %submitted, "unknown region id, keeping submitted value");
            }
        }
    } else if let Some(country) = country.map(|c| c.to_ascii_uppercase()) {
        let Some(text) = scalar::to_opt_string(&submitted) else {
            return data;
        };

        match regions
            .find_by_code(&text, &country)
            .or_else(|| regions.find_by_name(&text, &country))
        {
            Some(region) => apply(&mut data, &region),
            None => {
                tracing::debug!(
                    region = %text,
                    country = %country,
                    "unresolved region, keeping submitted value"
                );
            }
        }
    }

    data
}

fn apply(data: &mut Attributes, region: &Region) {
    data.insert("region".into(), Value::from(region.name.clone()));
    data.insert("region_id".into(), Value::from(region.id.as_i32()));
}
