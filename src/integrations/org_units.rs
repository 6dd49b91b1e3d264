//! Build DHIS2 organisation unit metadata from a GeoJSON feature collection.
//!
//! Limited to a country root plus one subnational level: the country becomes
//! the level-1 org unit and every feature a level-2 child. Produces both the
//! `organisationUnits` metadata payload and a copy of the GeoJSON with each
//! feature stamped with its org unit id and properties, so boundaries can be
//! imported alongside the metadata.

use chrono::Utc;
use serde_json::{json, Value};

use crate::utils::error::{EoError, Result};

const UID_LEN: usize = 11;
/// DHIS2 caps shortName at 50 characters.
const SHORT_NAME_MAX: usize = 50;

/// A DHIS2 UID: one letter followed by 10 alphanumerics. Derived from a
/// digest of the seed, so re-running an export yields the same ids and
/// repeated imports update rather than duplicate.
pub fn uid_for(seed: &str) -> String {
    const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    const ALNUM: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let digest = md5::compute(seed.as_bytes());
    let mut uid = String::with_capacity(UID_LEN);
    uid.push(LETTERS[digest[0] as usize % LETTERS.len()] as char);
    for byte in digest.iter().skip(1).take(UID_LEN - 1) {
        uid.push(ALNUM[*byte as usize % ALNUM.len()] as char);
    }
    uid
}

fn short_name(name: &str) -> String {
    name.chars().take(SHORT_NAME_MAX).collect()
}

/// The two payloads an org unit import needs.
#[derive(Debug, Clone)]
pub struct OrgUnitExport {
    /// `{"organisationUnits": [...]}` for the metadata endpoint.
    pub metadata: Value,
    /// Input GeoJSON with feature ids and properties replaced by org unit
    /// attributes, for the geometry import.
    pub geojson: Value,
}

/// Translate a GeoJSON feature collection of subnational boundaries to DHIS2
/// organisation units under a new country root. `name_field` names the
/// feature property holding the unit name; features without it are "Unnamed".
pub fn geojson_to_org_units(
    geojson: &Value,
    country: &str,
    name_field: &str,
) -> Result<OrgUnitExport> {
    let features = geojson
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| EoError::processing("GeoJSON input has no 'features' array"))?;

    let opening_date = Utc::now().date_naive().to_string();
    let country_uid = uid_for(country);
    let mut org_units = vec![json!({
        "id": country_uid,
        "name": country,
        "shortName": short_name(country),
        "openingDate": &opening_date,
        "level": 1,
    })];

    for (index, feature) in features.iter().enumerate() {
        let name = feature
            .get("properties")
            .and_then(|props| props.get(name_field))
            .and_then(Value::as_str)
            .unwrap_or("Unnamed");
        org_units.push(json!({
            "id": uid_for(&format!("{}/{}/{}", country, index, name)),
            "name": name,
            "shortName": short_name(name),
            "openingDate": &opening_date,
            "level": 2,
            "parent": { "id": country_uid },
        }));
    }

    // Stamp each feature with its org unit id and attributes (skipping the
    // country root, which has no geometry of its own).
    let mut stamped = geojson.clone();
    if let Some(features) = stamped.get_mut("features").and_then(Value::as_array_mut) {
        for (feature, org_unit) in features.iter_mut().zip(org_units.iter().skip(1)) {
            if let Some(obj) = feature.as_object_mut() {
                obj.insert("id".to_string(), org_unit["id"].clone());
                obj.insert("properties".to_string(), org_unit.clone());
            }
        }
    }

    Ok(OrgUnitExport {
        metadata: json!({ "organisationUnits": org_units }),
        geojson: stamped,
    })
}
