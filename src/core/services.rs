// cloudrun-logs - core/services.rs
//
// Service result normaliser: raw control-plane descriptors -> ServiceInfo.
// Timestamps are parsed leniently: one malformed descriptor never aborts the
// whole listing.

use crate::core::model::{RawService, ServiceInfo};
use crate::util::constants::{
    zero_time, DEFAULT_REGION, DESCRIPTION_ANNOTATION, USER_IMAGE_ANNOTATION,
};
use chrono::{DateTime, Utc};

/// Region stamped on results: `region`, or the default when it is empty.
pub fn resolve_region(region: &str) -> &str {
    if region.is_empty() {
        DEFAULT_REGION
    } else {
        region
    }
}

/// Normalise a listing page.
///
/// `now` is the moment of the call; it becomes the update time of every
/// service that carries a deployed-image annotation (see [`ServiceInfo`]).
pub fn normalize_services(
    items: Vec<RawService>,
    region: &str,
    now: DateTime<Utc>,
) -> Vec<ServiceInfo> {
    let region = resolve_region(region);
    items
        .into_iter()
        .map(|item| normalize_service(item, region, now))
        .collect()
}

/// Normalise one descriptor.
pub fn normalize_service(item: RawService, region: &str, now: DateTime<Utc>) -> ServiceInfo {
    let create_time = parse_creation_time(&item.creation_timestamp);

    let has_user_image = item
        .annotations
        .get(USER_IMAGE_ANNOTATION)
        .is_some_and(|image| !image.is_empty());
    let update_time = if has_user_image { now } else { create_time };

    let status = item.conditions.first().map(|c| c.status.clone());

    let RawService {
        name,
        mut annotations,
        url,
        ..
    } = item;

    ServiceInfo {
        name,
        description: annotations.remove(DESCRIPTION_ANNOTATION).unwrap_or_default(),
        url,
        status,
        region: region.to_string(),
        create_time,
        update_time,
    }
}

/// Parse an RFC 3339 creation timestamp; anything unparsable is the
/// zero time.
fn parse_creation_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|_| zero_time())
}
