// ── API-to-domain assemblers ──
//
// Pure `From` conversions between `iobuilt_api::models` resources and
// `crate::model` entities. Inbound conversions fill defaults for absent
// fields and coerce date strings; outbound conversions carry only the
// fields the backend contract defines.

mod analytics;
mod clients;
mod devices;
mod iam;
mod profiles;
mod projects;
mod subscriptions;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use iobuilt_api::ApiResponse;
use iobuilt_api::models::ClientResource;
use tracing::warn;

use crate::model::Client;

// ── Helpers ────────────────────────────────────────────────────────

/// Coerce a backend date string: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC), or a bare `YYYY-MM-DD` (midnight UTC).
///
/// Sub-second precision is cut to milliseconds, the precision
/// [`format_date`] writes back.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_date_exact(raw.trim()).map(|dt| dt.trunc_subsecs(3))
}

fn parse_date_exact(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn parse_opt_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_date)
}

/// Wire format for outbound dates.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Collections ────────────────────────────────────────────────────

/// Assemble a collection response. Unsuccessful or bodiless responses
/// yield an empty list.
pub fn entities_from_response<R, E>(response: ApiResponse<Vec<R>>) -> Vec<E>
where
    E: From<R>,
{
    if !response.is_success() {
        warn!(status = response.status, "unsuccessful response, no entities assembled");
        return Vec::new();
    }
    response
        .data
        .map(|rows| rows.into_iter().map(E::from).collect())
        .unwrap_or_default()
}

/// Client lists are only trusted on an exact 200.
pub fn clients_from_response(response: ApiResponse<Vec<ClientResource>>) -> Vec<Client> {
    if response.status != 200 {
        warn!(status = response.status, "client list not returned with 200, ignoring");
        return Vec::new();
    }
    entities_from_response(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};
    use iobuilt_api::models::ProjectResource;

    use super::*;
    use crate::model::Project;

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        let dt = parse_date("2024-06-15T10:30:00Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 6, 15, 10));

        let offset = parse_date("2024-06-15T10:30:00+02:00").unwrap();
        assert_eq!(offset.hour(), 8);

        let day = parse_date("2024-01-31").unwrap();
        assert_eq!((day.month(), day.day(), day.hour()), (1, 31, 0));

        let naive = parse_date("2024-01-31T12:00:00.250").unwrap();
        assert_eq!(naive.hour(), 12);

        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn unsuccessful_collection_is_empty() {
        let resp = ApiResponse::new(500, Some(vec![ProjectResource::default()]));
        let projects: Vec<Project> = entities_from_response(resp);
        assert!(projects.is_empty());

        let empty: ApiResponse<Vec<ProjectResource>> = ApiResponse::new(200, None);
        let projects: Vec<Project> = entities_from_response(empty);
        assert!(projects.is_empty());
    }

    #[test]
    fn client_list_requires_exact_200() {
        let rows = vec![ClientResource::default()];
        assert!(clients_from_response(ApiResponse::new(201, Some(rows.clone()))).is_empty());
        assert_eq!(clients_from_response(ApiResponse::new(200, Some(rows))).len(), 1);
    }
}
