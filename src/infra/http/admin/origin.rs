//! Client origin as reported by the edge proxy.

use axum::http::HeaderMap;

use crate::domain::geo::GeoData;

const CLIENT_IP: &str = "cf-connecting-ip";
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const COUNTRY: &str = "cf-ipcountry";
const REGION: &str = "cf-region";
const CITY: &str = "cf-ipcity";
const TIMEZONE: &str = "cf-timezone";
const LATITUDE: &str = "cf-iplatitude";
const LONGITUDE: &str = "cf-iplongitude";
const AS_ORGANIZATION: &str = "cf-as-organization";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    header(headers, CLIENT_IP)
        .or_else(|| {
            header(headers, FORWARDED_FOR)
                .and_then(|chain| chain.split(',').next().map(|ip| ip.trim().to_string()))
                .filter(|ip| !ip.is_empty())
        })
        .or_else(|| header(headers, REAL_IP))
}

pub(super) fn request_geo(headers: &HeaderMap) -> GeoData {
    GeoData {
        ip: client_ip(headers),
        country: header(headers, COUNTRY),
        region: header(headers, REGION),
        city: header(headers, CITY),
        timezone: header(headers, TIMEZONE),
        latitude: header(headers, LATITUDE),
        longitude: header(headers, LONGITUDE),
        as_organization: header(headers, AS_ORGANIZATION),
    }
}
