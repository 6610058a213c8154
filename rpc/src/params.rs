//! Query-string and path parameter parsing.
//!
//! Every failure is reported as a validation error naming the offending parameter.

use std::fmt::Display;
use std::str::FromStr;

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use procura_types::pagination::{DEFAULT_LIMIT, DEFAULT_OFFSET};
use procura_types::{Pagination, ServiceType};
use serde::de::DeserializeOwned;

use crate::RpcError;

/// Raw query pairs, in order. Repeated keys are kept.
#[derive(Clone, Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Missing and empty both read as the empty string.
    pub fn optional(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    pub fn required(&self, name: &str) -> Result<String, RpcError> {
        match self.get(name) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(RpcError::Validation(format!("{name} required"))),
        }
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Required parameter restricted to `allowed`.
    pub fn one_of<T>(&self, name: &str, allowed: &[T]) -> Result<T, RpcError>
    where
        T: Copy + Display + FromStr + PartialEq,
    {
        one_of(&self.required(name)?, name, allowed)
    }

    pub fn pagination(&self) -> Result<Pagination, RpcError> {
        Ok(Pagination::new(
            non_negative(self.get("limit"), "limit", DEFAULT_LIMIT)?,
            non_negative(self.get("offset"), "offset", DEFAULT_OFFSET)?,
        ))
    }

    pub fn service_types(&self) -> Result<Vec<ServiceType>, RpcError> {
        self.all("service_type")
            .map(|s| {
                s.parse()
                    .map_err(|_| RpcError::Validation(format!("invalid service type value: {s}")))
            })
            .collect()
    }
}

fn non_negative(value: Option<&str>, name: &str, default: u32) -> Result<u32, RpcError> {
    match value {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| RpcError::Validation(format!("{name} must be simple positive num"))),
    }
}

/// `value` parsed and checked against `allowed`.
pub fn one_of<T>(value: &str, name: &str, allowed: &[T]) -> Result<T, RpcError>
where
    T: Copy + Display + FromStr + PartialEq,
{
    value
        .parse::<T>()
        .ok()
        .filter(|v| allowed.contains(v))
        .ok_or_else(|| {
            let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            RpcError::Validation(format!(
                "invalid {name} format, must be in: [{}]",
                names.join(" ")
            ))
        })
}

/// Path identifier, e.g. a tender or bid id.
pub fn parse_id<T: FromStr>(value: &str, name: &str) -> Result<T, RpcError> {
    if value.is_empty() {
        return Err(RpcError::Validation(format!("{name} required")));
    }
    value
        .parse()
        .map_err(|_| RpcError::Validation(format!("invalid {name} format")))
}

/// Snapshot version from the path; versions start at 1.
pub fn parse_version(value: &str) -> Result<u32, RpcError> {
    let version: u32 = parse_id(value, "version")?;
    if version == 0 {
        return Err(RpcError::Validation(
            "version must be simple positive num".to_string(),
        ));
    }
    Ok(version)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = RpcError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map(|Query(pairs)| QueryParams(pairs))
            .map_err(|e| {
                tracing::debug!(error = %e, "malformed query string");
                RpcError::WrongFormat
            })
    }
}

/// JSON body whose decoding failures render as `wrong data format`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RpcError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(v)| JsonBody(v))
            .map_err(|e| {
                tracing::debug!(error = %e, "undecodable body");
                RpcError::WrongFormat
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procura_types::{BidStatus, TenderId};

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn reason(err: RpcError) -> String {
        err.reason()
    }

    #[test]
    fn pagination_defaults_and_errors() {
        assert_eq!(params(&[]).pagination().unwrap(), Pagination::new(5, 0));
        assert_eq!(
            params(&[("limit", "10"), ("offset", "20")]).pagination().unwrap(),
            Pagination::new(10, 20)
        );
        assert_eq!(
            reason(params(&[("limit", "-1")]).pagination().unwrap_err()),
            "validation failed: limit must be simple positive num"
        );
        assert_eq!(
            reason(params(&[("offset", "x")]).pagination().unwrap_err()),
            "validation failed: offset must be simple positive num"
        );
    }

    #[test]
    fn repeated_service_types_are_collected() {
        let p = params(&[("service_type", "Delivery"), ("service_type", "Manufacture")]);
        assert_eq!(
            p.service_types().unwrap(),
            vec![ServiceType::Delivery, ServiceType::Manufacture]
        );
        assert_eq!(
            reason(params(&[("service_type", "Cleaning")]).service_types().unwrap_err()),
            "validation failed: invalid service type value: Cleaning"
        );
    }

    #[test]
    fn one_of_lists_allowed_values() {
        let allowed = [BidStatus::Created, BidStatus::Published, BidStatus::Canceled];
        assert_eq!(
            params(&[("status", "Published")]).one_of("status", &allowed).unwrap(),
            BidStatus::Published
        );
        assert_eq!(
            reason(params(&[("status", "Approved")]).one_of("status", &allowed).unwrap_err()),
            "validation failed: invalid status format, must be in: [Created Published Canceled]"
        );
        assert_eq!(
            reason(params(&[]).one_of("status", &allowed).unwrap_err()),
            "validation failed: status required"
        );
    }

    #[test]
    fn ids_and_versions() {
        assert!(parse_id::<TenderId>("nope", "tenderId").is_err());
        assert_eq!(
            reason(parse_id::<TenderId>("nope", "tenderId").unwrap_err()),
            "validation failed: invalid tenderId format"
        );
        assert_eq!(parse_version("3").unwrap(), 3);
        assert!(parse_version("0").is_err());
        assert!(parse_version("-2").is_err());
    }
}
