//! Configuration validation

use crate::schema::{RawConfig, RawEndpoint};
use crate::settings::{
    DEFAULT_FREE_QUOTA_SECONDS, DEFAULT_PREMIUM_QUOTA_SECONDS, DEFAULT_WARNING_SECONDS,
    LaunchStrategy, RequestPayload,
};
use cvm_util::is_http_url;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Endpoint list '{list}': {message}")]
    EndpointListError { list: String, message: String },

    #[error("Duplicate endpoint URL in '{list}': {url}")]
    DuplicateEndpoint { list: String, url: String },

    #[error("Invalid URL for {field} '{value}': must start with http:// or https://")]
    InvalidUrl { field: String, value: String },

    #[error("Unknown {field} '{value}'")]
    UnknownVariant { field: String, value: String },

    #[error("{field} must be greater than zero")]
    ZeroQuota { field: String },

    #[error("Warning threshold {warning}s >= {field} {quota}s")]
    WarningExceedsQuota {
        field: String,
        warning: u64,
        quota: u64,
    },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(endpoints) = &config.endpoints {
        errors.extend(validate_endpoints("endpoints", endpoints));
    }
    if let Some(endpoints) = &config.premium_endpoints {
        errors.extend(validate_endpoints("premium_endpoints", endpoints));
    }

    if let Some(url) = &config.session.landing_url {
        errors.extend(check_url("session.landing_url", url));
    }
    if let Some(url) = &config.account.base_url {
        errors.extend(check_url("account.base_url", url));
    }

    if let Some(strategy) = &config.session.launch_strategy
        && LaunchStrategy::parse(strategy).is_none()
    {
        errors.push(ValidationError::UnknownVariant {
            field: "session.launch_strategy".into(),
            value: strategy.clone(),
        });
    }
    if let Some(payload) = &config.session.request_payload
        && RequestPayload::parse(payload).is_none()
    {
        errors.push(ValidationError::UnknownVariant {
            field: "session.request_payload".into(),
            value: payload.clone(),
        });
    }

    let warning = config.timer.warning_seconds.unwrap_or(DEFAULT_WARNING_SECONDS);
    let quotas = [
        (
            "timer.free_quota_seconds",
            config.timer.free_quota_seconds.unwrap_or(DEFAULT_FREE_QUOTA_SECONDS),
        ),
        (
            "timer.premium_quota_seconds",
            config
                .timer
                .premium_quota_seconds
                .unwrap_or(DEFAULT_PREMIUM_QUOTA_SECONDS),
        ),
    ];
    for (field, quota) in quotas {
        if quota == 0 {
            errors.push(ValidationError::ZeroQuota {
                field: field.into(),
            });
        } else if warning >= quota {
            errors.push(ValidationError::WarningExceedsQuota {
                field: field.into(),
                warning,
                quota,
            });
        }
    }

    errors
}

fn validate_endpoints(list: &str, endpoints: &[RawEndpoint]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if endpoints.is_empty() {
        errors.push(ValidationError::EndpointListError {
            list: list.into(),
            message: "at least one endpoint is required".into(),
        });
        return errors;
    }

    let mut seen = HashSet::new();
    for endpoint in endpoints {
        if !seen.insert(endpoint.url.as_str()) {
            errors.push(ValidationError::DuplicateEndpoint {
                list: list.into(),
                url: endpoint.url.clone(),
            });
        }
        errors.extend(check_url(&format!("{list} endpoint"), &endpoint.url));
    }

    let selected = endpoints.iter().filter(|e| e.selected).count();
    if selected != 1 {
        errors.push(ValidationError::EndpointListError {
            list: list.into(),
            message: format!("exactly one endpoint must be selected, found {selected}"),
        });
    }

    errors
}

fn check_url(field: &str, value: &str) -> Option<ValidationError> {
    if is_http_url(value) {
        None
    } else {
        Some(ValidationError::InvalidUrl {
            field: field.into(),
            value: value.into(),
        })
    }
}
