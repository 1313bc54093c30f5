use crate::utils::error::{Result, SiteError};
use std::collections::BTreeMap;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SiteError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 端點路徑必須是以 `/` 開頭的絕對路徑
pub fn validate_endpoint_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must start with '/'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks that every required form field is present and not blank.
///
/// Returns the names of the offending fields, in the order they were required.
pub fn validate_required_fields(
    data: &BTreeMap<String, String>,
    required: &[String],
) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| {
            data.get(field.as_str())
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SiteError::MissingFields { fields: missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        vec!["name".to_string(), "email".to_string(), "message".to_string()]
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("site.base_url", "https://racketpro.example").is_ok());
        assert!(validate_url("site.base_url", "http://localhost:3000").is_ok());
        assert!(validate_url("site.base_url", "").is_err());
        assert!(validate_url("site.base_url", "invalid-url").is_err());
        assert!(validate_url("site.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_path() {
        assert!(validate_endpoint_path("contact_form.endpoint_path", "/api/leads").is_ok());
        assert!(validate_endpoint_path("contact_form.endpoint_path", "api/leads").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("carousel.interval_ms", 5000, 1).is_ok());
        assert!(validate_positive_number("carousel.interval_ms", 0, 1).is_err());
    }

    #[test]
    fn test_required_fields_reject_blank_values() {
        let mut data = BTreeMap::new();
        data.insert("name".to_string(), "Ada".to_string());
        data.insert("email".to_string(), "   ".to_string());

        match validate_required_fields(&data, &required()) {
            Err(SiteError::MissingFields { fields }) => {
                assert_eq!(fields, vec!["email".to_string(), "message".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_required_fields_accept_complete_form() {
        let data: BTreeMap<String, String> = [
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("message", "Restring my racket"),
            ("phone", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert!(validate_required_fields(&data, &required()).is_ok());
    }
}
