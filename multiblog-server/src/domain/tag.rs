use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::text::sanitize_text;

pub(crate) const DEFAULT_TAG_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Tag {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Tag plus the number of published posts carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagWithCount {
    pub(crate) tag: Tag,
    pub(crate) posts_count: i64,
}

/// What to do with tag ids that do not resolve to an existing tag when a
/// post is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TagAssignmentPolicy {
    /// Unknown ids fail the request before anything is written.
    Strict,
    /// Unknown ids are dropped and logged; association failures never fail
    /// the surrounding post write.
    #[default]
    BestEffort,
}

impl FromStr for TagAssignmentPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TagAssignmentPolicy::Strict),
            "best_effort" | "best-effort" => Ok(TagAssignmentPolicy::BestEffort),
            other => Err(format!(
                "unknown tag assignment policy '{other}', expecting strict or best_effort"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateTagRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl CreateTagRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            description: self
                .description
                .map(|v| normalize_description(&v))
                .transpose()?
                .flatten(),
            color: Some(match self.color {
                Some(color) => normalize_color(&color)?,
                None => DEFAULT_TAG_COLOR.to_string(),
            }),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdateTagRequest {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl UpdateTagRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: self.name.map(|v| normalize_name(&v)).transpose()?,
            // an empty description clears it
            description: self
                .description
                .map(|v| normalize_description(&v).map(Option::unwrap_or_default))
                .transpose()?,
            color: self.color.map(|v| normalize_color(&v)).transpose()?,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = sanitize_text(name);
    let len = name.chars().count();
    if !(2..=50).contains(&len) {
        return Err(DomainError::validation("name", "must be 2..50 chars"));
    }
    Ok(name)
}

fn normalize_description(description: &str) -> Result<Option<String>, DomainError> {
    let description = sanitize_text(description);
    if description.chars().count() > 200 {
        return Err(DomainError::validation(
            "description",
            "must be at most 200 chars",
        ));
    }
    Ok((!description.is_empty()).then_some(description))
}

/// Accepts `#RGB` and `#RRGGBB`, stored upper-cased.
fn normalize_color(color: &str) -> Result<String, DomainError> {
    let color = color.trim();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()));
    if !valid {
        return Err(DomainError::validation("color", "must be a hex color like #3B82F6"));
    }
    Ok(color.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{CreateTagRequest, DEFAULT_TAG_COLOR, TagAssignmentPolicy, UpdateTagRequest};
    use crate::domain::error::DomainError;

    #[test]
    fn create_tag_defaults_color_and_normalizes_name() {
        let validated = CreateTagRequest {
            name: "  Rust   Lang ".to_string(),
            description: Some("   ".to_string()),
            color: None,
        }
        .validate()
        .expect("must validate");

        assert_eq!(validated.name, "Rust Lang");
        assert_eq!(validated.description, None);
        assert_eq!(validated.color.as_deref(), Some(DEFAULT_TAG_COLOR));
    }

    #[test]
    fn create_tag_rejects_bad_color_and_short_name() {
        let err = CreateTagRequest {
            name: "Rust".to_string(),
            description: None,
            color: Some("blue".to_string()),
        }
        .validate()
        .expect_err("color must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "color", .. }));

        let err = CreateTagRequest {
            name: "R".to_string(),
            description: None,
            color: None,
        }
        .validate()
        .expect_err("name must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "name", .. }));
    }

    #[test]
    fn colors_are_upper_cased() {
        let validated = UpdateTagRequest {
            color: Some("#a1b2c3".to_string()),
            ..Default::default()
        }
        .validate()
        .expect("must validate");
        assert_eq!(validated.color.as_deref(), Some("#A1B2C3"));

        let short = UpdateTagRequest {
            color: Some("#fff".to_string()),
            ..Default::default()
        }
        .validate()
        .expect("must validate");
        assert_eq!(short.color.as_deref(), Some("#FFF"));
    }

    #[test]
    fn update_with_blank_description_clears_it() {
        let validated = UpdateTagRequest {
            description: Some("  ".to_string()),
            ..Default::default()
        }
        .validate()
        .expect("must validate");
        assert_eq!(validated.description.as_deref(), Some(""));
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("strict".parse::<TagAssignmentPolicy>(), Ok(TagAssignmentPolicy::Strict));
        assert_eq!("BEST_EFFORT".parse::<TagAssignmentPolicy>(), Ok(TagAssignmentPolicy::BestEffort));
        assert!("lenient".parse::<TagAssignmentPolicy>().is_err());
        assert_eq!(TagAssignmentPolicy::default(), TagAssignmentPolicy::BestEffort);
    }
}
