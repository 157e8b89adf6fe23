use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub mobile: String,
    pub business: String,
    pub experience_level: String,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account joined with its profile and verification flag, as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VendorProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub mobile: String,
    pub business: String,
    pub experience_level: String,
    pub is_online: bool,
    pub is_verified: bool,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessCategory {
    Photography,
    Catering,
    #[serde(rename = "DJ")]
    Dj,
    Decoration,
    #[serde(rename = "Event Manager")]
    EventManager,
    Transportation,
    Florist,
    Baker,
    Videography,
    #[serde(rename = "Makeup Artist")]
    MakeupArtist,
    #[serde(rename = "Hair Stylist")]
    HairStylist,
    #[serde(rename = "Fashion Designer")]
    FashionDesigner,
    #[serde(rename = "Gift Services")]
    GiftServices,
    Entertainment,
    Lighting,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 15] = [
        BusinessCategory::Photography,
        BusinessCategory::Catering,
        BusinessCategory::Dj,
        BusinessCategory::Decoration,
        BusinessCategory::EventManager,
        BusinessCategory::Transportation,
        BusinessCategory::Florist,
        BusinessCategory::Baker,
        BusinessCategory::Videography,
        BusinessCategory::MakeupArtist,
        BusinessCategory::HairStylist,
        BusinessCategory::FashionDesigner,
        BusinessCategory::GiftServices,
        BusinessCategory::Entertainment,
        BusinessCategory::Lighting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCategory::Photography => "Photography",
            BusinessCategory::Catering => "Catering",
            BusinessCategory::Dj => "DJ",
            BusinessCategory::Decoration => "Decoration",
            BusinessCategory::EventManager => "Event Manager",
            BusinessCategory::Transportation => "Transportation",
            BusinessCategory::Florist => "Florist",
            BusinessCategory::Baker => "Baker",
            BusinessCategory::Videography => "Videography",
            BusinessCategory::MakeupArtist => "Makeup Artist",
            BusinessCategory::HairStylist => "Hair Stylist",
            BusinessCategory::FashionDesigner => "Fashion Designer",
            BusinessCategory::GiftServices => "Gift Services",
            BusinessCategory::Entertainment => "Entertainment",
            BusinessCategory::Lighting => "Lighting",
        }
    }
}

impl FromStr for BusinessCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown business category: {}", s))
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
        }
    }

    /// Blank input falls back to `Beginner`.
    pub fn parse_or_default(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(ExperienceLevel::default()),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "expert" => Ok(ExperienceLevel::Expert),
            _ => Err(format!("Unknown experience level: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_category_parses_labels_case_insensitively() {
        assert_eq!(
            "event manager".parse::<BusinessCategory>(),
            Ok(BusinessCategory::EventManager)
        );
        assert_eq!("DJ".parse::<BusinessCategory>(), Ok(BusinessCategory::Dj));
        assert!("Plumbing".parse::<BusinessCategory>().is_err());
    }

    #[test]
    fn business_category_serializes_as_label() {
        let json = serde_json::to_string(&BusinessCategory::MakeupArtist).unwrap();
        assert_eq!(json, "\"Makeup Artist\"");
    }

    #[test]
    fn blank_experience_level_defaults_to_beginner() {
        assert_eq!(
            ExperienceLevel::parse_or_default(Some("  ")),
            Ok(ExperienceLevel::Beginner)
        );
        assert_eq!(
            ExperienceLevel::parse_or_default(None),
            Ok(ExperienceLevel::Beginner)
        );
        assert_eq!(
            ExperienceLevel::parse_or_default(Some("Expert")),
            Ok(ExperienceLevel::Expert)
        );
        assert!(ExperienceLevel::parse_or_default(Some("Guru")).is_err());
    }
}
