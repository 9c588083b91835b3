use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Industry a startup belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupField {
    Tech,
    Health,
    Finance,
    Education,
    Ecommerce,
    #[default]
    Other,
}

impl StartupField {
    pub const ALL: [StartupField; 6] = [
        StartupField::Tech,
        StartupField::Health,
        StartupField::Finance,
        StartupField::Education,
        StartupField::Ecommerce,
        StartupField::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StartupField::Tech => "Technology",
            StartupField::Health => "Healthcare",
            StartupField::Finance => "Finance",
            StartupField::Education => "Education",
            StartupField::Ecommerce => "E-commerce",
            StartupField::Other => "Other",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            StartupField::Tech => "tech",
            StartupField::Health => "health",
            StartupField::Finance => "finance",
            StartupField::Education => "education",
            StartupField::Ecommerce => "ecommerce",
            StartupField::Other => "other",
        }
    }
}

impl fmt::Display for StartupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StartupField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        StartupField::ALL
            .into_iter()
            .find(|field| field.key() == wanted || field.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                Error::validation(format!(
                    "Unknown startup field '{}', expected one of {}",
                    s,
                    StartupField::ALL.map(|field| field.key()).join(", ")
                ))
            })
    }
}

/// What the founder told us about their startup. Passed explicitly to every
/// resource view instead of being threaded through navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupProfile {
    pub field: StartupField,
    pub description: String,
}

impl StartupProfile {
    pub fn new(field: StartupField, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(Error::validation("Startup description must not be empty"));
        }
        Ok(Self { field, description })
    }

    /// The idea as sent to the backend search endpoints
    pub fn business_idea(&self) -> &str {
        self.description.trim()
    }

    pub fn mentor_query(&self, location: Option<String>) -> MentorQuery {
        MentorQuery {
            business_idea: self.business_idea().to_string(),
            location: location.filter(|l| !l.trim().is_empty()),
        }
    }
}

/// The resource menu shown after a profile is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    ConnectWithFounders,
    FindAngelInvestors,
    AiDecisionAssistant,
    MarketTrendAnalysis,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::ConnectWithFounders,
        Resource::FindAngelInvestors,
        Resource::AiDecisionAssistant,
        Resource::MarketTrendAnalysis,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Resource::ConnectWithFounders => "Connect with Founders",
            Resource::FindAngelInvestors => "Find Angel Investors",
            Resource::AiDecisionAssistant => "AI Decision Assistant",
            Resource::MarketTrendAnalysis => "Market Trend Analysis",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Resource::ConnectWithFounders => {
                "Network with other founders in similar fields to share experiences and insights."
            }
            Resource::FindAngelInvestors => {
                "Discover angel investors interested in your specific field."
            }
            Resource::AiDecisionAssistant => "Validate your decisions with our AI-powered chatbot.",
            Resource::MarketTrendAnalysis => {
                "Analyze current market trends to validate your startup idea."
            }
        }
    }

    /// CLI subcommand that opens this resource, if one exists yet
    pub fn command(&self) -> Option<&'static str> {
        match self {
            Resource::ConnectWithFounders => Some("mentors"),
            Resource::FindAngelInvestors => None,
            Resource::AiDecisionAssistant => Some("chat"),
            Resource::MarketTrendAnalysis => Some("market"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorQuery {
    pub business_idea: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}

impl Mentor {
    /// Best link to the mentor's profile
    pub fn profile_link(&self) -> Option<&str> {
        self.contact_info
            .linkedin
            .as_deref()
            .or(self.profile_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub feasibility_report: String,
    #[serde(default)]
    pub competitors: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_parsing() {
        assert_eq!("tech".parse::<StartupField>().unwrap(), StartupField::Tech);
        assert_eq!("Healthcare".parse::<StartupField>().unwrap(), StartupField::Health);
        assert_eq!(" E-commerce ".parse::<StartupField>().unwrap(), StartupField::Ecommerce);
        assert!("space".parse::<StartupField>().is_err());
        assert_eq!(StartupField::Finance.to_string(), "Finance");
    }

    #[test]
    fn test_profile_requires_description() {
        assert!(StartupProfile::new(StartupField::Tech, "   ").is_err());

        let profile =
            StartupProfile::new(StartupField::Health, "  telemedicine for villages ").unwrap();
        assert_eq!(profile.business_idea(), "telemedicine for villages");
    }

    #[test]
    fn test_mentor_query_drops_blank_location() {
        let profile = StartupProfile::new(StartupField::Health, "medicine").unwrap();
        assert_eq!(profile.mentor_query(Some(" ".to_string())).location, None);
        assert_eq!(
            profile.mentor_query(Some("India".to_string())).location.as_deref(),
            Some("India")
        );
    }

    #[test]
    fn test_resource_menu() {
        assert_eq!(Resource::ALL.len(), 4);
        assert_eq!(Resource::AiDecisionAssistant.command(), Some("chat"));
        assert_eq!(Resource::FindAngelInvestors.command(), None);
        assert!(Resource::ALL.iter().all(|r| !r.description().is_empty()));
    }

    #[test]
    fn test_mentor_deserialization() {
        let mentor: Mentor = serde_json::from_value(json!({
            "name": "Asha Rao",
            "title": "Founder at MedCo",
            "summary": "Built two healthtech startups",
            "profile_url": "https://linkedin.com/in/asha",
            "expertise": ["healthcare", "startup"],
            "experience_years": 12,
            "contact_info": {"linkedin": "https://linkedin.com/in/asha"},
            "sentiment_score": 0.9,
            "source": "linkedin",
            "last_updated": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(mentor.name, "Asha Rao");
        assert_eq!(mentor.experience_years, Some(12));
        assert_eq!(mentor.profile_link(), Some("https://linkedin.com/in/asha"));
    }

    #[test]
    fn test_minimal_mentor() {
        let mentor: Mentor = serde_json::from_value(json!({ "name": "Sam" })).unwrap();
        assert!(mentor.summary.is_empty());
        assert_eq!(mentor.profile_link(), None);
    }
}
