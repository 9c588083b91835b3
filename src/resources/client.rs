use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::config::BackendConfig;
use crate::error::{Error, Result};
use crate::resources::types::{MarketReport, Mentor, MentorQuery};

/// Client for the mentor-lookup and market-analysis endpoints of the backend.
///
/// Responses are passed through for display; the client only checks the
/// status and the overall JSON shape.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    client: Client,
    mentors_endpoint: Url,
    competitors_endpoint: Url,
}

impl ResourceClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::platform(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            mentors_endpoint: config.endpoint("findMentors")?,
            competitors_endpoint: config.endpoint("findCompetitors")?,
        })
    }

    fn with_query(endpoint: &Url, params: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    fn mentors_url(&self, query: &MentorQuery) -> Url {
        let mut params = vec![("business_idea", query.business_idea.as_str())];
        if let Some(location) = query.location.as_deref() {
            params.push(("location", location));
        }
        Self::with_query(&self.mentors_endpoint, &params)
    }

    fn competitors_url(&self, business_idea: &str) -> Url {
        Self::with_query(&self.competitors_endpoint, &[("business_idea", business_idea)])
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let start_time = Instant::now();
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Backend request to {} failed with status {}", url.path(), status);
            return Err(Error::backend(format!("HTTP error! status: {}", status.as_u16())));
        }

        let body = response.json::<Value>().await?;
        debug!(
            path = url.path(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Backend request completed"
        );
        Ok(body)
    }

    pub async fn find_mentors(&self, query: &MentorQuery) -> Result<Vec<Mentor>> {
        let url = self.mentors_url(query);
        let mentors = parse_mentors(self.get_json(url).await?)?;
        info!("Found {} mentors for '{}'", mentors.len(), query.business_idea);
        Ok(mentors)
    }

    pub async fn find_competitors(&self, business_idea: &str) -> Result<MarketReport> {
        let url = self.competitors_url(business_idea);
        let report = parse_market_report(self.get_json(url).await?)?;
        info!(
            "Received feasibility report with {} competitors",
            report.competitors.len()
        );
        Ok(report)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MentorPayload {
    Failure { error: String },
    Many(Vec<Mentor>),
    One(Mentor),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MarketPayload {
    Failure { error: String },
    Report(MarketReport),
}

/// A single mentor object is accepted as a one-element list.
fn parse_mentors(body: Value) -> Result<Vec<Mentor>> {
    match serde_json::from_value::<MentorPayload>(body) {
        Ok(MentorPayload::Many(mentors)) => Ok(mentors),
        Ok(MentorPayload::One(mentor)) => Ok(vec![mentor]),
        Ok(MentorPayload::Failure { error }) => Err(Error::backend(error)),
        Err(e) => Err(Error::backend(format!("Unexpected mentor payload: {}", e))),
    }
}

fn parse_market_report(body: Value) -> Result<MarketReport> {
    match serde_json::from_value::<MarketPayload>(body) {
        Ok(MarketPayload::Report(report)) => Ok(report),
        Ok(MarketPayload::Failure { error }) => Err(Error::backend(error)),
        Err(e) => Err(Error::backend(format!("Unexpected market payload: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ResourceClient {
        ResourceClient::new(&BackendConfig::default()).unwrap()
    }

    #[test]
    fn test_mentor_url_encodes_query() {
        let query = MentorQuery {
            business_idea: "ai tutor & grader".to_string(),
            location: Some("New Delhi".to_string()),
        };
        let url = client().mentors_url(&query);

        assert_eq!(url.path(), "/findMentors");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("business_idea".to_string(), "ai tutor & grader".to_string()),
                ("location".to_string(), "New Delhi".to_string()),
            ]
        );
    }

    #[test]
    fn test_mentor_url_without_location() {
        let query = MentorQuery {
            business_idea: "medicine".to_string(),
            location: None,
        };
        let url = client().mentors_url(&query);
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/findMentors?business_idea=medicine");
    }

    #[test]
    fn test_competitors_url() {
        let url = client().competitors_url("food delivery");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/findCompetitors?business_idea=food+delivery"
        );
    }

    #[test]
    fn test_urls_keep_base_path_prefix() {
        let config = BackendConfig {
            base_url: "https://example.com/api/".to_string(),
            ..BackendConfig::default()
        };
        let client = ResourceClient::new(&config).unwrap();

        assert_eq!(client.competitors_url("x").path(), "/api/findCompetitors");
        let query = MentorQuery {
            business_idea: "x".to_string(),
            location: None,
        };
        assert_eq!(client.mentors_url(&query).path(), "/api/findMentors");
    }

    #[test]
    fn test_parse_mentor_list() {
        let mentors = parse_mentors(json!([
            {"name": "A", "summary": "s", "source": "linkedin", "contact_info": {"linkedin": "x"}},
            {"name": "B"}
        ]))
        .unwrap();
        assert_eq!(mentors.len(), 2);
        assert_eq!(mentors[1].name, "B");
    }

    #[test]
    fn test_parse_single_mentor_object() {
        let mentors = parse_mentors(json!({"name": "Solo", "summary": "only one"})).unwrap();
        assert_eq!(mentors.len(), 1);
        assert_eq!(mentors[0].summary, "only one");
    }

    #[test]
    fn test_parse_backend_error_payload() {
        let err = parse_market_report(json!({
            "error": "API keys are not set. Please set the SERPAPI_API_KEY and GEMINI_API_KEY \
                      environment variables."
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Backend(ref msg) if msg.contains("SERPAPI_API_KEY")));
    }

    #[test]
    fn test_parse_market_report() {
        let report = parse_market_report(json!({
            "competitors": [{"name": "Rival"}],
            "feasibility_report": "Market is crowded.\nDifferentiate on price."
        }))
        .unwrap();
        assert_eq!(report.competitors.len(), 1);
        assert!(report.feasibility_report.contains('\n'));
    }

    #[test]
    fn test_parse_unexpected_payload() {
        assert!(parse_mentors(json!("nope")).is_err());
        assert!(parse_market_report(json!({"report": 1})).is_err());
    }
}
