//! Testimonials API client and the paginated feed state built on it.

use proto::PortalError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::{network, read_json};

/// Default base URL of the testimonials API.
pub const DEFAULT_TESTIMONIALS_API: &str = "http://localhost:3001/api";
/// Page size used when none is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 4;

const SUBMITTED_MESSAGE: &str =
    "Your testimonial has been submitted for review. Thank you for your feedback!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonialAuthor {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user: TestimonialAuthor,
    pub content: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// One page of approved testimonials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialPage {
    pub testimonials: Vec<Testimonial>,
    pub total_pages: u32,
}

/// Testimonial draft submitted by a signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct NewTestimonial {
    pub content: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl NewTestimonial {
    fn validate(&self) -> Result<(), PortalError> {
        if self.content.trim().is_empty() {
            return Err(PortalError::Validation(
                "Please share a few words about your experience.".to_string(),
            ));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(PortalError::Validation(
                "Rating must be between 1 and 5.".to_string(),
            ));
        }
        Ok(())
    }
}

/// The API answers with either a bare list or a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Paged {
        testimonials: Vec<Testimonial>,
        #[serde(rename = "totalPages", default)]
        total_pages: Option<u32>,
    },
    Bare(Vec<Testimonial>),
}

impl ListBody {
    fn into_page(self) -> TestimonialPage {
        match self {
            ListBody::Paged {
                testimonials,
                total_pages,
            } => TestimonialPage {
                testimonials,
                total_pages: total_pages.unwrap_or(1).max(1),
            },
            ListBody::Bare(testimonials) => TestimonialPage {
                testimonials,
                total_pages: 1,
            },
        }
    }
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ─────────────────────────────────────────────────────────────────────

pub struct TestimonialsClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestimonialsClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_TESTIMONIALS_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: proto::trim_base_url(base_url),
        }
    }

    /// `GET /testimonials/approved?page=&limit=`.
    pub async fn fetch_approved(&self, page: u32, limit: u32) -> Result<TestimonialPage, PortalError> {
        let url = format!("{}/testimonials/approved", self.base_url);
        debug!(url = %url, page = %page, limit = %limit, "Fetching testimonials");
        let response = self
            .client
            .get(&url)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await
            .map_err(network)?;
        let body: ListBody = read_json(response, "Failed to fetch testimonials").await?;
        Ok(body.into_page())
    }

    /// `GET /testimonials/recent`.
    pub async fn fetch_recent(&self) -> Result<Vec<Testimonial>, PortalError> {
        let url = format!("{}/testimonials/recent", self.base_url);
        let response = self.client.get(&url).send().await.map_err(network)?;
        let body: ListBody = read_json(response, "Failed to fetch recent testimonials").await?;
        Ok(body.into_page().testimonials)
    }

    /// `POST /testimonials` as the signed-in user.
    pub async fn submit(&self, token: &str, draft: &NewTestimonial) -> Result<String, PortalError> {
        draft.validate()?;
        let url = format!("{}/testimonials", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(network)?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PortalError::Unauthorized);
        }
        let body: Option<MessageBody> = read_json(
            response,
            "There was an error submitting your testimonial. Please try again.",
        )
        .await?;
        Ok(body
            .and_then(|b| b.message)
            .unwrap_or_else(|| SUBMITTED_MESSAGE.to_string()))
    }
}

impl Default for TestimonialsClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── Feed ───────────────────────────────────────────────────────────────────────

/// Paginated list plus the separate "recent" strip.
pub struct TestimonialFeed {
    client: TestimonialsClient,
    pub testimonials: Vec<Testimonial>,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_limit: u32,
    pub error: Option<String>,
    pub recent: Vec<Testimonial>,
    pub recent_error: Option<String>,
}

impl TestimonialFeed {
    pub fn new(client: TestimonialsClient) -> Self {
        Self {
            client,
            testimonials: Vec::new(),
            current_page: 1,
            total_pages: 1,
            page_limit: DEFAULT_PAGE_LIMIT,
            error: None,
            recent: Vec::new(),
            recent_error: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Replaces the list with `page`. On failure the list is emptied.
    pub async fn load(&mut self, page: u32, limit: u32) {
        self.error = None;
        self.page_limit = limit;
        match self.client.fetch_approved(page, limit).await {
            Ok(result) => {
                self.testimonials = result.testimonials;
                self.total_pages = result.total_pages;
                self.current_page = page;
            }
            Err(e) => {
                warn!(error = %e, "Loading testimonials failed");
                self.error = Some("Failed to load testimonials. Please try again later.".to_string());
                self.testimonials.clear();
            }
        }
    }

    /// Appends the next page. Returns `false` when already on the last page.
    pub async fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        let next = self.current_page + 1;
        match self.client.fetch_approved(next, self.page_limit).await {
            Ok(result) => {
                self.testimonials.extend(result.testimonials);
                self.current_page = next;
                true
            }
            Err(e) => {
                warn!(error = %e, page = %next, "Loading more testimonials failed");
                self.error = Some("Failed to load more testimonials. Please try again.".to_string());
                false
            }
        }
    }

    pub async fn load_recent(&mut self) {
        self.recent_error = None;
        match self.client.fetch_recent().await {
            Ok(recent) => self.recent = recent,
            Err(e) => {
                warn!(error = %e, "Loading recent testimonials failed");
                self.recent_error = Some("Failed to load recent testimonials".to_string());
                self.recent.clear();
            }
        }
    }

    pub fn reset(&mut self) {
        self.testimonials.clear();
        self.current_page = 1;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{"_id":"t1","user":{"_id":"u1","name":"Grace"},"content":"Great","rating":5}"#
    }

    #[test]
    fn paged_body_reads_total_pages() {
        let body: ListBody = serde_json::from_str(&format!(
            r#"{{"testimonials":[{}],"totalPages":3}}"#,
            sample()
        ))
        .expect("parse");
        let page = body.into_page();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.testimonials[0].user.name, "Grace");
    }

    #[test]
    fn bare_array_is_a_single_page() {
        let body: ListBody = serde_json::from_str(&format!("[{}]", sample())).expect("parse");
        let page = body.into_page();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.testimonials.len(), 1);
    }

    #[test]
    fn draft_validation_checks_content_and_rating() {
        let mut draft = NewTestimonial {
            content: "Loved it".to_string(),
            rating: 0,
            position: None,
            company: None,
        };
        assert!(draft.validate().is_err());
        draft.rating = 5;
        assert!(draft.validate().is_ok());
        draft.content = "  ".to_string();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn new_feed_has_no_more_pages() {
        let feed = TestimonialFeed::new(TestimonialsClient::with_base_url("http://127.0.0.1:1"));
        assert!(!feed.has_more());
        assert_eq!(feed.page_limit, DEFAULT_PAGE_LIMIT);
    }
}
