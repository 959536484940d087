#![forbid(unsafe_code)]

//! The message-list card template.
//!
//! Renders one [`Message`] as
//!
//! ```html
//! <article class="item" data-id="item-42">
//!   <section class="author-details">
//!     <figure class="author-image"><img src="..." alt="Profile image of Ada"></figure>
//!     <section class="author-info"><strong>Ada</strong><time datetime="...">3 days ago</time></section>
//!   </section>
//!   <section class="author-message">...</section>
//! </article>
//! ```

use infiniscroll_widgets::{Element, Fragment, ItemTemplate};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Host of the public message-list endpoint and its author photos.
pub const DEFAULT_BASE_URL: &str = "https://message-list.appspot.com";

/// Path of the paged message endpoint under the base URL.
pub const MESSAGES_PATH: &str = "/messages";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    /// Path relative to the photo host.
    pub photo_url: String,
}

/// One record of the message-list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub author: Author,
    /// RFC 3339 UTC timestamp of the last edit.
    pub updated: String,
    pub content: String,
}

/// [`ItemTemplate`] for [`Message`] records.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    photo_host: String,
    /// Reference instant used to phrase relative times.
    now: Option<OffsetDateTime>,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MessageTemplate {
    /// Template resolving author photos against `photo_host`.
    #[must_use]
    pub fn new(photo_host: impl Into<String>) -> Self {
        Self {
            photo_host: photo_host.into().trim_end_matches('/').to_string(),
            now: None,
        }
    }

    /// Show timestamps relative to `now` ("3 days ago") instead of verbatim.
    #[must_use]
    pub fn with_now(mut self, now: OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Build the card element for `message`.
    #[must_use]
    pub fn card(&self, message: &Message) -> Element {
        let photo = format!("{}{}", self.photo_host, message.author.photo_url);
        let age = self
            .now
            .zip(parse_timestamp(&message.updated))
            .map(|(now, then)| relative_age(now - then))
            .unwrap_or_else(|| message.updated.clone());

        Element::new("article")
            .with_class("item")
            .with_attr("data-id", format!("item-{}", message.id))
            .with_child(
                Element::new("section")
                    .with_class("author-details")
                    .with_child(
                        Element::new("figure").with_class("author-image").with_child(
                            Element::new("img")
                                .with_attr("src", photo)
                                .with_attr("alt", format!("Profile image of {}", message.author.name)),
                        ),
                    )
                    .with_child(
                        Element::new("section")
                            .with_class("author-info")
                            .with_child(Element::new("strong").with_text(message.author.name.as_str()))
                            .with_child(
                                Element::new("time")
                                    .with_attr("datetime", message.updated.as_str())
                                    .with_text(age),
                            ),
                    ),
            )
            .with_child(
                Element::new("section")
                    .with_class("author-message")
                    .with_text(message.content.as_str()),
            )
    }
}

impl ItemTemplate<Message> for MessageTemplate {
    fn render(&self, fragment: &mut Fragment, record: &Message) {
        fragment.push(self.card(record));
    }
}

/// Parse an RFC 3339 timestamp such as `2015-02-01T07:46:23Z`.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}

/// Phrase an elapsed time the way feed UIs do. Negative spans (clock skew)
/// read as "a few seconds ago".
#[must_use]
pub fn relative_age(elapsed: Duration) -> String {
    const MIN: u64 = 60;
    const HOUR: u64 = 60 * MIN;
    const DAY: u64 = 24 * HOUR;

    let secs = u64::try_from(elapsed.whole_seconds()).unwrap_or(0);
    let div_round = |n: u64, d: u64| (n + d / 2) / d;
    match secs {
        s if s < 45 => "a few seconds ago".to_string(),
        s if s < 90 => "a minute ago".to_string(),
        s if s < 45 * MIN => format!("{} minutes ago", div_round(s, MIN)),
        s if s < 90 * MIN => "an hour ago".to_string(),
        s if s < 22 * HOUR => format!("{} hours ago", div_round(s, HOUR)),
        s if s < 36 * HOUR => "a day ago".to_string(),
        s if s < 26 * DAY => format!("{} days ago", div_round(s, DAY)),
        s if s < 46 * DAY => "a month ago".to_string(),
        s if s < 320 * DAY => format!("{} months ago", div_round(s * 10, DAY * 304)),
        s if s < 548 * DAY => "a year ago".to_string(),
        s => format!("{} years ago", div_round(s, DAY * 365)),
    }
}
