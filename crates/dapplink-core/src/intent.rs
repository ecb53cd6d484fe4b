//! Intent classification for news-injection requests.

/// Phrases that mark a message as a request for today's news post.
pub const NEWS_TRIGGERS: &[&str] = &[
    "today's post",
    "todays post",
    "today post",
    "latest news",
    "current news",
    "give me today",
    "generate today",
    "today's tweet",
    "todays tweet",
];

/// Returns true when the message asks for the latest news.
///
/// Matching is a case-insensitive substring search on the trimmed input.
pub fn is_news_request(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    NEWS_TRIGGERS
        .iter()
        .any(|trigger| normalized.contains(trigger))
}
