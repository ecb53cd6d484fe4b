//! Integration tests for the news feed client and the crypto news tool

use dapplink_core::NewsFilter;
use dapplink_tools::{
    FALLBACK_SOURCE, FeedError, FetchCryptoNewsTool, FetchNewsArgs, NewsFeed, NewsFeedConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn feed_for(server: &MockServer) -> NewsFeed {
    NewsFeed::new(NewsFeedConfig::new(server.uri()).with_timeout(Duration::from_secs(2)))
}

fn unreachable_feed() -> NewsFeed {
    NewsFeed::new(NewsFeedConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(1)))
}

fn three_posts() -> serde_json::Value {
    json!({
        "results": [
            {
                "title": "BTC rallies",
                "domain": "coindesk.com",
                "url": "http://x",
                "published_at": "2025-05-01T10:00:00Z"
            },
            {
                "title": "ETH gas drops",
                "source": { "title": "The Block" },
                "url": "http://y"
            },
            { "title": "SOL outage" }
        ]
    })
}

#[tokio::test]
async fn feed_sends_filter_and_public_news_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/"))
        .and(query_param("auth_token", "free"))
        .and(query_param("public", "true"))
        .and(query_param("kind", "news"))
        .and(query_param("filter", "hot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_posts()))
        .expect(1)
        .mount(&server)
        .await;

    let posts = feed_for(&server).fetch_posts(NewsFilter::Hot).await.unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].title, "BTC rallies");
}

#[tokio::test]
async fn feed_reports_http_status_and_malformed_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("filter", "rising"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("filter", "bullish"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let feed = feed_for(&server);
    assert!(matches!(
        feed.fetch_posts(NewsFilter::Rising).await,
        Err(FeedError::Status(503))
    ));
    assert!(matches!(
        feed.fetch_posts(NewsFilter::Bullish).await,
        Err(FeedError::Malformed(_))
    ));
}

#[tokio::test]
async fn feed_without_results_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
        .mount(&server)
        .await;

    let posts = feed_for(&server).fetch_posts(NewsFilter::Rising).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn tool_maps_posts_up_to_limit_with_source_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_posts()))
        .mount(&server)
        .await;

    let tool = FetchCryptoNewsTool::new(feed_for(&server));

    let items = tool.run(&FetchNewsArgs::new(NewsFilter::Rising, 2)).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "BTC rallies");
    assert_eq!(items[0].source, "coindesk.com");
    assert_eq!(items[0].url, "http://x");
    assert_eq!(items[0].published_at, "2025-05-01T10:00:00Z");
    assert_eq!(items[1].source, "The Block");

    let items = tool.run(&FetchNewsArgs::new(NewsFilter::Rising, 20)).await;
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].source, "crypto news");
    assert_eq!(items[2].url, "");
}

#[tokio::test]
async fn tool_returns_single_fallback_item_on_empty_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let items = FetchCryptoNewsTool::new(feed_for(&server))
        .run(&FetchNewsArgs::default())
        .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source, FALLBACK_SOURCE);
    assert!(items[0].url.is_empty());
}

#[tokio::test]
async fn tool_returns_single_fallback_item_when_feed_unreachable() {
    let items = FetchCryptoNewsTool::new(unreachable_feed())
        .run(&FetchNewsArgs::new(NewsFilter::Hot, 5))
        .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source, FALLBACK_SOURCE);
}
