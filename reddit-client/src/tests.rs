#[cfg(test)]
mod tests {
    use crate::{
        collect_comment_bodies, filter_by_term, filter_for_request, ContentQuery, RedditApiClient,
        RedditListing, RedditPostData,
    };
    use threadpulse_core::{AppConfig, CoreError, Post, SearchRequest, SortBy, TimeFilter};

    fn create_test_client() -> RedditApiClient {
        RedditApiClient::new(&AppConfig::default()).unwrap()
    }

    fn post_data(id: &str, title: &str, subreddit: &str, selftext: &str) -> RedditPostData {
        RedditPostData {
            id: id.to_string(),
            title: title.to_string(),
            author: "test_user".to_string(),
            subreddit: subreddit.to_string(),
            ups: 42,
            num_comments: 5,
            permalink: format!("/r/{}/comments/{}/", subreddit, id),
            created_utc: 1640995200.7,
            selftext: selftext.to_string(),
        }
    }

    #[test]
    fn test_trending_url() {
        let client = create_test_client();
        let url = client.listing_url(&ContentQuery::Trending).unwrap();
        assert_eq!(url.as_str(), "https://www.reddit.com/r/popular.json?limit=10");
    }

    #[test]
    fn test_search_url_encodes_topic() {
        let client = create_test_client();
        let request = SearchRequest::new("rust & go", SortBy::Top, TimeFilter::All).unwrap();
        let url = client.listing_url(&ContentQuery::Search(request)).unwrap();

        assert_eq!(url.path(), "/search.json");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "rust & go".to_string()),
                ("sort".to_string(), "top".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_url_includes_time_filter() {
        let client = create_test_client();
        let request = SearchRequest::new("rust", SortBy::Hot, TimeFilter::Week).unwrap();
        let url = client.listing_url(&ContentQuery::Search(request)).unwrap();
        assert!(url.as_str().ends_with("&t=week"));
    }

    #[test]
    fn test_channel_search_routes_to_subreddit_listing() {
        let client = create_test_client();
        let request = SearchRequest::new("r/rust", SortBy::New, TimeFilter::Day).unwrap();
        let url = client.listing_url(&ContentQuery::Search(request)).unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/rust/new.json?limit=10&t=day"
        );
    }

    #[test]
    fn test_comments_url() {
        let client = create_test_client();

        let url = client
            .comments_url("https://reddit.com/r/rust/comments/abc/title/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://reddit.com/r/rust/comments/abc/title.json?limit=100"
        );

        let url = client.comments_url("/r/rust/comments/abc/title/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/rust/comments/abc/title.json?limit=100"
        );
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post: Post = post_data("test123", "Test Post", "test", "body").into();

        assert_eq!(post.external_id, "test123");
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.upvotes, 42);
        assert_eq!(post.comment_count, 5);
        assert_eq!(post.created_at, 1640995200);
        assert_eq!(post.permalink, "https://reddit.com/r/test/comments/test123/");
        assert!(post.fetched_at.is_none());
    }

    #[test]
    fn test_absolute_permalink_kept_verbatim() {
        let mut data = post_data("abs", "Absolute", "test", "");
        data.permalink = "https://old.reddit.com/r/test/comments/abs/".to_string();
        data.ups = -3;

        let post = data.into_post("https://reddit.com/");
        assert_eq!(post.permalink, "https://old.reddit.com/r/test/comments/abs/");
        assert_eq!(post.upvotes, -3);
    }

    #[test]
    fn test_filter_by_term_checks_title_subreddit_and_body() {
        let posts = vec![
            post_data("1", "Learning RUST this week", "programming", ""),
            post_data("2", "Weekly thread", "rustaceans", ""),
            post_data("3", "Question", "askprogramming", "Anyone using Rust at work?"),
            post_data("4", "Go generics", "golang", "nothing relevant"),
        ];

        let kept: Vec<String> = filter_by_term(posts, "Rust")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(kept, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_subreddit_listing_skips_term_filter() {
        let posts = vec![
            post_data("1", "Weekly thread", "rust", ""),
            post_data("2", "Borrow checker help", "rust", "lifetimes again"),
        ];

        let request = SearchRequest::new("r/rust", SortBy::Hot, TimeFilter::All).unwrap();
        let kept: Vec<String> = filter_for_request(&request, posts.clone())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(kept, vec!["1", "2"]);

        let request = SearchRequest::new("R/Rust", SortBy::Hot, TimeFilter::All).unwrap();
        assert_eq!(filter_for_request(&request, posts).len(), 2);
    }

    #[test]
    fn test_full_text_search_applies_term_filter() {
        let posts = vec![
            post_data("1", "Async runtimes compared", "programming", ""),
            post_data("2", "Tokio internals", "programming", ""),
        ];

        let request = SearchRequest::new("tokio", SortBy::Hot, TimeFilter::All).unwrap();
        let kept: Vec<String> = filter_for_request(&request, posts)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(kept, vec!["2"]);
    }

    #[test]
    fn test_uppercase_channel_prefix_routes_to_subreddit() {
        let client = create_test_client();
        let request = SearchRequest::new("R/rust", SortBy::Top, TimeFilter::All).unwrap();
        let url = client.listing_url(&ContentQuery::Search(request)).unwrap();
        assert_eq!(url.as_str(), "https://www.reddit.com/r/rust/top.json?limit=10");
    }

    #[test]
    fn test_listing_payload_parsing() {
        let payload = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t3", "data": {
                        "id": "abc", "title": "Hello", "author": "me",
                        "subreddit": "test", "ups": 12, "num_comments": 3,
                        "permalink": "/r/test/comments/abc/hello/",
                        "created_utc": 1700000000.0, "over_18": false
                    }}
                ]
            }
        }"#;

        let listing: RedditListing<RedditPostData> = serde_json::from_str(payload).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        let data = &listing.data.children[0].data;
        assert_eq!(data.id, "abc");
        assert_eq!(data.selftext, "");
    }

    #[test]
    fn test_comment_bodies_walk_replies_and_filter_short() {
        let payload = r#"[
            {"kind": "Listing", "data": {"children": [
                {"kind": "t3", "data": {"title": "The post", "selftext": "post body that is long"}}
            ]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "body": "First top level comment here",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {"body": "A nested reply that is long", "replies": ""}},
                        {"kind": "t1", "data": {"body": "too short", "replies": ""}}
                    ]}}
                }},
                {"kind": "t1", "data": {"body": "exactly fifteen", "replies": ""}},
                {"kind": "t1", "data": {"body": "exactly sixteen!", "replies": ""}},
                {"kind": "more", "data": {"children": ["x1", "x2"]}}
            ]}}
        ]"#;

        let listings: Vec<RedditListing<serde_json::Value>> =
            serde_json::from_str(payload).unwrap();
        let bodies = collect_comment_bodies(&listings, 16, 100);
        assert_eq!(
            bodies,
            vec![
                "First top level comment here",
                "A nested reply that is long",
                "exactly sixteen!",
            ]
        );

        let capped = collect_comment_bodies(&listings, 16, 2);
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_invalid_permalink_is_validation_error() {
        let client = create_test_client();
        let result = client.comments_url("https://exa mple.com/r/test");
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_get_comments_rejects_bad_permalink_before_request() {
        let client = create_test_client();
        let result = tokio_test::block_on(client.get_comments("https://exa mple.com/r/test"));
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }
}
