pub mod api;
pub mod fetcher;

pub use api::{
    collect_comment_bodies, filter_by_term, filter_for_request, RedditApiClient, RedditListing,
    RedditPostData, REDDIT_PERMALINK_BASE,
};
pub use fetcher::{CommentFetcher, ContentQuery, RemoteContentFetcher};

#[cfg(test)]
mod tests;
