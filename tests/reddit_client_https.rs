use snoogate::conf::Config;
use snoogate::reddit::{Client, CommentSort, Direction, Error, ListingOptions, Sort};
use snoogate::thing::Kind;

// These tests talk to the live Reddit API, so what comes back can't be
// pinned down exactly. Mostly they check that the types line up with what
// Reddit actually sends and that the rate limit is respected.

fn client() -> Client {
    let config = Config::from_env().expect("invalid SNOOGATE_* configuration");
    Client::new(config).expect("could not create client")
}

#[tokio::test]
#[ignore = "requires network access"]
async fn it_lists_a_subreddit() {
    let posts = client()
        .list_subreddit("rust", Sort::Hot, 2)
        .await
        .expect("could not list subreddit");
    assert!(!posts.is_empty());
    assert!(posts.iter().all(|post| post.name().starts_with("t3_")));
}

#[tokio::test]
#[ignore = "requires network access"]
async fn it_pages_through_a_subreddit() {
    let client = client();
    let first = client
        .subreddit("rust", &ListingOptions::build().limit(2).build())
        .await
        .expect("could not fetch first page");
    assert_eq!(first.kind(), Kind::Listing);
    assert_ne!(first.after(), "");

    let options = ListingOptions::build().limit(2).after(first.after()).build();
    let second = client
        .subreddit("rust", &options)
        .await
        .expect("could not fetch second page");
    assert!(!second.is_empty());
    assert!(client.gate().last_access().is_some());
}

#[tokio::test]
#[ignore = "requires network access"]
async fn it_gets_comments() {
    let client = client();
    let posts = client
        .list_subreddit("rust", Sort::Top, 1)
        .await
        .expect("could not list subreddit");
    let post = posts.first().expect("no posts returned");
    let comments = client
        .get_comments(post.id(), CommentSort::Top, 10)
        .await
        .expect("could not get comments");
    for comment in &comments {
        assert!(comment.reply_comments().is_ok());
    }
}

#[tokio::test]
#[ignore = "requires network access"]
async fn it_refuses_to_vote_without_logging_in() {
    let err = client().vote("t3_xyz", Direction::Up).await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));
}
