use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use data_loader::FeatureStore;
use server::{AppState, RankingOrchestrator, create_router};

const MOVIES: &str = "\
movieId,title,genres,rating_mean,rating_count,tmdb_vote_avg,tmdb_popularity,tmdb_genres,tmdb_poster_path,tmdb_overview,tmdb_release_date
1,Fight Club (1999),Drama|Thriller,4.2,1500,8.4,60.1,,/fight.jpg,Insomnia.,1999-10-15
2,Se7en (1995),Drama|Mystery,4.0,1200,8.1,45.0,,,Seven deadly sins.,1995-09-22
3,Toy Story (1995),Animation|Children's|Comedy,3.9,900,7.9,80.0,,/toy.jpg,,1995-11-22
";

const USERS: &str = "\
userId,rating_mean,rating_count
1,4.1,300
";

fn create_test_app() -> Router {
    let store = FeatureStore::load_from_readers(MOVIES.as_bytes(), USERS.as_bytes()).unwrap();
    create_router(AppState::new(RankingOrchestrator::new(Arc::new(store))))
}

fn create_empty_app() -> Router {
    create_router(AppState::empty())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(create_test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "movies": 3, "users": 1}));
}

#[tokio::test]
async fn test_health_on_empty_store() {
    let (status, body) = get(create_empty_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"], 0);
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn test_rank_for_user() {
    let (status, body) = post_json(create_test_app(), "/rank", r#"{"user_id": 1, "k": 2}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], 1);
    assert!(body.get("movie_id").is_none());

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["score"].as_f64().unwrap() >= results[1]["score"].as_f64().unwrap());
    assert!(results[0]["reasons"].is_array());
}

#[tokio::test]
async fn test_rank_similar_excludes_seed() {
    let (status, body) = post_json(create_test_app(), "/rank", r#"{"movie_id": 1, "k": 1}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie_id"], 1);

    let top = &body["results"][0];
    assert_eq!(top["movie_id"], 2);
    assert_eq!(top["title"], "Se7en (1995)");
    assert_eq!(top["poster_url"], "");
    let reasons = top["reasons"].as_array().unwrap();
    assert!(reasons.contains(&json!("similar_genres")));
    assert!(reasons.contains(&json!("popular_in_movielens")));
}

#[tokio::test]
async fn test_rank_default_k_returns_all_small_catalog() {
    let (status, body) = post_json(create_test_app(), "/rank", r#"{"user_id": 77}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_rank_errors() {
    let cases = [
        (r#"{}"#, StatusCode::BAD_REQUEST, "invalid_request"),
        (r#"{"user_id": 1, "movie_id": 1}"#, StatusCode::BAD_REQUEST, "invalid_request"),
        (r#"{"user_id": -3}"#, StatusCode::BAD_REQUEST, "invalid_request"),
        (r#"{"user_id": "#, StatusCode::BAD_REQUEST, "invalid_request"),
        (r#"{"movie_id": 999}"#, StatusCode::NOT_FOUND, "not_found"),
    ];

    for (payload, expected_status, expected_kind) in cases {
        let (status, body) = post_json(create_test_app(), "/rank", payload).await;
        assert_eq!(status, expected_status, "payload {payload}");
        assert_eq!(body["kind"], expected_kind, "payload {payload}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_rank_on_empty_store_is_unavailable() {
    let (status, body) = post_json(create_empty_app(), "/rank", r#"{"user_id": 1}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "no data loaded", "kind": "unavailable"}));
}

#[tokio::test]
async fn test_rank_wrong_method() {
    let (status, _) = get(create_test_app(), "/rank").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_search() {
    let (status, body) = get(create_test_app(), "/search?q=se7en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"movie_id": 2, "title": "Se7en (1995)"}]));
}

#[tokio::test]
async fn test_search_lenient_limit() {
    for uri in ["/search?q=t&limit=abc", "/search?q=t&limit=-2", "/search?q=t"] {
        let (status, body) = get(create_test_app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body.as_array().unwrap().len(), 2, "{uri}");
    }

    let (_, body) = get(create_test_app(), "/search?q=t&limit=1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_requires_query() {
    for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
        let (status, body) = get(create_test_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["kind"], "invalid_request");
    }
}

#[tokio::test]
async fn test_get_movie() {
    let (status, body) = get(create_test_app(), "/movie/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie_id"], 1);
    assert_eq!(body["title"], "Fight Club (1999)");
    assert_eq!(body["tmdb_poster_path"], "/fight.jpg");
    assert_eq!(body["rating_count"], 1500);
}

#[tokio::test]
async fn test_get_movie_errors() {
    let (status, body) = get(create_test_app(), "/movie/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");

    let (status, body) = get(create_test_app(), "/movie/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_cors_headers() {
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
