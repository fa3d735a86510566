//! Integration tests for in-flight deduplication and caching scopes
//!
//! Exercises both factory variants end to end against an in-process
//! upstream mock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::*;
use futures_util::future::join_all;
use prism_loaders::{
    params, AccessToken, ApiResponse, LoaderError, LoaderFactory, RequestScope, UpstreamError,
};
use serde_json::json;

#[tokio::test]
async fn test_concurrent_unauthenticated_loads_share_one_call() {
    let api = Arc::new(RecordingApi::new().with_delay(Duration::from_millis(50)));
    let factory =
        LoaderFactory::without_authentication(backend("gravity", &api), shared_layer(), globals("req-1"));
    let loader = factory.path("artist/banksy").build();

    let results = join_all((0..5).map(|_| loader.load())).await;

    assert_eq!(api.call_count(), 1);
    for result in results {
        assert_eq!(result.unwrap(), json!({"id": "1"}));
    }
}

#[tokio::test]
async fn test_concurrent_authenticated_loads_share_one_call() {
    let api = Arc::new(RecordingApi::new().with_delay(Duration::from_millis(50)));
    let scope = RequestScope::new();
    let factory = LoaderFactory::with_authentication(
        backend("gravity", &api),
        scope.clone(),
        Some(AccessToken::new("user-token")),
        globals("req-1"),
    );
    let me = factory.path("me").build();
    let me_again = factory.path("me").build();

    let (a, b) = tokio::join!(me.load(), me_again.load());

    assert_eq!(api.call_count(), 1);
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(api.calls()[0].token.as_deref(), Some("user-token"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_unauthenticated_loads_share_one_call() {
    let api = Arc::new(RecordingApi::new().with_delay(Duration::from_millis(50)));
    let factory =
        LoaderFactory::without_authentication(backend("gravity", &api), shared_layer(), globals("req-1"));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let factory = factory.clone();
            tokio::spawn(async move { factory.path("artist/banksy").build().load().await })
        })
        .collect();
    let results = join_all(tasks).await;

    assert_eq!(api.call_count(), 1);
    for result in results {
        assert_eq!(result.unwrap().unwrap(), json!({"id": "1"}));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_authenticated_loads_share_one_call() {
    let api = Arc::new(RecordingApi::new().with_delay(Duration::from_millis(50)));
    let scope = RequestScope::new();
    let factory = LoaderFactory::with_authentication(
        backend("gravity", &api),
        scope.clone(),
        Some(AccessToken::new("user-token")),
        globals("req-1"),
    );

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let factory = factory.clone();
            tokio::spawn(async move { factory.path("me").build().load().await })
        })
        .collect();
    let results = join_all(tasks).await;

    assert_eq!(api.call_count(), 1);
    for result in results {
        assert!(result.unwrap().is_ok());
    }
    assert_eq!(scope.len(), 1);
}

#[tokio::test]
async fn test_dynamic_loader_dedups_equal_arguments() {
    let api = Arc::new(RecordingApi::new().with_delay(Duration::from_millis(20)));
    let factory =
        LoaderFactory::without_authentication(backend("gravity", &api), shared_layer(), globals("req-1"));
    let things = factory.dynamic(|id: &String| format!("/things/{}", id)).build();

    let id = "42".to_string();
    let (a, b) = tokio::join!(things.load(&id), things.load(&id));

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(api.paths(), vec!["/things/42".to_string()]);
}

#[tokio::test]
async fn test_distinct_params_are_distinct_fetches() {
    let api = Arc::new(RecordingApi::new());
    let factory =
        LoaderFactory::without_authentication(backend("gravity", &api), shared_layer(), globals("req-1"));
    let artworks = factory.path("artworks").param("size", 10).build();

    let (a, b) = tokio::join!(
        artworks.load_with(params(json!({"page": 1}))),
        artworks.load_with(params(json!({"page": 2})))
    );

    assert!(a.is_ok() && b.is_ok());
    let mut paths = api.paths();
    paths.sort();
    assert_eq!(
        paths,
        vec!["artworks?page=1&size=10".to_string(), "artworks?page=2&size=10".to_string()]
    );
}

#[tokio::test]
async fn test_per_call_params_override_creation_params() {
    let api = Arc::new(RecordingApi::new());
    let factory =
        LoaderFactory::without_authentication(backend("positron", &api), shared_layer(), globals("req-1"));
    let articles = factory
        .path("articles")
        .params(params(json!({"published": true, "limit": 10})))
        .build();

    articles.load_with(params(json!({"limit": 3}))).await.unwrap();

    assert_eq!(api.paths(), vec!["articles?limit=3&published=true".to_string()]);
}

#[tokio::test]
async fn test_unauthenticated_responses_are_reused_across_requests() {
    let api = Arc::new(RecordingApi::new());
    let gravity = backend("gravity", &api);
    let layer = shared_layer();

    let first = LoaderFactory::without_authentication(gravity.clone(), layer.clone(), globals("req-1"))
        .path("artist/banksy")
        .build()
        .load()
        .await
        .unwrap();
    let second = LoaderFactory::without_authentication(gravity, layer, globals("req-2"))
        .path("artist/banksy")
        .build()
        .load()
        .await
        .unwrap();

    assert_eq!(api.call_count(), 1);
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_shared_entries_expire_after_backend_ttl() {
    let api = Arc::new(RecordingApi::new());
    let gravity = Arc::new(
        prism_loaders::Backend::new("gravity", api.clone()).with_cache_ttl(Duration::from_secs(60)),
    );
    let factory = LoaderFactory::without_authentication(gravity, shared_layer(), globals("req-1"));
    let artist = factory.path("artist/banksy").build();

    artist.load().await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    artist.load().await.unwrap();
    assert_eq!(api.call_count(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    artist.load().await.unwrap();
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_authenticated_responses_are_not_reused_across_requests() {
    let api = Arc::new(RecordingApi::new());
    let gravity = backend("gravity", &api);
    let token = AccessToken::new("user-token");

    for request in ["req-1", "req-2"] {
        let scope = RequestScope::new();
        let _guard = scope.guard();
        LoaderFactory::with_authentication(gravity.clone(), scope.clone(), Some(token.clone()), globals(request))
            .path("me")
            .build()
            .load()
            .await
            .unwrap();
    }

    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_authenticated_entries_are_separated_by_principal() {
    let api = Arc::new(RecordingApi::new());
    let gravity = backend("gravity", &api);
    let scope = RequestScope::new();

    for token in ["alice", "bob"] {
        LoaderFactory::with_authentication(
            gravity.clone(),
            scope.clone(),
            Some(AccessToken::new(token)),
            globals("req-1"),
        )
        .path("me")
        .build()
        .load()
        .await
        .unwrap();
    }

    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_authenticated_loads_never_touch_shared_cache() {
    let api = Arc::new(RecordingApi::new());
    let gravity = backend("gravity", &api);
    let layer = shared_layer();

    LoaderFactory::without_authentication(gravity.clone(), layer, globals("req-1"))
        .path("me")
        .build()
        .load()
        .await
        .unwrap();
    LoaderFactory::with_authentication(gravity, RequestScope::new(), Some(AccessToken::new("t")), globals("req-1"))
        .path("me")
        .build()
        .load()
        .await
        .unwrap();

    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_unauthenticated_failure_is_retried() {
    let api = Arc::new(RecordingApi::new().failing_times(1));
    let factory =
        LoaderFactory::without_authentication(backend("galaxy", &api), shared_layer(), globals("req-1"));
    let loader = factory.path("galaxy/artists/1").build();

    let first = loader.load().await;
    assert_matches!(
        first,
        Err(LoaderError::Upstream { source: UpstreamError::Status { status: 502, .. }, .. })
    );

    assert_eq!(loader.load().await.unwrap(), json!({"id": "1"}));
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_authenticated_failure_is_retried_within_scope() {
    let api = Arc::new(RecordingApi::new().failing_times(1));
    let scope = RequestScope::new();
    let factory = LoaderFactory::with_authentication(
        backend("impulse", &api),
        scope.clone(),
        Some(AccessToken::new("user-token")),
        globals("req-1"),
    );
    let loader = factory.path("conversations").build();

    assert!(loader.load().await.is_err());
    assert!(scope.is_empty());
    assert!(loader.load().await.is_ok());
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_concurrent_waiters_share_a_failure() {
    let api = Arc::new(
        RecordingApi::new()
            .with_delay(Duration::from_millis(20))
            .failing_times(1),
    );
    let factory =
        LoaderFactory::without_authentication(backend("delta", &api), shared_layer(), globals("req-1"));
    let loader = factory.path("collections").build();

    let (a, b) = tokio::join!(loader.load(), loader.load());

    assert!(a.is_err() && b.is_err());
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_closed_scope_rejects_loads() {
    let api = Arc::new(RecordingApi::new());
    let scope = RequestScope::new();
    let factory = LoaderFactory::with_authentication(
        backend("convection", &api),
        scope.clone(),
        Some(AccessToken::new("user-token")),
        globals("req-1"),
    );
    let loader = factory.path("submissions").build();

    drop(scope.guard());

    assert_matches!(loader.load().await, Err(LoaderError::ScopeClosed { .. }));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_headers_shape() {
    let response = ApiResponse::new(json!({"id": "1"})).with_header("x-test", "1");
    let api = Arc::new(RecordingApi::responding(response.clone()));
    let factory =
        LoaderFactory::without_authentication(backend("gravity", &api), shared_layer(), globals("req-1"));

    let body_only = factory.path("artist/banksy").build().load().await.unwrap();
    assert_eq!(body_only, json!({"id": "1"}));

    let with_headers = factory
        .path("artist/banksy")
        .with_headers()
        .build()
        .load()
        .await
        .unwrap();
    assert_eq!(with_headers.body, json!({"id": "1"}));
    assert_eq!(with_headers.headers.get("x-test").map(String::as_str), Some("1"));
}
