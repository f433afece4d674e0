use super::test_mocks::*;
use super::*;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use actix_web::http::StatusCode;
use actix_web::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, LOCATION};
use actix_web::{App, middleware::from_fn, test};
use serde_json::{Value, json};

use crate::state::SESSION_COOKIE;

macro_rules! test_app {
    ($state:expr) => {
        test_app!($state, 64 * 1024)
    };
    ($state:expr, $limit:expr) => {{
        let state = $state;
        let oauth = state.auth().is_some();
        test::init_service(
            App::new()
                .app_data(state)
                .wrap(from_fn(crate::middleware::cors))
                .configure(move |cfg| configure(cfg, $limit, oauth)),
        )
        .await
    }};
}

fn search_request(query: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/call/search")
        .set_json(json!({ "query": query }))
}

fn fetch_request(body: Value) -> test::TestRequest {
    test::TestRequest::post().uri("/call/fetch").set_json(body)
}

fn state_from_location(location: &str) -> String {
    location
        .split("state=")
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

// ============ Discovery ============

#[actix_web::test]
async fn index_describes_connector_on_get_and_post() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    for req in [test::TestRequest::get(), test::TestRequest::post()] {
        let body: Value = test::call_and_read_body_json(&app, req.uri("/").to_request()).await;
        assert_eq!(body["name"], "Salesforce MCP");
        assert_eq!(body["version"], "1.0");
        assert_eq!(body["auth"], json!({"type": "password"}));
        assert!(body["endpoints"].as_array().unwrap().contains(&json!("/call/search")));
    }
}

#[actix_web::test]
async fn health_is_plain_text() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"Salesforce MCP is healthy"));
}

#[actix_web::test]
async fn favicon_is_no_content() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/favicon.ico").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn tools_list_schemas_match_live_responses() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let tools: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/tools/list").to_request(),
    )
    .await;
    let tool = |name: &str| {
        tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == name)
            .cloned()
            .unwrap()
    };

    let search: Value = test::call_and_read_body_json(&app, search_request("Acme").to_request()).await;
    let fetch: Value = test::call_and_read_body_json(
        &app,
        fetch_request(json!({"id": "00Q5e00000AcmeAAA"})).to_request(),
    )
    .await;

    for (live, schema) in [
        (&search, tool("search")["outputSchema"].clone()),
        (&fetch, tool("fetch")["outputSchema"].clone()),
    ] {
        let mut live_keys: Vec<&String> = live.as_object().unwrap().keys().collect();
        let mut schema_keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        live_keys.sort();
        schema_keys.sort();
        assert_eq!(live_keys, schema_keys);
    }
    assert_eq!(tool("fetch")["inputSchema"]["required"], json!(["id"]));
}

// ============ /call/search ============

#[actix_web::test]
async fn search_acme_example() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let body: Value = test::call_and_read_body_json(&app, search_request("Acme").to_request()).await;

    assert_eq!(
        body,
        json!({
            "results": [{
                "id": "00Q5e00000AcmeAAA",
                "title": "Acme Corp Lead",
                "text": "Company: Acme Corp, Email: x@acme.com",
                "url": null
            }]
        })
    );
}

#[actix_web::test]
async fn search_returns_at_most_five_complete_items() {
    let provider = Arc::new(MockCrmProvider::with_leads(numbered_leads(20)));
    let app = test_app!(password_state(&provider));

    for query in ["Lead", "1", ""] {
        let body: Value = test::call_and_read_body_json(&app, search_request(query).to_request()).await;
        let results = body["results"].as_array().unwrap();
        assert!(results.len() <= 5);
        for item in results {
            assert!(!item["id"].as_str().unwrap().is_empty());
            assert!(!item["title"].as_str().unwrap().is_empty());
            assert!(!item["text"].as_str().unwrap().is_empty());
            assert!(item["url"].is_null());
        }
    }
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 3);
}

#[actix_web::test]
async fn search_without_query_field_lists_broadly() {
    let provider = Arc::new(MockCrmProvider::with_leads(numbered_leads(3)));
    let app = test_app!(password_state(&provider));

    let req = test::TestRequest::post()
        .uri("/call/search")
        .set_json(json!({}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn search_upstream_failure_is_500_with_message() {
    let provider = Arc::new(MockCrmProvider::failing());
    let app = test_app!(password_state(&provider));

    let resp = test::call_service(&app, search_request("Acme").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "[salesforce] backend unavailable"}));
}

// ============ /call/fetch ============

#[actix_web::test]
async fn fetch_reshapes_existing_record() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let body: Value = test::call_and_read_body_json(
        &app,
        fetch_request(json!({"id": "00Q5e00000AcmeAAA"})).to_request(),
    )
    .await;

    assert_eq!(body["id"], "00Q5e00000AcmeAAA");
    assert_eq!(body["title"], "Acme Corp Lead");
    assert!(body["url"].is_null());
    assert!(!body["text"].as_str().unwrap().is_empty());
    assert_eq!(
        body["metadata"],
        json!({
            "Company": "Acme Corp",
            "Email": "x@acme.com",
            "Status": "Working - Contacted",
            "Phone": ""
        })
    );
}

#[actix_web::test]
async fn fetch_without_id_is_400_and_skips_backend() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    for body in [json!({}), json!({"id": ""}), json!({"id": "   "})] {
        let resp = test::call_service(&app, fetch_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
    }
    assert_eq!(provider.backend_calls(), 0);
}

#[actix_web::test]
async fn fetch_nonexistent_is_500_with_upstream_message() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let resp = test::call_service(&app, fetch_request(json!({"id": "nonexistent"})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "[salesforce] Record 'nonexistent' not found"}));
}

// ============ Body handling ============

#[actix_web::test]
async fn malformed_json_is_400() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    let req = test::TestRequest::post()
        .uri("/call/search")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.backend_calls(), 0);
}

#[actix_web::test]
async fn oversized_body_is_413() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider), 128);

    let req = search_request(&"x".repeat(1024)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(provider.backend_calls(), 0);
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "not found"}));
}

// ============ CORS ============

#[actix_web::test]
async fn options_short_circuits_with_cors_headers() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/call/search")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(provider.backend_calls(), 0);
}

#[actix_web::test]
async fn every_response_carries_cors_headers() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let requests = [
        test::TestRequest::get().uri("/").to_request(),
        search_request("Acme").to_request(),
        fetch_request(json!({})).to_request(),
        test::TestRequest::get().uri("/missing").to_request(),
    ];
    for req in requests {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }
}

// ============ Password mode session sharing ============

#[actix_web::test]
async fn concurrent_calls_share_the_startup_session() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(password_state(&provider));

    let (a, b, c, d) = tokio::join!(
        test::call_service(&app, search_request("Acme").to_request()),
        test::call_service(&app, fetch_request(json!({"id": "00Q5e00000AcmeAAA"})).to_request()),
        test::call_service(&app, search_request("").to_request()),
        test::call_service(&app, fetch_request(json!({"id": "00Q5e00000AcmeAAA"})).to_request()),
    );
    for resp in [a, b, c, d] {
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let tokens = provider.seen_tokens();
    assert_eq!(tokens.len(), 4);
    assert!(tokens.iter().all(|t| t == STARTUP_TOKEN));
}

#[actix_web::test]
async fn leads_listing_returns_raw_records() {
    let provider = Arc::new(MockCrmProvider::with_leads(numbered_leads(9)));
    let app = test_app!(password_state(&provider));

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/leads").to_request()).await;
    let leads = body.as_array().unwrap();
    assert_eq!(leads.len(), 5);
    assert_eq!(leads[0]["id"], "00Q000000000000");
    assert_eq!(leads[0]["company"], "Company 0");
}

#[actix_web::test]
async fn password_mode_has_no_auth_routes() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(password_state(&provider));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/auth/login").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============ OAuth mode ============

#[actix_web::test]
async fn oauth_search_before_callback_is_401_without_backend_call() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(oauth_state(&provider));

    let resp = test::call_service(&app, search_request("Acme").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "not authenticated", "authorize": "/auth/login"}));

    // 已发起授权但未回调，仍然是未认证
    let login = test::call_service(&app, test::TestRequest::get().uri("/auth/login").to_request()).await;
    let cookie = login
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();
    let resp = test::call_service(
        &app,
        fetch_request(json!({"id": "00Q5e00000AcmeAAA"}))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(provider.backend_calls(), 0);
}

#[actix_web::test]
async fn oauth_full_flow_then_search() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(oauth_state(&provider));

    let index: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(index["auth"]["type"], "oauth2");

    let login =
        test::call_service(&app, test::TestRequest::get().uri("/auth/salesforce").to_request()).await;
    assert_eq!(login.status(), StatusCode::FOUND);
    let location = login
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.contains("/services/oauth2/authorize"));
    let cookie = login
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let state = state_from_location(&location);
    let callback = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/oauth2/callback?code=abc&state={state}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(callback.status(), StatusCode::OK);

    let status: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/status")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(status, json!({"authenticated": true}));

    let resp = test::call_service(&app, search_request("Acme").cookie(cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(provider.seen_tokens(), vec!["oauth-abc".to_string()]);
}

#[actix_web::test]
async fn oauth_callback_with_wrong_state_is_401() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(oauth_state(&provider));

    let login = test::call_service(&app, test::TestRequest::get().uri("/auth/login").to_request()).await;
    let state = state_from_location(login.headers().get(LOCATION).unwrap().to_str().unwrap());
    let cookie = login
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/callback?code=abc&state=forged")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);

    // A rejected state discards the pending authorization.
    let retry = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/auth/callback?code=abc&state={state}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(retry.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);

    let status: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/status")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(status, json!({"authenticated": false}));
}

#[actix_web::test]
async fn oauth_callback_without_cookie_is_401() {
    let provider = Arc::new(MockCrmProvider::default());
    let app = test_app!(oauth_state(&provider));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/callback?code=abc&state=whatever")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn oauth_forged_cookie_is_not_authenticated() {
    let provider = Arc::new(MockCrmProvider::with_leads(vec![acme_lead()]));
    let app = test_app!(oauth_state(&provider));

    let resp = test::call_service(
        &app,
        search_request("Acme")
            .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "not-a-session"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.backend_calls(), 0);
}
