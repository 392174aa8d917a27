use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use serial_test::serial;
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<(Router, tempfile::TempDir)> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        anyhow::bail!("SKIP_DB_TESTS is set");
    }
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        return Err(e.into());
    }
    let csv_dir = tempfile::tempdir()?;
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl_secs: 3600,
        },
        csv_export_dir: csv_dir.path().to_path_buf(),
    };
    Ok((routes::build_router(state, cors()), csv_dir))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
#[serial]
async fn health_is_open_but_api_requires_a_token() -> anyhow::Result<()> {
    let (mut app, _csv_dir) = match build_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("skip: cannot build app: {}", e);
            return Ok(());
        }
    };

    let resp = app
        .call(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // No Authorization header at all
    let resp = app
        .call(Request::builder().uri("/api/books").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Garbage token
    let resp = app
        .call(
            Request::builder()
                .uri("/api/books")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
#[serial]
async fn register_login_and_manage_a_book() -> anyhow::Result<()> {
    let (mut app, _csv_dir) = match build_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("skip: cannot build app: {}", e);
            return Ok(());
        }
    };

    let login = format!("admin-{}", Uuid::new_v4());
    let password = "S3curePass!";

    // Register
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": login, "password": password}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Duplicate registration conflicts
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": login, "password": password}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Wrong password rejected
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": login, "password": "wrong-pass"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Login and extract token
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": login, "password": password}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let token = body["token"].as_str().expect("token in body").to_string();

    // Create a book with an inline author and genre
    let isbn = format!("isbn-{}", Uuid::new_v4());
    let company = format!("Acme-{}", Uuid::new_v4());
    let genre = format!("Drama-{}", Uuid::new_v4());
    let resp = app
        .call(json_request(
            "POST",
            "/api/books",
            Some(&token),
            json!({
                "isbn": isbn,
                "name": "Http Flow",
                "publishing_company": company,
                "authors": [{"id": null, "fio": "A. Test", "birth_date": null, "country": null, "nickname": null}],
                "genres": [genre],
            }),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["isbn"], json!(isbn));
    assert!(created["authors"][0]["id"].is_i64());
    assert_eq!(created["authors"][0]["fio"], json!("A. Test"));
    assert_eq!(created["genres"][0], json!(genre));
    let author_id = created["authors"][0]["id"].as_i64().unwrap();

    // The new publisher is resolvable on its own
    let resp = app
        .call(json_request(
            "GET",
            &format!("/api/publishing-companies/{}", company),
            Some(&token),
            json!(null),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // Read the book back
    let resp = app
        .call(json_request("GET", &format!("/api/books/{}", isbn), Some(&token), json!(null)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let reread = body_json(resp).await;
    assert_eq!(reread["name"], json!("Http Flow"));

    // Clean up: deleting the publisher cascades to the book
    let resp = app
        .call(json_request(
            "DELETE",
            &format!("/api/publishing-companies/{}", company),
            Some(&token),
            json!(null),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = app
        .call(json_request("GET", &format!("/api/books/{}", isbn), Some(&token), json!(null)))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = app
        .call(json_request(
            "DELETE",
            &format!("/api/authors/{}", author_id),
            Some(&token),
            json!(null),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}
