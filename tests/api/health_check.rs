use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check() {
    let app = spawn_app(&[]).await; // spawn the server in background (not async)

    let resp = app.get("/health_check").await;
    assert!(resp.status().is_success());
    assert_eq!(resp.content_length().unwrap(), 0); // empty body
}

// the guard wraps the whole app, so /health_check goes through it too; it
// stays reachable as long as no one configures a folder named "health_check"
#[tokio::test]
async fn health_check_is_not_affected_by_protection() {
    let app = spawn_app(&[("finance", "budget2026")]).await;

    let resp = app.get("/health_check").await;
    assert!(resp.status().is_success());
}
