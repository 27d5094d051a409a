use super::*;
use serde_json::json;

#[tokio::test]
async fn test_get_settings_returns_defaults() {
    let (downloader, _temp_dir) = create_test_downloader();
    let app = router_for(&downloader);

    let response = app.oneshot(empty_request("GET", "/settings")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["theme"], "light");
    assert_eq!(body["auto_open_after_download"], false);
    assert_eq!(body["confirm_before_download"], false);
}

#[tokio::test]
async fn test_put_settings_persists() {
    let (downloader, temp_dir) = create_test_downloader();
    let app = router_for(&downloader);
    let target = temp_dir.path().join("downloads");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/settings",
            json!({
                "download_path": target,
                "theme": "dark",
                "auto_open_after_download": true,
                "confirm_before_download": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["theme"], "dark");

    let saved = downloader.settings().load().await;
    assert_eq!(saved.download_path, target);
    assert!(saved.auto_open_after_download);

    let response = app.oneshot(empty_request("GET", "/settings")).await.unwrap();
    assert_eq!(json_body(response).await["theme"], "dark");
}

#[tokio::test]
async fn test_put_settings_rejects_missing_directory() {
    let (downloader, temp_dir) = create_test_downloader();
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/settings",
            json!({ "download_path": temp_dir.path().join("does-not-exist") }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "settings_error");
    assert_eq!(body["error"]["message"], "Directory does not exist.");

    // Nothing was written
    assert!(!downloader.settings().path().exists());
}

#[tokio::test]
async fn test_reset_settings() {
    let (downloader, temp_dir) = create_test_downloader();
    let dir = temp_dir.path().join("downloads");
    downloader
        .settings()
        .update(move |s| {
            s.download_path = dir;
            s.confirm_before_download = true;
        })
        .await
        .unwrap();
    let app = router_for(&downloader);

    let response = app
        .oneshot(empty_request("POST", "/settings/reset"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["confirm_before_download"], false);
    assert!(!downloader.settings().load().await.confirm_before_download);
}
