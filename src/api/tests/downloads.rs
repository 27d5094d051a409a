use super::*;
use crate::types::Event;
use serde_json::json;

#[tokio::test]
async fn test_resolve_endpoint() {
    let (downloader, server, _temp_dir) = create_mocked_downloader().await;
    mount_item_page(&server, "ms-python", "python", "2024.3.1").await;
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/resolve",
            json!({ "url": item_url(&server, "ms-python.python") }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["publisher"], "ms-python");
    assert_eq!(body["extension_name"], "python");
    assert_eq!(body["version"], "2024.3.1");
    assert_eq!(body["file_name"], "python-2024.3.1.vsix");
}

#[tokio::test]
async fn test_resolve_rejects_non_marketplace_url() {
    let (downloader, _temp_dir) = create_test_downloader();
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/resolve",
            json!({ "url": "https://example.com/items?itemName=a.b" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "not_marketplace_url"
    );
}

#[tokio::test]
async fn test_resolve_unknown_extension_is_404() {
    let (downloader, server, _temp_dir) = create_mocked_downloader().await;
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/resolve",
            json!({ "url": item_url(&server, "nobody.nothing") }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "extension_not_found"
    );
}

#[tokio::test]
async fn test_start_download_endpoint() {
    let (downloader, server, temp_dir) = create_mocked_downloader().await;
    mount_item_page(&server, "acme", "tool", "1.2.3").await;
    mount_package(
        &server,
        "acme",
        "tool",
        "1.2.3",
        ResponseTemplate::new(200).set_body_string("package"),
    )
    .await;
    let mut events = downloader.subscribe();
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/downloads",
            json!({ "url": item_url(&server, "acme.tool") }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["details"]["file_name"], "tool-1.2.3.vsix");
    let id = body["id"].as_u64().unwrap();

    let complete = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Event::TransferComplete {
                id: done,
                file_path,
                ..
            }) = events.recv().await
                && done.get() == id
            {
                return file_path;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(
        complete,
        temp_dir.path().join("downloads").join("tool-1.2.3.vsix")
    );
    assert_eq!(std::fs::read_to_string(&complete).unwrap(), "package");
}

#[tokio::test]
async fn test_start_download_into_missing_directory() {
    let (downloader, server, temp_dir) = create_mocked_downloader().await;
    mount_item_page(&server, "acme", "tool", "1.2.3").await;
    let mut events = downloader.subscribe();
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/downloads",
            json!({
                "url": item_url(&server, "acme.tool"),
                "download_path": temp_dir.path().join("missing"),
            }),
        ))
        .await
        .unwrap();

    // The transfer starts; the directory check fails inside it
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let code = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Event::TransferFailed { code, .. }) = events.recv().await {
                return code;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(code, "directory_not_accessible");
}

#[tokio::test]
async fn test_list_and_cancel_downloads() {
    let (downloader, server, _temp_dir) = create_mocked_downloader().await;
    mount_item_page(&server, "acme", "slow", "1.0.0").await;
    mount_package(
        &server,
        "acme",
        "slow",
        "1.0.0",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
    )
    .await;
    let app = router_for(&downloader);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/downloads",
            json!({ "url": item_url(&server, "acme.slow") }),
        ))
        .await
        .unwrap();
    let id = json_body(response).await["id"].as_u64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/downloads"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id);
    assert_eq!(listed[0]["file_name"], "slow-1.0.0.vsix");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/downloads/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Cancellation removes the entry once the task winds down
    tokio::time::timeout(Duration::from_secs(5), async {
        while !downloader.active_transfers().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_cancel_unknown_download_is_404() {
    let (downloader, _temp_dir) = create_test_downloader();
    let app = router_for(&downloader);

    let response = app
        .oneshot(empty_request("DELETE", "/downloads/4242"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_start_download_after_shutdown_is_503() {
    let (downloader, server, _temp_dir) = create_mocked_downloader().await;
    mount_item_page(&server, "acme", "tool", "1.0.0").await;
    downloader.shutdown().await.unwrap();
    let app = router_for(&downloader);

    let response = app
        .oneshot(json_request(
            "POST",
            "/downloads",
            json!({ "url": item_url(&server, "acme.tool") }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
