use futures::StreamExt;
use httpmock::prelude::*;
use httpmock::Method;
use std::collections::HashMap;
use storageprovider_client::{
    RemoteStorageConfig, RemoteStorageProvider, StorageError, StorageProvider, TokenHeader,
};

fn provider(server: &MockServer) -> RemoteStorageProvider {
    RemoteStorageProvider::new(RemoteStorageConfig::new(
        server.base_url(),
        "test-collection",
    ))
    .unwrap()
}

async fn collect(stream: storageprovider_client::ByteStream) -> Vec<Vec<u8>> {
    stream
        .map(|chunk| chunk.unwrap().to_vec())
        .collect::<Vec<_>>()
        .await
}

#[tokio::test]
async fn test_delete_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/collections/test-collection/containers/container/object");
        then.status(200);
    });

    provider(&server)
        .delete_object("container", "object", None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_delete_object_failure_carries_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE)
            .path("/collections/test-collection/containers/container/nonexistent");
        then.status(404).body("Object not found");
    });

    let err = provider(&server)
        .delete_object("container", "nonexistent", None)
        .await
        .unwrap_err();

    match err {
        StorageError::OperationFailed {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "Object not found");
        }
        other => panic!("expected OperationFailed, got: {}", other),
    }
}

#[tokio::test]
async fn test_failure_display_matches_service_wording() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object");
        then.status(400).body("Bad Request");
    });

    let err = provider(&server)
        .get_object("container", "object", None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Bad Request, http status code: 400");
}

#[tokio::test]
async fn test_get_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object");
        then.status(200).body("object content");
    });

    let content = provider(&server)
        .get_object("container", "object", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(content, b"object content");
}

#[tokio::test]
async fn test_get_object_streaming() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object");
        then.status(200).body("streamed object content");
    });

    let stream = provider(&server)
        .get_object_streaming("container", "object", None)
        .await
        .unwrap();
    let chunks = collect(stream).await;

    mock.assert();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0], b"streamed object content");
}

#[tokio::test]
async fn test_get_object_and_metadata() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object");
        then.status(200)
            .header("Content-Type", "image/jpeg")
            .header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT")
            .body("object content");
    });

    let result = provider(&server)
        .get_object_and_metadata("container", "object", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(result.content, b"object content");
    assert_eq!(result.metadata.mime, "image/jpeg");
    assert_eq!(result.metadata.size, b"object content".len() as u64);
    assert!(result.metadata.time_last_modification.is_some());
}

#[tokio::test]
async fn test_get_object_metadata() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object/meta");
        then.status(200).json_body(serde_json::json!({
            "mime": "application/json",
            "size": 1234
        }));
    });

    let metadata = provider(&server)
        .get_object_metadata("container", "object", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(metadata.mime, "application/json");
    assert_eq!(metadata.size, 1234);
    assert!(metadata.time_last_modification.is_none());
}

#[tokio::test]
async fn test_copy_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/test-collection/containers/output_container/output_object")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "host_url": server.base_url(),
                "collection_key": "test-collection",
                "container_key": "source_container",
                "object_key": "source_object"
            }));
        then.status(200);
    });

    provider(&server)
        .copy_object(
            "source_container",
            "source_object",
            "output_container",
            "output_object",
            None,
        )
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_copy_object_and_create_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/test-collection/containers/output_container")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "host_url": server.base_url(),
                "collection_key": "test-collection",
                "container_key": "source_container",
                "object_key": "source_object"
            }));
        then.status(201)
            .json_body(serde_json::json!({"object_key": "new_object_key"}));
    });

    let key = provider(&server)
        .copy_object_and_create_key("source_container", "source_object", "output_container", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(key, "new_object_key");
}

#[tokio::test]
async fn test_update_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/test-collection/containers/container/object")
            .header("content-type", "application/octet-stream")
            .body("object data");
        then.status(200);
    });

    provider(&server)
        .update_object("container", "object", b"object data".to_vec(), None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_update_object_and_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/test-collection/containers/container")
            .header("content-type", "application/octet-stream")
            .body("object data");
        then.status(201)
            .json_body(serde_json::json!({"object_key": "new_object_key"}));
    });

    let key = provider(&server)
        .update_object_and_key("container", b"object data".to_vec(), None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(key, "new_object_key");
}

#[tokio::test]
async fn test_list_object_keys_for_container() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container")
            .header("accept", "application/json");
        then.status(200)
            .json_body(serde_json::json!(["object1", "object2"]));
    });

    let keys = provider(&server)
        .list_object_keys_for_container("container", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(keys, vec!["object1".to_string(), "object2".to_string()]);
}

#[tokio::test]
async fn test_get_container_data_with_translations() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container")
            .header("accept", "application/zip")
            .query_param("object1", "report.pdf");
        then.status(200).body("zip content");
    });

    let translations = HashMap::from([("object1".to_string(), "report.pdf".to_string())]);
    let data = provider(&server)
        .get_container_data("container", None, Some(&translations))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(data, b"zip content");
}

#[tokio::test]
async fn test_get_container_data_streaming() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container")
            .header("accept", "application/zip");
        then.status(200).body("zip content");
    });

    let stream = provider(&server)
        .get_container_data_streaming("container", None, None)
        .await
        .unwrap();
    let chunks = collect(stream).await;

    mock.assert();
    assert_eq!(chunks.concat(), b"zip content");
}

#[tokio::test]
async fn test_create_container() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/test-collection/containers/container");
        then.status(200);
    });

    provider(&server)
        .create_container("container", None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_create_container_conflict() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/test-collection/containers/existing");
        then.status(409).body("Conflict");
    });

    let err = provider(&server)
        .create_container("existing", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorageError::OperationFailed {
            status_code: 409,
            ..
        }
    ));
}

#[tokio::test]
async fn test_create_container_and_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/test-collection/containers");
        then.status(201)
            .json_body(serde_json::json!({"container_key": "jk455"}));
    });

    let key = provider(&server)
        .create_container_and_key(None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(key, "jk455");
}

#[tokio::test]
async fn test_delete_container() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/collections/test-collection/containers/container");
        then.status(200);
    });

    provider(&server)
        .delete_container("container", None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_get_object_from_archive() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object/file_name.pdf");
        then.status(200).body("file content");
    });

    let content = provider(&server)
        .get_object_from_archive("container", "object", "file_name.pdf", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(content, b"file content");
}

#[tokio::test]
async fn test_get_object_from_archive_streaming() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object/file_name.pdf");
        then.status(200).body("file content");
    });

    let stream = provider(&server)
        .get_object_from_archive_streaming("container", "object", "file_name.pdf", None)
        .await
        .unwrap();
    let chunks = collect(stream).await;

    mock.assert();
    assert_eq!(chunks.concat(), b"file content");
}

#[tokio::test]
async fn test_replace_file_in_zip_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/test-collection/containers/container/object/old_file.pdf")
            .query_param("new_file_name", "new_file.pdf")
            .body("new content");
        then.status(200)
            .json_body(serde_json::json!({"status": "success"}));
    });

    let descriptor = provider(&server)
        .replace_file_in_zip_object(
            "container",
            "object",
            "old_file.pdf",
            b"new content".to_vec(),
            "new_file.pdf",
            None,
        )
        .await
        .unwrap();

    mock.assert();
    assert_eq!(descriptor, serde_json::json!({"status": "success"}));
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object")
            .header("authorization", "Bearer secret-token");
        then.status(200).body("object content");
    });

    provider(&server)
        .get_object("container", "object", Some("secret-token"))
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_custom_token_header_attached() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object")
            .header("OpenAmSSOID", "session-id-123");
        then.status(200).body("object content");
    });

    let config = RemoteStorageConfig::new(server.base_url(), "test-collection")
        .with_token_header(TokenHeader::Custom("OpenAmSSOID".to_string()));
    RemoteStorageProvider::new(config)
        .unwrap()
        .get_object("container", "object", Some("session-id-123"))
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_no_token_means_no_auth_header() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/collections/test-collection/containers/container/object")
            .matches(|req| {
                req.headers.as_ref().map_or(true, |headers| {
                    !headers
                        .iter()
                        .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                })
            });
        then.status(200).body("object content");
    });

    provider(&server)
        .get_object("container", "object", None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_container_prefix_is_applied() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/collections/test-collection/containers/prefix:container/object");
        then.status(200);
    });

    let config = RemoteStorageConfig::new(server.base_url(), "test-collection")
        .with_container_prefix("prefix");
    RemoteStorageProvider::new(config)
        .unwrap()
        .delete_object("container", "object", None)
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_every_operation_fails_uniformly_on_unexpected_status() {
    let server = MockServer::start();
    let routes = [
        (Method::POST, "/collections/test-collection/containers"),
        (Method::GET, "/collections/test-collection/containers/container"),
        (Method::PUT, "/collections/test-collection/containers/container"),
        (Method::POST, "/collections/test-collection/containers/container"),
        (Method::DELETE, "/collections/test-collection/containers/container"),
        (Method::GET, "/collections/test-collection/containers/container/object"),
        (Method::PUT, "/collections/test-collection/containers/container/object"),
        (Method::DELETE, "/collections/test-collection/containers/container/object"),
        (Method::GET, "/collections/test-collection/containers/container/object/meta"),
        (Method::GET, "/collections/test-collection/containers/container/object/entry.txt"),
        (Method::PUT, "/collections/test-collection/containers/container/object/entry.txt"),
        (Method::POST, "/collections/test-collection/containers/out"),
        (Method::PUT, "/collections/test-collection/containers/out/dest"),
    ];
    for (method, path) in routes {
        server.mock(|when, then| {
            when.method(method).path(path);
            then.status(503).body("service unavailable");
        });
    }

    let provider = provider(&server);
    let check = |err: StorageError| match err {
        StorageError::OperationFailed {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 503);
            assert_eq!(message, "service unavailable");
        }
        other => panic!("expected OperationFailed, got: {}", other),
    };

    check(provider.delete_object("container", "object", None).await.unwrap_err());
    check(provider.get_object("container", "object", None).await.unwrap_err());
    check(provider.get_object_streaming("container", "object", None).await.err().unwrap());
    check(
        provider
            .get_object_and_metadata("container", "object", None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .get_object_metadata("container", "object", None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .copy_object_and_create_key("container", "object", "out", None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .copy_object("container", "object", "out", "dest", None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .update_object_and_key("container", b"data".to_vec(), None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .update_object("container", "object", b"data".to_vec(), None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .list_object_keys_for_container("container", None)
            .await
            .unwrap_err(),
    );
    check(provider.get_container_data("container", None, None).await.unwrap_err());
    check(
        provider
            .get_container_data_streaming("container", None, None)
            .await
            .err()
            .unwrap(),
    );
    check(provider.create_container("container", None).await.unwrap_err());
    check(provider.create_container_and_key(None).await.unwrap_err());
    check(provider.delete_container("container", None).await.unwrap_err());
    check(
        provider
            .get_object_from_archive("container", "object", "entry.txt", None)
            .await
            .unwrap_err(),
    );
    check(
        provider
            .get_object_from_archive_streaming("container", "object", "entry.txt", None)
            .await
            .err()
            .unwrap(),
    );
    check(
        provider
            .replace_file_in_zip_object(
                "container",
                "object",
                "entry.txt",
                b"data".to_vec(),
                "new.txt",
                None,
            )
            .await
            .unwrap_err(),
    );
}
