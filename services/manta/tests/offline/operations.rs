use crate::{client, response, MockHttpSend};
use bytes::Bytes;
use http::Method;
use manta::{EntryKind, PutObjectOptions, RequestOptions};
use manta_core::{ErrorKind, Result};
use pretty_assertions::assert_eq;
use serde_json::json;

const DIR_STREAM: &str = "application/x-json-stream; type=directory";

fn dir_record(name: &str) -> String {
    json!({"name": name, "type": "object", "etag": "e1", "size": 5, "mtime": "2022-08-15T16:50:12.000Z"})
        .to_string()
}

#[tokio::test]
async fn test_list_directory() -> Result<()> {
    let body = format!(
        "{}\n{}\n",
        json!({"name": "a", "type": "directory", "mtime": "2022-08-15T16:50:12.000Z"}),
        dir_record("b.txt")
    );
    let mock = MockHttpSend::always(
        200,
        &[("content-type", DIR_STREAM), ("result-set-size", "2")],
        &body,
    );

    let entries = client(&mock)
        .list_directory("/alice/stor/", Some(2), Some("a"), RequestOptions::new())
        .await?
        .expect("listing must be returned");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Directory);
    assert_eq!(entries[1].name, "b.txt");
    assert_eq!(entries[1].size, Some(5));
    assert_eq!(
        mock.last().uri,
        "https://us-east.manta.example.com/alice/stor?limit=2&marker=a"
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_list_directory_short_result_set() {
    let body = format!("{}\n{}\n", dir_record("a"), dir_record("b"));
    let mock = MockHttpSend::always(
        200,
        &[("content-type", DIR_STREAM), ("result-set-size", "3")],
        &body,
    );

    let err = client(&mock)
        .list_directory("/alice/stor", None, None, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptResult);
    assert_eq!(mock.exchanges(), 3);
}

#[tokio::test]
async fn test_list_directory_invalid_path() {
    let mock = MockHttpSend::always(200, &[], "");
    let err = client(&mock)
        .list_directory("/alice/jobs", None, None, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(mock.exchanges(), 0);
}

#[tokio::test]
async fn test_ls_walks_pages() -> Result<()> {
    let mock = MockHttpSend::new(|_, req| {
        let names: Vec<String> = if req.uri.contains("marker=") {
            // The second page repeats the marker entry first.
            vec!["0999".to_string(), "1000".to_string(), "1001".to_string()]
        } else {
            (0..1000).map(|i| format!("{i:04}")).collect()
        };
        let body = names
            .iter()
            .map(|v| dir_record(v))
            .collect::<Vec<_>>()
            .join("\n");
        let size = names.len().to_string();
        Ok(response(
            200,
            &[("content-type", DIR_STREAM), ("result-set-size", size.as_str())],
            body,
        ))
    });

    let entries = client(&mock).ls("/alice/stor/logs").await?;
    assert_eq!(entries.len(), 1002);
    assert_eq!(entries[999].name, "0999");
    assert_eq!(entries[1000].name, "1000");
    assert_eq!(mock.exchanges(), 2);
    assert!(mock.requests()[1].uri.ends_with("?limit=1000&marker=0999"));
    Ok(())
}

#[tokio::test]
async fn test_put_directory() -> Result<()> {
    let mock = MockHttpSend::always(204, &[], "");

    client(&mock)
        .put_directory(
            "/alice/stor/site",
            RequestOptions::new()
                .with_allow_origin("https://example.com")
                .with_allow_headers("X-Requested-With, Content-Type"),
        )
        .await?;

    let req = mock.last();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.header("content-type"), Some("application/json; type=directory"));
    assert_eq!(
        req.header("access-control-allow-origin"),
        Some("https://example.com")
    );
    assert_eq!(
        req.header("access-control-allow-headers"),
        Some("content-type, x-requested-with")
    );
    assert_eq!(req.header("content-md5"), None);
    Ok(())
}

#[tokio::test]
async fn test_delete_directory() -> Result<()> {
    let mock = MockHttpSend::always(204, &[], "");
    client(&mock)
        .delete_directory("/alice/stor/site", RequestOptions::new())
        .await?;
    assert_eq!(mock.last().method, Method::DELETE);

    let mock = MockHttpSend::always(
        400,
        &[("content-type", "application/json")],
        r#"{"code":"DirectoryNotEmpty","message":"/alice/stor/site is not empty"}"#,
    );
    let err = client(&mock)
        .delete_directory("/alice/stor/site", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty);
    Ok(())
}

#[tokio::test]
async fn test_put_object() -> Result<()> {
    let mock = MockHttpSend::always(204, &[], "");

    client(&mock)
        .put_object(
            "/alice/public/index.html",
            Bytes::from_static(b"hello"),
            PutObjectOptions {
                content_type: Some("text/html".to_string()),
                durability_level: Some(3),
            },
            RequestOptions::new().with_max_age(3600),
        )
        .await?;

    let req = mock.last();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.body, Bytes::from_static(b"hello"));
    assert_eq!(req.header("content-type"), Some("text/html"));
    assert_eq!(req.header("content-md5"), Some("XUFAKrxLKna5cZ2REBfFkg=="));
    assert_eq!(req.header("durability-level"), Some("3"));
    assert_eq!(req.header("access-control-max-age"), Some("3600"));
    Ok(())
}

#[tokio::test]
async fn test_put_object_defaults_to_octet_stream() -> Result<()> {
    let mock = MockHttpSend::always(204, &[], "");
    client(&mock)
        .put_object(
            "/alice/stor/blob",
            Bytes::from_static(b"\x00\x01"),
            PutObjectOptions::default(),
            RequestOptions::new(),
        )
        .await?;
    assert_eq!(
        mock.last().header("content-type"),
        Some("application/octet-stream")
    );
    Ok(())
}

#[tokio::test]
async fn test_head_object() -> Result<()> {
    let mock = MockHttpSend::always(
        200,
        &[
            ("content-type", "text/plain"),
            ("content-length", "5"),
            ("etag", "e1"),
            ("content-md5", "XUFAKrxLKna5cZ2REBfFkg=="),
        ],
        "",
    );

    let meta = client(&mock)
        .head_object("/alice/stor/hello.txt", RequestOptions::new())
        .await?
        .expect("metadata must be returned");
    assert_eq!(mock.last().method, Method::HEAD);
    assert_eq!(meta.content_length, Some(5));
    assert_eq!(meta.etag.as_deref(), Some("e1"));
    Ok(())
}

#[tokio::test]
async fn test_put_snaplink() -> Result<()> {
    let mock = MockHttpSend::always(204, &[], "");
    client(&mock)
        .put_snaplink(
            "/alice/stor/link.txt",
            "/alice/stor/hello.txt",
            RequestOptions::new(),
        )
        .await?;

    let req = mock.last();
    assert_eq!(req.header("content-type"), Some("application/json; type=link"));
    assert_eq!(req.header("location"), Some("/alice/stor/hello.txt"));
    Ok(())
}

#[tokio::test]
async fn test_create_job() -> Result<()> {
    let mock = MockHttpSend::always(201, &[("location", "/alice/jobs/0f3c5a1e")], "");
    let job = json!({"name": "wc", "phases": [{"exec": "wc", "type": "map"}]});

    let path = client(&mock).create_job(&job, RequestOptions::new()).await?;
    assert_eq!(path, "/alice/jobs/0f3c5a1e");

    let req = mock.last();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri, "https://us-east.manta.example.com/alice/jobs");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&req.body)?, job);
    Ok(())
}

#[tokio::test]
async fn test_job_inputs_and_state() -> Result<()> {
    let mock = MockHttpSend::new(|_, req| {
        let resp = if req.uri.ends_with("/live/in") && req.method == Method::POST {
            response(204, &[], "")
        } else if req.uri.ends_with("/live/in/end") || req.uri.ends_with("/live/cancel") {
            response(202, &[], "")
        } else if req.uri.ends_with("/live/status") {
            response(
                200,
                &[("content-type", "application/json")],
                r#"{"id":"0f3c5a1e","state":"running"}"#,
            )
        } else if req.uri.ends_with("/live/out") {
            response(
                200,
                &[("content-type", "text/plain")],
                "/alice/jobs/0f3c5a1e/stor/a.0\n/alice/jobs/0f3c5a1e/stor/b.0\n",
            )
        } else if req.uri.ends_with("/live/err") {
            response(
                200,
                &[("content-type", "application/x-json-stream")],
                "{\"code\":\"UserTaskError\"}\n",
            )
        } else {
            response(404, &[], "")
        };
        Ok(resp)
    });
    let client = client(&mock);
    let job = "/alice/jobs/0f3c5a1e";

    client
        .add_job_inputs(job, ["/alice/stor/a", "/alice/stor/b"], RequestOptions::new())
        .await?;
    let req = mock.last();
    assert_eq!(req.body, Bytes::from_static(b"/alice/stor/a\n/alice/stor/b"));
    assert_eq!(req.header("content-type"), Some("text/plain"));

    client.end_job_input(job, RequestOptions::new()).await?;
    client.cancel_job(job, RequestOptions::new()).await?;

    let state = client.get_job(job, RequestOptions::new()).await?.unwrap();
    assert_eq!(state["state"], "running");

    let out = client.get_job_output(job, RequestOptions::new()).await?.unwrap();
    assert_eq!(out.len(), 2);

    let errors = client.get_job_errors(job, RequestOptions::new()).await?.unwrap();
    assert_eq!(errors[0]["code"], "UserTaskError");

    let err = client
        .get_job_failures("/alice/jobs", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}

#[tokio::test]
async fn test_list_jobs() -> Result<()> {
    let mock = MockHttpSend::always(
        200,
        &[("content-type", "application/x-json-stream; type=directory")],
        "{\"name\":\"0f3c5a1e\",\"type\":\"directory\"}\n",
    );
    let jobs = client(&mock).list_jobs(RequestOptions::new()).await?.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(mock.last().uri, "https://us-east.manta.example.com/alice/jobs");
    Ok(())
}
