use crate::{client, response, MockHttpSend};
use bytes::Bytes;
use http::StatusCode;
use manta::RequestOptions;
use manta_core::hash::base64_decode;
use manta_core::{Error, ErrorKind, Result};
use pretty_assertions::assert_eq;

const OBJECT: &str = "/alice/stor/hello.txt";

fn signature_of(auth: &str) -> Vec<u8> {
    let b64 = auth
        .rsplit("signature=\"")
        .next()
        .and_then(|v| v.strip_suffix('"'))
        .expect("signature must be present");
    base64_decode(b64).expect("signature must be base64")
}

#[tokio::test]
async fn test_every_request_is_signed() -> Result<()> {
    let mock = MockHttpSend::always(
        200,
        &[
            ("content-type", "text/plain"),
            ("content-md5", "XUFAKrxLKna5cZ2REBfFkg=="),
        ],
        "hello",
    );
    let client = client(&mock);

    let object = client
        .get_object(OBJECT, RequestOptions::new())
        .await?
        .expect("object must be returned");
    assert_eq!(object.body, Bytes::from_static(b"hello"));

    let req = mock.last();
    assert_eq!(req.uri, "https://us-east.manta.example.com/alice/stor/hello.txt");
    assert_eq!(req.headers.get_all("date").iter().count(), 1);
    assert_eq!(req.headers.get_all("authorization").iter().count(), 1);
    assert!(req.header("user-agent").unwrap().starts_with("manta-rs/"));
    assert_eq!(req.header("accept-version"), Some("~1.0"));

    let date = req.header("date").unwrap();
    let auth = req.header("authorization").unwrap();
    assert!(auth.starts_with(
        "Signature keyId=\"/alice/keys/b6:ff:05:27:1a:bf:f9:06:87:a6:cd:67:1f:d4:cd:d8\",algorithm=\"rsa-sha1\""
    ));
    client
        .credential()
        .verify(format!("date: {date}").as_bytes(), &signature_of(auth))?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timeout_uses_every_attempt() {
    for (attempts, expected) in [(3, 3), (1, 1), (5, 5)] {
        let mock = MockHttpSend::new(|_, _| Err(Error::timeout("request timed out")));
        let client = client(&mock);

        let err = client
            .get_object(OBJECT, RequestOptions::new().with_attempts(attempts))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(mock.exchanges(), expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_default_attempts() {
    let mock = MockHttpSend::new(|_, _| Err(Error::connection_refused("connection refused")));
    let err = client(&mock)
        .delete_object(OBJECT, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
    assert_eq!(mock.exchanges(), 3);

    let mock = MockHttpSend::new(|_, _| Err(Error::connection_refused("connection refused")));
    let err = client(&mock)
        .with_default_attempts(2)
        .unwrap()
        .delete_object(OBJECT, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
    assert_eq!(mock.exchanges(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retry_signs_every_attempt() -> Result<()> {
    let mock = MockHttpSend::new(|idx, _| {
        if idx == 0 {
            Err(Error::connection_refused("connection refused"))
        } else {
            Ok(response(204, &[], ""))
        }
    });
    let client = client(&mock);

    client.delete_object(OBJECT, RequestOptions::new()).await?;
    assert_eq!(mock.exchanges(), 2);
    for req in mock.requests() {
        assert_eq!(req.headers.get_all("date").iter().count(), 1);
        let date = req.header("date").unwrap();
        let auth = req.header("authorization").unwrap();
        client
            .credential()
            .verify(format!("date: {date}").as_bytes(), &signature_of(auth))?;
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_body_is_retried() -> Result<()> {
    let mock = MockHttpSend::new(|idx, _| {
        let body = if idx == 0 { "hellO" } else { "hello" };
        Ok(response(
            200,
            &[("content-md5", "XUFAKrxLKna5cZ2REBfFkg==")],
            body,
        ))
    });

    let object = client(&mock)
        .get_object(OBJECT, RequestOptions::new())
        .await?
        .expect("object must be returned");
    assert_eq!(object.body, Bytes::from_static(b"hello"));
    assert_eq!(mock.exchanges(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_body_exhausts_attempts() {
    let mock = MockHttpSend::always(200, &[("content-md5", "XUFAKrxLKna5cZ2REBfFkg==")], "hellO");

    let err = client(&mock)
        .get_object(OBJECT, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptResult);
    assert_eq!(mock.exchanges(), 3);
}

#[tokio::test]
async fn test_not_modified() -> Result<()> {
    let mock = MockHttpSend::always(304, &[], "");

    let object = client(&mock)
        .get_object(OBJECT, RequestOptions::new().with_if_none_match("\"e1\""))
        .await?;
    assert!(object.is_none());
    assert_eq!(mock.last().header("if-none-match"), Some("\"e1\""));
    assert_eq!(mock.exchanges(), 1);
    Ok(())
}

#[tokio::test]
async fn test_precondition_failed() {
    let mock = MockHttpSend::always(
        412,
        &[("content-type", "application/json")],
        r#"{"code":"PreconditionFailed","message":"if-match \"e1\" didn't match etag \"e2\""}"#,
    );

    let err = client(&mock)
        .put_object(
            OBJECT,
            Bytes::from_static(b"hello"),
            Default::default(),
            RequestOptions::new().with_if_match("\"e1\""),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(err.status(), Some(StatusCode::PRECONDITION_FAILED));
    assert_eq!(mock.exchanges(), 1);
}

#[tokio::test]
async fn test_invalid_options_never_reach_the_network() {
    let mock = MockHttpSend::always(200, &[], "");
    let client = client(&mock);

    for options in [
        RequestOptions::new().with_origin("example.com"),
        RequestOptions::new().with_if_modified_since("last tuesday"),
        RequestOptions::new().with_if_match(""),
        RequestOptions::new().with_attempts(0),
        // CORS declarations only apply when storing.
        RequestOptions::new().with_allow_origin("*"),
    ] {
        let err = client.get_object(OBJECT, options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    for options in [
        RequestOptions::new().with_allow_methods("GET, PATCH"),
        RequestOptions::new().with_allow_credentials("sometimes"),
        RequestOptions::new().with_max_age(-1),
        RequestOptions::new().with_allow_headers("x foo"),
    ] {
        let err = client
            .put_object(OBJECT, Bytes::new(), Default::default(), options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    assert_eq!(mock.exchanges(), 0);
}

#[tokio::test]
async fn test_service_error_is_not_retried() {
    let mock = MockHttpSend::always(
        404,
        &[("content-type", "application/json")],
        r#"{"code":"ResourceNotFound","message":"/alice/stor/hello.txt was not found"}"#,
    );

    let err = client(&mock)
        .get_object(OBJECT, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert_eq!(err.message(), "/alice/stor/hello.txt was not found");
    assert_eq!(mock.exchanges(), 1);
}

#[tokio::test]
async fn test_unknown_error_keeps_status_and_body() {
    let mock = MockHttpSend::always(503, &[("content-type", "text/html")], "<html>down</html>");

    let err = client(&mock)
        .get_object(OBJECT, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownError);
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(err.body(), Some("<html>down</html>"));
    assert_eq!(mock.exchanges(), 1);
}
