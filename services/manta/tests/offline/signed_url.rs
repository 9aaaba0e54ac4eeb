use crate::{client, MockHttpSend, DSA_KEY, ENDPOINT};
use chrono::{TimeZone, Utc};
use manta::{Client, Credential};
use manta_core::hash::base64_decode;
use manta_core::{Context, ErrorKind, Result};
use pretty_assertions::assert_eq;

/// Split a signed url into the signed plaintext and the raw signature.
fn plaintext_and_signature(method: &str, url: &str) -> (String, Vec<u8>) {
    let (host_path, query) = url.split_once('?').expect("url must have a query");
    let (host, path) = host_path.split_at(host_path.find('/').expect("url must have a path"));
    let (unsigned, _) = query
        .rsplit_once("&signature=")
        .expect("signature must be last");

    let signature = form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "signature")
        .map(|(_, v)| v.into_owned())
        .expect("signature must be present");

    (
        format!("{method}\n{host}\n{path}\n{unsigned}"),
        base64_decode(&signature).expect("signature must be base64"),
    )
}

#[test]
fn test_signed_url_verifies() -> Result<()> {
    let mock = MockHttpSend::always(200, &[], "");
    let client = client(&mock);
    let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let url = client.sign_url("/alice/stor/reports/q1.csv", &["GET"], expires, &[])?;
    assert!(url.starts_with("us-east.manta.example.com/alice/stor/reports/q1.csv?"));

    let params: Vec<(String, String)> = form_urlencoded::parse(url.split_once('?').unwrap().1.as_bytes())
        .into_owned()
        .collect();
    assert_eq!(params[0], ("algorithm".to_string(), "RSA-SHA1".to_string()));
    assert_eq!(params[1], ("expires".to_string(), expires.timestamp().to_string()));
    assert_eq!(
        params[2],
        (
            "keyId".to_string(),
            "/alice/keys/b6:ff:05:27:1a:bf:f9:06:87:a6:cd:67:1f:d4:cd:d8".to_string()
        )
    );
    assert_eq!(params[3].0, "signature");

    let (plaintext, signature) = plaintext_and_signature("GET", &url);
    client.credential().verify(plaintext.as_bytes(), &signature)?;

    // Signing again reproduces the url.
    assert_eq!(
        client.sign_url("/alice/stor/reports/q1.csv", &["GET"], expires, &[])?,
        url
    );
    assert_eq!(mock.exchanges(), 0);
    Ok(())
}

#[test]
fn test_signed_url_changes_with_inputs() -> Result<()> {
    let client = client(&MockHttpSend::always(200, &[], ""));
    let signature = |url: String| url.rsplit_once("&signature=").unwrap().1.to_string();

    let base = signature(client.sign_url("/alice/stor/a", &["GET"], 1_900_000_000i64, &[])?);
    let other_path = signature(client.sign_url("/alice/stor/b", &["GET"], 1_900_000_000i64, &[])?);
    let other_expires =
        signature(client.sign_url("/alice/stor/a", &["GET"], 1_900_000_001i64, &[])?);
    let other_method = signature(client.sign_url("/alice/stor/a", &["PUT"], 1_900_000_000i64, &[])?);

    assert_ne!(base, other_path);
    assert_ne!(base, other_expires);
    assert_ne!(base, other_method);
    Ok(())
}

#[test]
fn test_signed_url_with_dsa_key() -> Result<()> {
    let cred = Credential::from_pem("alice", DSA_KEY)?;
    let client = Client::new(Context::new(), ENDPOINT, cred)?;

    let url = client.sign_url("/alice/stor/a", &["GET", "HEAD"], 1_900_000_000i64, &[])?;
    assert!(url.contains("algorithm=DSA-SHA1"));
    assert!(url.contains("method=GET%2CHEAD"));

    let (plaintext, signature) = plaintext_and_signature("GET,HEAD", &url);
    client.credential().verify(plaintext.as_bytes(), &signature)?;
    Ok(())
}

#[test]
fn test_signed_url_rejects_public_paths() {
    let client = client(&MockHttpSend::always(200, &[], ""));
    let err = client
        .sign_url("/alice/public/a", &["GET"], 1_900_000_000i64, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
