use bytes::Bytes;
use log::warn;
use manta::{Client, Config, PutObjectOptions, RequestOptions};
use manta_core::{Context, ErrorKind, OsEnv, Result};
use manta_file_read_tokio::TokioFileRead;
use manta_http_send_reqwest::ReqwestHttpSend;
use std::env;

async fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("MANTA_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
    let config = Config::from_env(&ctx).expect("manta env must be valid");
    let http = ReqwestHttpSend::with_options(config.tls_insecure, config.timeout)
        .expect("http client must build");
    let client = Client::from_config(ctx.with_http_send(http), config)
        .await
        .expect("client must build from env");
    Some(client)
}

#[tokio::test]
async fn test_live_object_round_trip() -> Result<()> {
    let Some(client) = init_live_client().await else {
        warn!("MANTA_TEST is not set, skipped");
        return Ok(());
    };

    let dir = format!("/{}/stor/manta-rs-test", client.user());
    let path = format!("{dir}/hello.txt");
    client.put_directory(&dir, RequestOptions::new()).await?;
    client
        .put_object(
            &path,
            Bytes::from_static(b"hello"),
            PutObjectOptions::default(),
            RequestOptions::new(),
        )
        .await?;

    let object = client
        .get_object(&path, RequestOptions::new())
        .await?
        .expect("object must exist");
    assert_eq!(object.body, Bytes::from_static(b"hello"));

    let entries = client.ls(&dir).await?;
    assert!(entries.iter().any(|e| e.name == "hello.txt"));

    client.delete_object(&path, RequestOptions::new()).await?;
    let err = client
        .head_object(&path, RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ResourceNotFound | ErrorKind::UnknownError
    ));
    client.delete_directory(&dir, RequestOptions::new()).await?;
    Ok(())
}
