use anyhow::{bail, Result};
use manta::{Client, Config, RequestOptions};
use manta_core::{Context, OsEnv};
use manta_file_read_tokio::TokioFileRead;
use manta_http_send_reqwest::ReqwestHttpSend;
use std::env;

const USAGE: &str = "usage: mls <ls|get|sign> [path]

Configured through MANTA_URL, MANTA_USER, MANTA_KEY_ID and MANTA_KEY_PATH.";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(cmd) = args.first() else {
        bail!(USAGE);
    };

    let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
    let config = Config::from_env(&ctx)?;
    let http = ReqwestHttpSend::with_options(config.tls_insecure, config.timeout)?;
    let client = Client::from_config(ctx.with_http_send(http), config).await?;

    let path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| format!("/{}/stor", client.user()));

    match cmd.as_str() {
        "ls" => {
            for entry in client.ls(&path).await? {
                let suffix = if entry.is_directory() { "/" } else { "" };
                println!("{}{suffix}", entry.name);
            }
        }
        "get" => match client.get_object(&path, RequestOptions::new()).await? {
            Some(object) => print!("{}", String::from_utf8_lossy(&object.body)),
            None => eprintln!("{path} not modified"),
        },
        "sign" => {
            let expires = manta_core::time::now() + chrono::TimeDelta::hours(1);
            let url = client.sign_url(&path, &["GET"], expires, &[])?;
            let scheme = client.url().split("://").next().unwrap_or("https").to_string();
            println!("{scheme}://{url}");
        }
        _ => bail!(USAGE),
    }
    Ok(())
}
