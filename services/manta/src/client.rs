// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::*;
use crate::headers::{HeaderAssembler, HeaderSet};
use crate::options::RequestOptions;
use crate::paths::{normalize, validate_job_path, validate_store_path};
use crate::provide_credential::ConfigCredentialProvider;
use crate::response::{interpret, parse_json, parse_json_stream, parse_lines};
use crate::retry::RetryPolicy;
use crate::sign_request::RequestSigner;
use crate::signed_url::{Expires, UrlSigner};
use crate::types::{DirEntry, Object, ObjectMetadata, PutObjectOptions};
use crate::{Config, Credential};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderName, Method, Request, Response, StatusCode, Uri};
use log::debug;
use manta_core::time::now;
use manta_core::{Context, Error, ProvideCredential, Result};
use percent_encoding::utf8_percent_encode;
use serde_json::Value;
use std::sync::Arc;

/// Page size used by [`Client::ls`].
const LS_PAGE_SIZE: usize = 1000;

/// One logical call handed to [`Client::execute`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Target path, like `/alice/stor/a.txt`. Encoded when the request is built.
    pub path: String,
    /// Query pairs, in order.
    pub query: Vec<(String, String)>,
    /// Request body. `Content-MD5` is added when set.
    pub body: Option<Bytes>,
    /// Operation specific headers such as `Content-Type`.
    pub headers: HeaderSet,
    /// Caller options.
    pub options: RequestOptions,
    /// Whether CORS declarations are allowed for this call.
    pub allow_cors: bool,
}

impl RequestSpec {
    /// Describe a `method` request on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderSet::new(),
            options: RequestOptions::default(),
            allow_cors: false,
        }
    }

    /// Append a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the caller options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Client for a manta deployment.
///
/// A client owns one credential for its whole life and signs every request
/// with it. Calls are independent of each other and may run concurrently.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    scheme: String,
    host: String,
    credential: Arc<Credential>,
    headers: HeaderAssembler,
    urls: UrlSigner,
    default_attempts: u32,
}

impl Client {
    /// Create a client for `url` signing with `credential`.
    pub fn new(ctx: Context, url: &str, credential: Credential) -> Result<Self> {
        let uri: Uri = url.parse().map_err(|e| {
            Error::invalid_argument(format!("invalid manta url {url}")).with_source(e)
        })?;
        let host = uri
            .authority()
            .ok_or_else(|| Error::invalid_argument(format!("manta url {url} has no host")))?
            .to_string();
        let scheme = uri.scheme_str().unwrap_or("https").to_string();

        let credential = Arc::new(credential);
        let signer = RequestSigner::new(credential.clone());
        Ok(Self {
            ctx,
            urls: UrlSigner::new(signer.clone(), &host),
            headers: HeaderAssembler::new(signer),
            scheme,
            host,
            credential,
            default_attempts: DEFAULT_ATTEMPTS,
        })
    }

    /// Create a client from config, loading the credential through the context.
    pub async fn from_config(ctx: Context, config: Config) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| Error::invalid_argument("manta url is not configured"))?;
        let attempts = config.attempts;

        let credential = ConfigCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await?
            .ok_or_else(|| Error::invalid_argument("manta user or key path is not configured"))?;

        let client = Self::new(ctx, &url, credential)?;
        match attempts {
            Some(attempts) => client.with_default_attempts(attempts),
            None => Ok(client),
        }
    }

    /// Change the attempts used when a call does not override them.
    pub fn with_default_attempts(mut self, attempts: u32) -> Result<Self> {
        self.default_attempts = RetryPolicy::new(attempts)?.max_attempts();
        Ok(self)
    }

    /// The credential requests are signed with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The account login.
    pub fn user(&self) -> &str {
        self.credential.user()
    }

    /// The service url without a trailing slash.
    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Run one logical call: validate, then sign, send and interpret each attempt.
    ///
    /// `parse` runs inside the retry loop so a corrupt body is retried like
    /// any other transient failure. `Ok(None)` means `304 Not Modified`.
    pub async fn execute<T, F>(
        &self,
        spec: RequestSpec,
        expected: &[StatusCode],
        parse: F,
    ) -> Result<Option<T>>
    where
        F: Fn(Response<Bytes>) -> Result<T> + Send + Sync,
    {
        let policy = RetryPolicy::new(spec.options.attempts.unwrap_or(self.default_attempts))?;
        let mut base = self
            .headers
            .prepare(&spec.options, spec.body.as_ref(), spec.allow_cors)?;
        for (k, v) in spec.headers.iter() {
            base.push_value(k.clone(), v.clone());
        }
        let uri = self.build_uri(&spec.path, &spec.query);

        let (spec, base, uri, parse) = (&spec, &base, uri.as_str(), &parse);
        policy
            .run(move |attempt| async move {
                self.attempt(attempt, spec, base, uri, expected, parse)
                    .await
            })
            .await
    }

    async fn attempt<T, F>(
        &self,
        attempt: u32,
        spec: &RequestSpec,
        base: &HeaderSet,
        uri: &str,
        expected: &[StatusCode],
        parse: &F,
    ) -> Result<Option<T>>
    where
        F: Fn(Response<Bytes>) -> Result<T> + Send + Sync,
    {
        let headers = self.headers.sign(base, now())?;
        let req = headers
            .apply(Request::builder().method(spec.method.clone()).uri(uri))
            .body(spec.body.clone().unwrap_or_default())?;

        debug!("{} {uri} (attempt {})", spec.method, attempt + 1);
        let resp = self.ctx.http_send(req).await?;
        match interpret(&spec.method, resp, expected)? {
            Some(resp) => parse(resp).map(Some),
            None => Ok(None),
        }
    }

    fn build_uri(&self, path: &str, query: &[(String, String)]) -> String {
        let mut uri = format!(
            "{}://{}{}",
            self.scheme,
            self.host,
            utf8_percent_encode(path, &MANTA_PATH_ENCODE_SET)
        );
        for (idx, (k, v)) in query.iter().enumerate() {
            uri.push(if idx == 0 { '?' } else { '&' });
            uri.push_str(&utf8_percent_encode(k, &MANTA_QUERY_ENCODE_SET).to_string());
            uri.push('=');
            uri.push_str(&utf8_percent_encode(v, &MANTA_QUERY_ENCODE_SET).to_string());
        }
        uri
    }

    /// Produce a pre-signed url for `path`. No request is sent.
    pub fn sign_url(
        &self,
        path: &str,
        methods: &[&str],
        expires: impl Into<Expires>,
        query: &[(&str, &str)],
    ) -> Result<String> {
        self.urls.sign(path, methods, expires, query)
    }
}

/// Directory operations.
impl Client {
    /// Create a directory. Existing directories are left alone.
    pub async fn put_directory(&self, path: &str, options: RequestOptions) -> Result<()> {
        validate_store_path(path)?;
        let mut spec = RequestSpec::new(Method::PUT, normalize(path)).with_options(options);
        spec.headers.push(CONTENT_TYPE, CONTENT_TYPE_DIRECTORY)?;
        spec.allow_cors = true;

        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }

    /// List one page of a directory.
    ///
    /// At most `limit` entries are returned, starting at `marker` inclusive.
    pub async fn list_directory(
        &self,
        path: &str,
        limit: Option<usize>,
        marker: Option<&str>,
        options: RequestOptions,
    ) -> Result<Option<Vec<DirEntry>>> {
        validate_store_path(path)?;
        if limit == Some(0) {
            return Err(Error::invalid_argument("limit must be positive"));
        }

        let mut spec = RequestSpec::new(Method::GET, normalize(path)).with_options(options);
        if let Some(limit) = limit {
            spec = spec.with_query("limit", limit.to_string());
        }
        if let Some(marker) = marker {
            spec = spec.with_query("marker", marker);
        }

        self.execute(spec, &[StatusCode::OK], move |resp| {
            parse_json_stream(&resp, limit)
        })
        .await
    }

    /// List every entry of a directory, walking pages by marker.
    pub async fn ls(&self, path: &str) -> Result<Vec<DirEntry>> {
        let mut entries: Vec<DirEntry> = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .list_directory(
                    path,
                    Some(LS_PAGE_SIZE),
                    marker.as_deref(),
                    RequestOptions::default(),
                )
                .await?
                .unwrap_or_default();
            let full = page.len() >= LS_PAGE_SIZE;

            let before = entries.len();
            // Every page after the first starts with the previous marker.
            entries.extend(
                page.into_iter()
                    .filter(|e| Some(e.name.as_str()) != marker.as_deref()),
            );
            if !full || entries.len() == before {
                return Ok(entries);
            }
            marker = entries.last().map(|e| e.name.clone());
        }
    }

    /// Delete an empty directory.
    pub async fn delete_directory(&self, path: &str, options: RequestOptions) -> Result<()> {
        validate_store_path(path)?;
        let spec = RequestSpec::new(Method::DELETE, normalize(path)).with_options(options);
        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }
}

/// Object operations.
impl Client {
    /// Store an object.
    pub async fn put_object(
        &self,
        path: &str,
        body: Bytes,
        put: PutObjectOptions,
        options: RequestOptions,
    ) -> Result<()> {
        validate_store_path(path)?;
        let mut spec = RequestSpec::new(Method::PUT, path)
            .with_body(body)
            .with_options(options);
        spec.headers.push(
            CONTENT_TYPE,
            put.content_type.as_deref().unwrap_or(CONTENT_TYPE_OCTET_STREAM),
        )?;
        if let Some(level) = put.durability_level {
            spec.headers
                .push(HeaderName::from_static(DURABILITY_LEVEL), &level.to_string())?;
        }
        spec.allow_cors = true;

        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }

    /// Fetch an object. `head_only` issues `HEAD` and returns an empty body.
    ///
    /// `Ok(None)` means a conditional request found nothing new.
    pub async fn get_object(&self, path: &str, options: RequestOptions) -> Result<Option<Object>> {
        validate_store_path(path)?;
        let method = if options.head_only {
            Method::HEAD
        } else {
            Method::GET
        };
        let spec = RequestSpec::new(method, path).with_options(options);

        self.execute(spec, &[StatusCode::OK], |resp| {
            let (parts, body) = resp.into_parts();
            Ok(Object {
                metadata: ObjectMetadata::from_headers(&parts.headers),
                body,
            })
        })
        .await
    }

    /// Fetch object metadata only.
    pub async fn head_object(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<ObjectMetadata>> {
        Ok(self
            .get_object(path, options.with_head_only(true))
            .await?
            .map(|v| v.metadata))
    }

    /// Delete an object.
    pub async fn delete_object(&self, path: &str, options: RequestOptions) -> Result<()> {
        validate_store_path(path)?;
        let spec = RequestSpec::new(Method::DELETE, path).with_options(options);
        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }

    /// Create a snaplink at `link` pointing at the object `source`.
    pub async fn put_snaplink(
        &self,
        link: &str,
        source: &str,
        options: RequestOptions,
    ) -> Result<()> {
        validate_store_path(link)?;
        validate_store_path(source)?;
        let mut spec = RequestSpec::new(Method::PUT, link).with_options(options);
        spec.headers.push(CONTENT_TYPE, CONTENT_TYPE_LINK)?;
        spec.headers.push(LOCATION, source)?;

        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }
}

/// Job operations. Job descriptions and states pass through as JSON.
impl Client {
    /// Submit a job, returning its path `/<login>/jobs/<id>`.
    pub async fn create_job(&self, job: &Value, options: RequestOptions) -> Result<String> {
        let body = serde_json::to_vec(job)?;
        let mut spec = RequestSpec::new(Method::POST, format!("/{}/jobs", self.user()))
            .with_body(Bytes::from(body))
            .with_options(options);
        spec.headers.push(CONTENT_TYPE, CONTENT_TYPE_JSON)?;

        let location = self
            .execute(spec, &[StatusCode::CREATED], |resp| {
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .ok_or_else(|| Error::corrupt_result("created job has no location"))?
                    .to_str()?
                    .to_string();
                validate_job_path(&location)
                    .map_err(|_| Error::corrupt_result(format!("invalid job location {location}")))?;
                Ok(location)
            })
            .await?;
        location.ok_or_else(|| Error::unexpected("job creation returned not modified"))
    }

    /// Add input keys to a running job.
    pub async fn add_job_inputs<I, S>(&self, job: &str, inputs: I, options: RequestOptions) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_job_path(job)?;
        let body = inputs
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let mut spec = RequestSpec::new(Method::POST, format!("{job}/live/in"))
            .with_body(Bytes::from(body))
            .with_options(options);
        spec.headers.push(CONTENT_TYPE, CONTENT_TYPE_TEXT)?;

        self.execute(spec, &[StatusCode::NO_CONTENT], |_| Ok(()))
            .await
            .map(|_| ())
    }

    /// Close the input of a job.
    pub async fn end_job_input(&self, job: &str, options: RequestOptions) -> Result<()> {
        self.post_job_action(job, "live/in/end", options).await
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job: &str, options: RequestOptions) -> Result<()> {
        self.post_job_action(job, "live/cancel", options).await
    }

    async fn post_job_action(&self, job: &str, action: &str, options: RequestOptions) -> Result<()> {
        validate_job_path(job)?;
        let spec = RequestSpec::new(Method::POST, format!("{job}/{action}")).with_options(options);
        self.execute(spec, &[StatusCode::ACCEPTED], |_| Ok(()))
            .await
            .map(|_| ())
    }

    /// Fetch the state of a job.
    pub async fn get_job(&self, job: &str, options: RequestOptions) -> Result<Option<Value>> {
        validate_job_path(job)?;
        let spec =
            RequestSpec::new(Method::GET, format!("{job}/live/status")).with_options(options);
        self.execute(spec, &[StatusCode::OK], |resp| parse_json(&resp))
            .await
    }

    /// List the jobs of the account.
    pub async fn list_jobs(&self, options: RequestOptions) -> Result<Option<Vec<Value>>> {
        let spec =
            RequestSpec::new(Method::GET, format!("/{}/jobs", self.user())).with_options(options);
        self.execute(spec, &[StatusCode::OK], |resp| parse_json_stream(&resp, None))
            .await
    }

    /// Input keys of a job.
    pub async fn get_job_input(&self, job: &str, options: RequestOptions) -> Result<Option<Vec<String>>> {
        self.get_job_lines(job, "live/in", options).await
    }

    /// Output keys of a job.
    pub async fn get_job_output(&self, job: &str, options: RequestOptions) -> Result<Option<Vec<String>>> {
        self.get_job_lines(job, "live/out", options).await
    }

    /// Input keys that failed.
    pub async fn get_job_failures(
        &self,
        job: &str,
        options: RequestOptions,
    ) -> Result<Option<Vec<String>>> {
        self.get_job_lines(job, "live/fail", options).await
    }

    /// Error records of a job.
    pub async fn get_job_errors(&self, job: &str, options: RequestOptions) -> Result<Option<Vec<Value>>> {
        validate_job_path(job)?;
        let spec = RequestSpec::new(Method::GET, format!("{job}/live/err")).with_options(options);
        self.execute(spec, &[StatusCode::OK], |resp| parse_json_stream(&resp, None))
            .await
    }

    async fn get_job_lines(
        &self,
        job: &str,
        what: &str,
        options: RequestOptions,
    ) -> Result<Option<Vec<String>>> {
        validate_job_path(job)?;
        let spec = RequestSpec::new(Method::GET, format!("{job}/{what}")).with_options(options);
        self.execute(spec, &[StatusCode::OK], |resp| parse_lines(&resp))
            .await
    }
}
