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

use der::asn1::UintRef;
use der::{Decode, Sequence};
use log::debug;
use manta_core::hash::{colon_hex, md5};
use manta_core::{Error, Result};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{
    DigestSigner, DigestVerifier, Keypair, SignatureEncoding, Signer, Verifier,
};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use sha1::{Digest, Sha1};
use std::fmt::{Debug, Formatter};

const RSA_MARKER: &str = "RSA PRIVATE KEY";
const DSA_MARKER: &str = "DSA PRIVATE KEY";
const PKCS8_MARKER: &str = "PRIVATE KEY";

/// Digest and signature scheme of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    /// RSA PKCS#1 v1.5 over SHA-1.
    RsaSha1,
    /// DSA over SHA-1 (DSS1).
    DsaSha1,
}

impl SigningAlgorithm {
    /// Name used in the `algorithm` field of the authorization header.
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::RsaSha1 => "rsa-sha1",
            SigningAlgorithm::DsaSha1 => "dsa-sha1",
        }
    }
}

enum PrivateKey {
    Rsa(pkcs1v15::SigningKey<Sha1>),
    Dsa(dsa::SigningKey),
}

/// Credential that holds the private key a client signs with.
///
/// A credential is immutable once built. The fingerprint is the MD5 of the
/// public key in SSH wire format, the same value `ssh-keygen -l -E md5` prints.
pub struct Credential {
    user: String,
    key: PrivateKey,
    fingerprint: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("algorithm", &self.algorithm())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Build a credential from a PEM encoded private key.
    ///
    /// The key type is detected from the PEM marker:
    ///
    /// - `RSA PRIVATE KEY` signs with `rsa-sha1`.
    /// - `DSA PRIVATE KEY` signs with `dsa-sha1`.
    /// - `PRIVATE KEY` (PKCS#8) is accepted when it wraps an RSA or DSA key.
    ///
    /// Any other key type fails with `UnsupportedKey`.
    pub fn from_pem(user: impl Into<String>, pem: &str) -> Result<Self> {
        let user = user.into();
        if user.is_empty() {
            return Err(Error::invalid_argument("user must not be empty"));
        }

        let label = pem_label(pem)
            .ok_or_else(|| Error::unsupported_key("no PEM private key marker found"))?;
        if pem.contains("Proc-Type: 4,ENCRYPTED") {
            return Err(Error::unsupported_key(
                "encrypted private keys are not supported",
            ));
        }

        let key = match label {
            RSA_MARKER => PrivateKey::Rsa(pkcs1v15::SigningKey::new(
                RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| {
                    Error::invalid_argument("failed to parse RSA private key").with_source(e)
                })?,
            )),
            DSA_MARKER => PrivateKey::Dsa(parse_dsa_pem(pem)?),
            PKCS8_MARKER => parse_pkcs8_pem(pem)?,
            v => {
                return Err(Error::unsupported_key(format!(
                    "unsupported private key type: {v}"
                )))
            }
        };

        let fingerprint = colon_hex(&md5(&ssh_public_key_blob(&key)));
        debug!("loaded {label} for user {user} with fingerprint {fingerprint}");

        Ok(Self {
            user,
            key,
            fingerprint,
        })
    }

    /// The account name requests are signed for.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Colon separated lowercase hex MD5 fingerprint of the public key.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The signing algorithm implied by the key type.
    pub fn algorithm(&self) -> SigningAlgorithm {
        match self.key {
            PrivateKey::Rsa(_) => SigningAlgorithm::RsaSha1,
            PrivateKey::Dsa(_) => SigningAlgorithm::DsaSha1,
        }
    }

    /// The key id path: `/<user>/keys/<fingerprint>`.
    pub fn key_id(&self) -> String {
        format!("/{}/keys/{}", self.user, self.fingerprint)
    }

    /// Check that a configured key id refers to this key.
    ///
    /// A leading `MD5:` prefix, as printed by `ssh-keygen`, is ignored.
    pub fn ensure_fingerprint(&self, expected: &str) -> Result<()> {
        let expected = expected.strip_prefix("MD5:").unwrap_or(expected);
        if expected.eq_ignore_ascii_case(&self.fingerprint) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "key id {expected} does not match key fingerprint {}",
                self.fingerprint
            )))
        }
    }

    /// Sign data, returning the raw signature bytes.
    ///
    /// DSA signatures are DER encoded `(r, s)` pairs.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        match &self.key {
            PrivateKey::Rsa(key) => {
                let signature: pkcs1v15::Signature = key
                    .try_sign(data)
                    .map_err(|e| Error::unexpected("failed to sign with RSA key").with_source(e))?;
                Ok(signature.to_vec())
            }
            PrivateKey::Dsa(key) => {
                let signature: dsa::Signature = key
                    .try_sign_digest(Sha1::new_with_prefix(data))
                    .map_err(|e| Error::unexpected("failed to sign with DSA key").with_source(e))?;
                Ok(signature.to_vec())
            }
        }
    }

    /// Verify a signature produced by [`Credential::sign`] against the public half of the key.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let invalid = |e: rsa::signature::Error| {
            Error::invalid_argument("signature does not verify").with_source(e)
        };
        match &self.key {
            PrivateKey::Rsa(key) => {
                let signature = pkcs1v15::Signature::try_from(signature).map_err(invalid)?;
                key.verifying_key()
                    .verify(data, &signature)
                    .map_err(invalid)
            }
            PrivateKey::Dsa(key) => {
                let signature = dsa::Signature::try_from(signature).map_err(invalid)?;
                key.verifying_key()
                    .verify_digest(Sha1::new_with_prefix(data), &signature)
                    .map_err(invalid)
            }
        }
    }
}

/// Returns the label of the first `-----BEGIN <label>-----` line.
fn pem_label(pem: &str) -> Option<&str> {
    pem.lines().find_map(|line| {
        line.trim()
            .strip_prefix("-----BEGIN ")?
            .strip_suffix("-----")
    })
}

/// Traditional OpenSSL DSA key: `SEQUENCE { version, p, q, g, y, x }`.
#[derive(Sequence)]
struct DsaPrivateKeyDocument<'a> {
    version: u8,
    p: UintRef<'a>,
    q: UintRef<'a>,
    g: UintRef<'a>,
    y: UintRef<'a>,
    x: UintRef<'a>,
}

fn parse_dsa_pem(pem: &str) -> Result<dsa::SigningKey> {
    let invalid =
        |e: anyhow::Error| Error::invalid_argument("failed to parse DSA private key").with_source(e);

    let (_, der_bytes) = der::pem::decode_vec(pem.trim().as_bytes())
        .map_err(|e| invalid(anyhow_from(e)))?;
    let doc =
        DsaPrivateKeyDocument::from_der(&der_bytes).map_err(|e| invalid(anyhow_from(e)))?;
    if doc.version != 0 {
        return Err(Error::invalid_argument(format!(
            "unsupported DSA key version {}",
            doc.version
        )));
    }

    let uint = |v: UintRef<'_>| dsa::BigUint::from_bytes_be(v.as_bytes());
    let components = dsa::Components::from_components(uint(doc.p), uint(doc.q), uint(doc.g))
        .map_err(|e| invalid(anyhow_from(e)))?;
    let verifying_key = dsa::VerifyingKey::from_components(components, uint(doc.y))
        .map_err(|e| invalid(anyhow_from(e)))?;
    dsa::SigningKey::from_components(verifying_key, uint(doc.x))
        .map_err(|e| invalid(anyhow_from(e)))
}

fn parse_pkcs8_pem(pem: &str) -> Result<PrivateKey> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(PrivateKey::Rsa(pkcs1v15::SigningKey::new(key)));
    }

    let (_, der_bytes) = der::pem::decode_vec(pem.trim().as_bytes()).map_err(|e| {
        Error::invalid_argument("failed to decode PKCS#8 private key").with_source(anyhow_from(e))
    })?;
    dsa::SigningKey::from_pkcs8_der(&der_bytes)
        .map(PrivateKey::Dsa)
        .map_err(|e| {
            Error::unsupported_key("PKCS#8 key is neither RSA nor DSA").with_source(anyhow_from(e))
        })
}

fn anyhow_from<E: std::fmt::Display>(err: E) -> anyhow::Error {
    anyhow::anyhow!("{err}")
}

/// Public key in SSH wire format, the input of the key fingerprint.
fn ssh_public_key_blob(key: &PrivateKey) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    match key {
        PrivateKey::Rsa(key) => {
            let key: &RsaPrivateKey = key.as_ref();
            write_ssh_string(&mut buf, b"ssh-rsa");
            write_ssh_mpint(&mut buf, &key.e().to_bytes_be());
            write_ssh_mpint(&mut buf, &key.n().to_bytes_be());
        }
        PrivateKey::Dsa(key) => {
            let vk = key.verifying_key();
            let components = vk.components();
            write_ssh_string(&mut buf, b"ssh-dss");
            write_ssh_mpint(&mut buf, &components.p().to_bytes_be());
            write_ssh_mpint(&mut buf, &components.q().to_bytes_be());
            write_ssh_mpint(&mut buf, &components.g().to_bytes_be());
            write_ssh_mpint(&mut buf, &vk.y().to_bytes_be());
        }
    }
    buf
}

fn write_ssh_string(buf: &mut Vec<u8>, v: &[u8]) {
    buf.extend_from_slice(&(v.len() as u32).to_be_bytes());
    buf.extend_from_slice(v);
}

fn write_ssh_mpint(buf: &mut Vec<u8>, v: &[u8]) {
    let start = v.iter().position(|b| *b != 0).unwrap_or(v.len());
    let v = &v[start..];
    if v.first().is_some_and(|b| b & 0x80 != 0) {
        buf.extend_from_slice(&(v.len() as u32 + 1).to_be_bytes());
        buf.push(0);
        buf.extend_from_slice(v);
    } else {
        write_ssh_string(buf, v);
    }
}
