// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Error, ImageReference, Result};

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, info};
use regex::Regex;
use serde::Deserialize;
use ureq::{Agent, AgentBuilder};

/// How a manifest request is negotiated with the registry
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Accept lists and single manifests; follow redirects
    ContentNegotiation,

    /// Accept single manifests only; observe redirects instead of following
    RedirectProbe,
}

impl Strategy {
    pub fn accept(self) -> &'static str {
        match self {
            Self::ContentNegotiation => concat!(
                "application/vnd.docker.distribution.manifest.list.v2+json, ",
                "application/vnd.docker.distribution.manifest.v2+json, ",
                "application/vnd.oci.image.index.v1+json, ",
                "application/vnd.oci.image.manifest.v1+json",
            ),
            Self::RedirectProbe => "application/vnd.docker.distribution.manifest.v2+json",
        }
    }
}

/// Basic credentials, as `user:password`
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl FromStr for Credentials {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((user, pass)) if !user.is_empty() => Ok(Self::new(user, pass)),
            _ => Err(Error::InvalidCredentials),
        }
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn basic(&self) -> String {
        let pair = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

/// A raw registry reply, fully read
#[derive(Clone, Debug)]
pub struct Response {
    pub url: String,
    pub status: u16,
    headers: HashMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl Response {
    const MAX_BODY: u64 = 8 * 1024 * 1024;

    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    #[cfg(test)]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The first value of a header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    fn read(rep: ureq::Response) -> Result<Self> {
        let mut out = Self::new(rep.get_url(), rep.status());

        for name in rep.headers_names() {
            let key = name.to_ascii_lowercase();
            if out.headers.contains_key(&key) {
                continue;
            }

            let values = rep.all(&name).into_iter().map(String::from).collect();
            out.headers.insert(key, values);
        }

        out.body = read_limited(rep.into_reader(), Self::MAX_BODY)?;
        Ok(out)
    }
}

/// Reads a whole body, refusing to cut off anything past `limit`
fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;

    if body.len() as u64 > limit {
        return Err(Error::BodyTooLarge(limit));
    }

    Ok(body)
}

/// The registry transport: one manifest GET per call
#[derive(Clone, Debug)]
pub struct Registry {
    follow: Agent,
    probe: Agent,
    credentials: Option<Credentials>,
    plain_http: bool,
}

impl Registry {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            follow: AgentBuilder::new().build(),
            probe: AgentBuilder::new().redirects(0).build(),
            credentials,
            plain_http: false,
        }
    }

    /// Talk plain HTTP instead of HTTPS
    pub fn plain_http(mut self, plain: bool) -> Self {
        self.plain_http = plain;
        self
    }

    pub fn manifest_url(&self, reference: &ImageReference) -> String {
        if self.plain_http {
            format!("http://{}{}", reference.host(), reference.manifest_path())
        } else {
            reference.manifest_url()
        }
    }

    pub fn fetch_manifest(&self, reference: &ImageReference, strategy: Strategy) -> Result<Response> {
        let agent = match strategy {
            Strategy::ContentNegotiation => &self.follow,
            Strategy::RedirectProbe => &self.probe,
        };

        let url = self.manifest_url(reference);
        debug!("GET {} ({:?})", url, strategy);
        self.get(agent, reference.host(), &url, strategy.accept(), None)
    }

    fn get(
        &self,
        agent: &Agent,
        host: &str,
        url: &str,
        accept: &str,
        authorization: Option<&str>,
    ) -> Result<Response> {
        let mut req = agent.get(url).set("Accept", accept);
        if let Some(auth) = authorization {
            req = req.set("Authorization", auth);
        }

        match req.call() {
            Ok(rep) => Response::read(rep),

            Err(ureq::Error::Status(401, rep)) if authorization.is_none() => {
                let challenge = rep
                    .header("WWW-Authenticate")
                    .map(String::from)
                    .ok_or_else(|| denied(host, "no WWW-Authenticate challenge"))?;

                let auth = self.auth(host, &challenge)?;
                self.get(agent, host, url, accept, Some(&auth))
            }

            Err(ureq::Error::Status(401, ..)) => Err(denied(host, "credentials rejected")),

            Err(ureq::Error::Status(_, rep)) => Response::read(rep),

            Err(ureq::Error::Transport(t)) => Err(Error::Transport {
                url: url.into(),
                source: Box::new(t),
            }),
        }
    }

    /// Answers a `WWW-Authenticate` challenge with an `Authorization` value
    fn auth(&self, host: &str, challenge: &str) -> Result<String> {
        let challenge = challenge.trim();
        let (scheme, params) = challenge.split_once(' ').unwrap_or((challenge, ""));
        info!("{} challenge from {}", scheme, host);

        if scheme.eq_ignore_ascii_case("basic") {
            return match &self.credentials {
                Some(creds) => Ok(creds.basic()),
                None => Err(denied(host, "basic challenge without credentials")),
            };
        }

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(denied(host, &format!("unsupported scheme {}", scheme)));
        }

        #[derive(Deserialize)]
        struct Token {
            token: Option<String>,
            access_token: Option<String>,
        }

        const RE: &str = "([A-Za-z_]+)=\"([^\"]*)\"";

        let mut map = HashMap::new();
        let re = Regex::new(RE).unwrap();
        for caps in re.captures_iter(params) {
            map.insert(caps[1].to_ascii_lowercase(), caps[2].to_string());
        }

        let realm = map
            .remove("realm")
            .ok_or_else(|| denied(host, "bearer challenge without realm"))?;

        let mut req = self.follow.get(&realm);
        for (k, v) in &map {
            req = req.query(k, v);
        }
        if let Some(creds) = &self.credentials {
            req = req.set("Authorization", &creds.basic());
        }

        let token: Token = match req.call() {
            Ok(rep) => rep
                .into_json()
                .map_err(|_| denied(host, "malformed token reply"))?,
            Err(ureq::Error::Status(code, ..)) => {
                return Err(denied(host, &format!("token endpoint returned {}", code)))
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(Error::Transport {
                    url: realm,
                    source: Box::new(t),
                })
            }
        };

        token
            .token
            .or(token.access_token)
            .map(|t| format!("Bearer {}", t))
            .ok_or_else(|| denied(host, "token endpoint returned no token"))
    }
}

fn denied(host: &str, reason: &str) -> Error {
    Error::Authentication {
        registry: host.into(),
        reason: reason.into(),
    }
}
