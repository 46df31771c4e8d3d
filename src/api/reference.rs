// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Error, Result};

use std::fmt::Display;
use std::str::FromStr;

use log::warn;

/// A parsed image reference: `host/namespace/name[:tag|@digest]`
///
/// The first segment is always taken as the registry host. Only the last two
/// segments form the repository path; anything between the host and those
/// two segments is dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    host: String,
    repository: String,
    tag: String,
}

impl Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sep = if self.is_digest() { '@' } else { ':' };
        write!(f, "{}/{}{}{}", self.host, self.repository, sep, self.tag)
    }
}

impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ImageReference {
    const DEFAULT_TAG: &'static str = "latest";

    pub fn parse(reference: &str) -> Result<Self> {
        let malformed = || Error::MalformedReference(reference.into());

        let segments: Vec<&str> = reference.split('/').collect();
        let n = segments.len();
        if n < 3 {
            return Err(malformed());
        }

        let host = segments[0];
        let context = segments[n - 2];
        let last = segments[n - 1];

        if n > 3 {
            warn!(
                "ignoring nested namespace {:?} in {}",
                segments[1..n - 2].join("/"),
                reference
            );
        }

        // A digest wins over a tag: `name@sha256:...` contains a colon too.
        let (image, tag) = match last.split_once('@') {
            Some((image, digest)) => (image, digest),
            None => match last.split_once(':') {
                Some((image, tag)) => (image, tag),
                None => (last, Self::DEFAULT_TAG),
            },
        };

        if host.is_empty() || context.is_empty() || image.is_empty() || tag.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            host: host.into(),
            repository: format!("{}/{}", context, image),
            tag: tag.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The manifest reference: a tag, or a digest for `@digest` references
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_digest(&self) -> bool {
        self.tag.contains(':')
    }

    pub fn base_url(&self) -> String {
        format!("https://{}", self.host())
    }

    pub fn manifest_path(&self) -> String {
        format!("/v2/{}/manifests/{}", self.repository(), self.tag())
    }

    pub fn manifest_url(&self) -> String {
        format!("{}{}", self.base_url(), self.manifest_path())
    }
}
