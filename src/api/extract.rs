// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Turning a registry response into a manifest digest

use super::{Error, Response, Result, Strategy};
use crate::formats::{docker::v2::ManifestList, MediaType, Target};

use log::debug;
use url::Url;

const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Extracts the digest a response carries, per the strategy that fetched it
pub fn extract(response: &Response, strategy: Strategy, target: &Target) -> Result<String> {
    match strategy {
        Strategy::ContentNegotiation => negotiated(response, target),
        Strategy::RedirectProbe => redirected(response),
    }
}

fn negotiated(response: &Response, target: &Target) -> Result<String> {
    if !(200..300).contains(&response.status) {
        return Err(Error::UnexpectedStatus(response.status));
    }

    let content_type = response.header("Content-Type").unwrap_or_default();
    debug!("{} answered with {:?}", response.url, content_type);

    match MediaType::classify(content_type) {
        Some(MediaType::List) => {
            let list: ManifestList =
                serde_json::from_slice(&response.body).map_err(Error::MalformedManifest)?;

            list.find(target)
                .map(|item| item.digest.clone())
                .ok_or_else(|| Error::DigestNotFound(format!("no manifest for {}", target)))
        }

        Some(MediaType::Manifest) => response
            .header(DIGEST_HEADER)
            .map(String::from)
            .ok_or_else(|| Error::DigestNotFound(format!("no {} header", DIGEST_HEADER))),

        None => Err(Error::UnsupportedContentType(content_type.into())),
    }
}

fn redirected(response: &Response) -> Result<String> {
    if !matches!(response.status, 301 | 302) {
        return Err(Error::UnexpectedStatus(response.status));
    }

    let location = response.header("Location").ok_or(Error::RedirectMissing)?;

    // Relative targets resolve against the request.
    let target = Url::parse(&response.url)
        .and_then(|base| base.join(location))
        .or_else(|_| Url::parse(location))
        .map_err(|_| Error::RedirectMissing)?;

    debug!("{} redirected to {}", response.url, target);

    match target.path_segments().and_then(|mut s| s.next_back()) {
        Some(last) if !last.is_empty() => Ok(last.into()),
        _ => Err(Error::DigestNotFound(format!("no digest in {}", target))),
    }
}
