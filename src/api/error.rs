// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use thiserror::Error;

/// Failures while resolving a manifest digest
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed image reference {0:?}: expected host/namespace/name[:tag|@digest]")]
    MalformedReference(String),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("unable to read registry response")]
    Read(#[from] std::io::Error),

    #[error("registry response exceeds {0} bytes")]
    BodyTooLarge(u64),

    #[error("authentication with {registry} failed: {reason}")]
    Authentication { registry: String, reason: String },

    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),

    #[error("digest not found: {0}")]
    DigestNotFound(String),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("redirect response has no usable Location header")]
    RedirectMissing,

    #[error("malformed manifest list")]
    MalformedManifest(#[source] serde_json::Error),

    #[error("invalid platform {0:?}: expected os/arch[/variant]")]
    InvalidPlatform(String),

    #[error("invalid credentials: expected user:password")]
    InvalidCredentials,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
