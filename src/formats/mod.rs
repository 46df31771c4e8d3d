// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Registry document schemas and the media types that announce them

pub mod docker;
mod target;

pub use self::target::Target;

pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";

/// The kind of document a registry response declares
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaType {
    /// A single-platform manifest
    Manifest,

    /// A manifest list (or OCI index) naming per-platform manifests
    List,
}

impl MediaType {
    /// Classifies a `Content-Type` value, ignoring any parameters
    pub fn classify(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();

        match essence {
            DOCKER_MANIFEST_LIST | OCI_INDEX => Some(Self::List),
            DOCKER_MANIFEST | OCI_MANIFEST => Some(Self::Manifest),
            _ => None,
        }
    }
}
