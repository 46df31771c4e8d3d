// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::formats::Target;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Platform {
    pub architecture: String,

    pub os: String,

    #[serde(rename = "os.version")]
    pub os_version: Option<String>,

    #[serde(default, rename = "os.features")]
    pub os_features: Vec<String>,

    pub variant: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Item {
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,

    pub size: u64,

    pub digest: String,

    /// Absent on OCI index entries that are not images (e.g. attestations)
    pub platform: Option<Platform>,
}

/// A manifest list (OCI: image index)
///
/// Both documents share this shape, so one schema decodes either.
#[derive(Clone, Debug, Deserialize)]
pub struct ManifestList {
    #[serde(rename = "schemaVersion")]
    pub schema_version: usize,

    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,

    pub manifests: Vec<Item>,
}

impl ManifestList {
    /// The first entry, in registry order, built for the target platform
    pub fn find(&self, target: &Target) -> Option<&Item> {
        self.manifests.iter().find(|item| match &item.platform {
            Some(platform) => target.matches(platform),
            None => false,
        })
    }
}
