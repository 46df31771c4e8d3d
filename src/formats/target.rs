// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::docker::v2::Platform;
use crate::api::Error;

use std::fmt::Display;
use std::str::FromStr;

/// The platform a manifest list entry must be built for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub os: String,
    pub architecture: String,
    pub variant: Option<String>,
}

impl Default for Target {
    /// The host platform, named the way registries name it
    fn default() -> Self {
        let os = match std::env::consts::OS {
            "windows" => "windows",
            _ => "linux",
        };

        let architecture = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "loongarch64" => "loong64",
            other => other,
        };

        Self::new(os, architecture)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{}", variant)?;
        }

        Ok(())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidPlatform(s.into()));
        }

        match parts[..] {
            [os, arch] => Ok(Self::new(os, arch)),
            [os, arch, variant] => Ok(Self {
                variant: Some(variant.into()),
                ..Self::new(os, arch)
            }),
            _ => Err(Error::InvalidPlatform(s.into())),
        }
    }
}

impl Target {
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
            variant: None,
        }
    }

    /// Whether a manifest list entry's platform satisfies this target
    ///
    /// The variant is only compared when the target names one.
    pub fn matches(&self, platform: &Platform) -> bool {
        if platform.architecture != self.architecture || platform.os != self.os {
            return false;
        }

        match &self.variant {
            Some(v) => platform.variant.as_deref() == Some(v.as_str()),
            None => true,
        }
    }
}
