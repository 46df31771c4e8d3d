// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{extract, Error, ImageReference, Registry, Result, Strategy};
use crate::formats::Target;

use std::fmt::Display;
use std::str::FromStr;

use log::{info, warn};

/// Which strategies a resolution attempts, in order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Policy {
    Negotiate,
    Redirect,
    Auto,
}

impl Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Negotiate => "negotiate",
            Self::Redirect => "redirect",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negotiate" => Ok(Self::Negotiate),
            "redirect" => Ok(Self::Redirect),
            "auto" => Ok(Self::Auto),
            _ => Err(format!("unknown policy {:?} (negotiate|redirect|auto)", s)),
        }
    }
}

impl Policy {
    /// The primary strategy and the one to fall back on, if any
    fn strategies(self) -> (Strategy, Option<Strategy>) {
        match self {
            Self::Negotiate => (Strategy::ContentNegotiation, None),
            Self::Redirect => (Strategy::RedirectProbe, None),
            Self::Auto => (Strategy::ContentNegotiation, Some(Strategy::RedirectProbe)),
        }
    }
}

/// Resolves image references to manifest digests
#[derive(Clone, Debug)]
pub struct Resolver {
    registry: Registry,
    target: Target,
    policy: Policy,
}

impl Resolver {
    pub fn new(registry: Registry, target: Target, policy: Policy) -> Self {
        Self {
            registry,
            target,
            policy,
        }
    }

    pub fn resolve(&self, reference: &ImageReference) -> Result<String> {
        let (primary, fallback) = self.policy.strategies();

        match (self.attempt(reference, primary), fallback) {
            (Err(e @ (Error::UnsupportedContentType(..) | Error::UnexpectedStatus(..))), Some(next)) => {
                warn!("{:?} failed for {}: {}; trying {:?}", primary, reference, e, next);
                self.attempt(reference, next)
            }

            (result, ..) => result,
        }
    }

    fn attempt(&self, reference: &ImageReference, strategy: Strategy) -> Result<String> {
        let rep = self.registry.fetch_manifest(reference, strategy)?;
        let digest = extract(&rep, strategy, &self.target)?;
        info!("{} resolved to {} ({:?})", reference, digest, strategy);
        Ok(digest)
    }
}
