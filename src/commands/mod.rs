// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::api::{Credentials, ImageReference, Policy, Registry, Resolver};
use crate::formats::Target;

use anyhow::Context;
use log::warn;
use structopt::StructOpt;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

/// Prints the manifest digest a registry serves for an image reference
#[derive(StructOpt, Debug)]
#[structopt(name = "regdigest")]
pub struct Main {
    /// Resolution policy: negotiate, redirect or auto
    #[structopt(short, long, default_value = "negotiate")]
    policy: Policy,

    /// Platform to select from manifest lists (format: os/arch[/variant])
    #[structopt(long)]
    platform: Option<Target>,

    /// Use plain HTTP instead of HTTPS
    #[structopt(long)]
    plain_http: bool,

    /// The image reference (format: host/namespace/name[:tag|@digest])
    reference: String,
}

impl Main {
    const CREDENTIALS: &'static str = "USER_TOKEN";

    fn credentials() -> Option<Credentials> {
        let token = std::env::var(Self::CREDENTIALS).ok()?;
        match token.parse() {
            Ok(creds) => Some(creds),
            Err(e) => {
                warn!("ignoring {}: {}", Self::CREDENTIALS, e);
                None
            }
        }
    }
}

impl Command for Main {
    fn execute(self) -> anyhow::Result<()> {
        let reference = ImageReference::parse(&self.reference)?;

        let registry = Registry::new(Self::credentials()).plain_http(self.plain_http);
        let target = self.platform.unwrap_or_default();
        let resolver = Resolver::new(registry, target, self.policy);

        let digest = resolver
            .resolve(&reference)
            .with_context(|| format!("unable to resolve {}", reference))?;

        println!("{}", digest);
        Ok(())
    }
}
