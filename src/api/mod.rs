// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod error;
mod extract;
mod reference;
mod registry;
mod resolver;

pub use self::error::{Error, Result};
pub use self::extract::extract;
pub use self::reference::ImageReference;
pub use self::registry::{Credentials, Registry, Response, Strategy};
pub use self::resolver::{Policy, Resolver};
