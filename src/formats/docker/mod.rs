// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

pub mod v2;
