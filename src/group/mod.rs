// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch groups and their coordination.
//!
//! A group is an unordered set of switches meant to share one logical
//! state. Members are declared through the registration API in
//! [`crate::service`] and frozen once the group starts.

pub(crate) mod coordinator;
mod switch;

pub use switch::{Switch, SwitchKey};
