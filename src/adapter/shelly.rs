// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON relay-status codec for Shelly devices.
//!
//! Shelly relays report per-button status on their own topic
//! (`{prefix}/{id}/status/{button}`, e.g. `shellies/shelly1/status/0`) as a
//! JSON object carrying the boolean `output` field, and accept the literal
//! payloads `"on"`/`"off"` on the matching `command` topic.

use serde::Deserialize;

use crate::group::Switch;

use super::NormalizedState;

/// Relay status report. Shelly sends many more fields (power, temperature,
/// timers); only the output flag matters here.
#[derive(Debug, Deserialize)]
struct RelayStatus {
    output: bool,
}

pub(super) fn subscription_topic(switch: &Switch) -> String {
    format!(
        "{}/{}/status/{}",
        switch.topic_prefix(),
        switch.device_id(),
        switch.button().as_str()
    )
}

pub(super) fn decode(switch: &Switch, _topic: &str, payload: &str) -> Option<NormalizedState> {
    let status: RelayStatus = match serde_json::from_str(payload) {
        Ok(status) => status,
        Err(err) => {
            tracing::trace!(
                device = %switch.device_id(),
                error = %err,
                "Ignoring unparseable relay status"
            );
            return None;
        }
    };

    let state = if status.output { "on" } else { "off" };
    Some(NormalizedState {
        button: switch.button().clone(),
        state: state.to_string(),
    })
}

pub(super) fn command_topic(switch: &Switch) -> String {
    format!(
        "{}/{}/command/{}",
        switch.topic_prefix(),
        switch.device_id(),
        switch.button().as_str()
    )
}

pub(super) fn encode(_switch: &Switch, target_state: &str) -> String {
    // Wire literal is lowercase; a target originating from a compound-token
    // member arrives as "ON"/"OFF".
    target_state.to_ascii_lowercase()
}
