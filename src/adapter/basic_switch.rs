// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compound-token codec for the Aqara/Tuya switch families.
//!
//! These devices report button actions on a shared `action` topic as a
//! token of the form `"<STATE>_<BUTTON>"`; one-button devices send the bare
//! `"<STATE>"` without a suffix. All buttons of one device publish to the
//! same topic, so decoding filters out reports for sibling buttons.

use crate::group::Switch;
use crate::types::ButtonName;

use super::NormalizedState;

/// Separator between the state and button fields of an action token.
///
/// Exactly one separator divides state from button; absence of a separator
/// implies the single/default button. A button name that itself contains
/// the separator cannot be represented unambiguously in this format.
const SEPARATOR: char = '_';

pub(super) fn subscription_topic(switch: &Switch) -> String {
    format!(
        "{}/{}/action",
        switch.topic_prefix(),
        switch.device_id()
    )
}

pub(super) fn decode(switch: &Switch, _topic: &str, payload: &str) -> Option<NormalizedState> {
    let (state, button) = match payload.split_once(SEPARATOR) {
        Some((state, button)) => (state, ButtonName::new(button)),
        // Bare token from a one-button device stands for the unnamed button.
        None => (payload, ButtonName::unnamed()),
    };

    if button != *switch.button() {
        // Report for a sibling button sharing this device's action topic.
        tracing::trace!(
            device = %switch.device_id(),
            button = %switch.button(),
            reported = %button,
            "Ignoring action for another button"
        );
        return None;
    }

    Some(NormalizedState {
        button,
        state: state.to_string(),
    })
}

pub(super) fn command_topic(switch: &Switch) -> String {
    let field = if switch.button().is_unnamed() {
        "state".to_string()
    } else {
        format!("state_{}", switch.button().as_str())
    };
    format!(
        "{}/{}/set/{field}",
        switch.topic_prefix(),
        switch.device_id()
    )
}

pub(super) fn encode(_switch: &Switch, target_state: &str) -> String {
    target_state.to_string()
}

#[cfg(test)]
mod tests {
    use crate::adapter::VendorAdapter;
    use crate::group::Switch;
    use crate::types::ButtonName;

    fn single_button_switch() -> Switch {
        Switch::create("Aqara", "zigbee", "0x1234", ButtonName::unnamed()).unwrap()
    }

    fn named_button_switch(button: &str) -> Switch {
        Switch::create("Tuya", "zigbee", "0xabcd", ButtonName::new(button)).unwrap()
    }

    #[test]
    fn subscription_topic_uses_action_suffix() {
        let switch = single_button_switch();
        assert_eq!(switch.subscription_topic(), "zigbee/0x1234/action");
    }

    #[test]
    fn decode_bare_state_as_unnamed_button() {
        let switch = single_button_switch();
        let normalized = switch.decode("zigbee/0x1234/action", "ON").unwrap();
        assert!(normalized.button.is_unnamed());
        assert_eq!(normalized.state, "ON");
    }

    #[test]
    fn decode_compound_token() {
        let switch = named_button_switch("button2");
        let normalized = switch.decode("zigbee/0xabcd/action", "OFF_button2").unwrap();
        assert_eq!(normalized.button, ButtonName::new("button2"));
        assert_eq!(normalized.state, "OFF");
    }

    #[test]
    fn decode_drops_sibling_button_report() {
        let switch = named_button_switch("left");
        assert!(switch.decode("zigbee/0xabcd/action", "ON_right").is_none());
    }

    #[test]
    fn decode_drops_bare_state_on_named_button() {
        // A bare token means the unnamed button; a member declared with a
        // real button name must not claim it.
        let switch = named_button_switch("left");
        assert!(switch.decode("zigbee/0xabcd/action", "ON").is_none());
    }

    #[test]
    fn decode_splits_on_first_separator() {
        let switch = named_button_switch("double");
        // "hold_double_left" decodes to button "double_left", not "double":
        // the remainder after the first separator is the button field.
        assert!(switch.decode("zigbee/0xabcd/action", "hold_double_left").is_none());

        let switch = named_button_switch("double_left");
        let normalized = switch
            .decode("zigbee/0xabcd/action", "hold_double_left")
            .unwrap();
        assert_eq!(normalized.state, "hold");
        assert_eq!(normalized.button, ButtonName::new("double_left"));
    }

    #[test]
    fn command_topic_unnamed_button() {
        let switch = single_button_switch();
        assert_eq!(switch.command_topic(), "zigbee/0x1234/set/state");
    }

    #[test]
    fn command_topic_named_button() {
        let switch = named_button_switch("button2");
        assert_eq!(switch.command_topic(), "zigbee/0xabcd/set/state_button2");
    }

    #[test]
    fn encode_is_bare_state() {
        let switch = single_button_switch();
        assert_eq!(switch.encode("ON"), "ON");
        assert_eq!(switch.encode("OFF"), "OFF");
    }

    #[test]
    fn adapter_variant_is_basic_switch() {
        let switch = single_button_switch();
        assert_eq!(switch.adapter(), VendorAdapter::BasicSwitch);
    }
}
