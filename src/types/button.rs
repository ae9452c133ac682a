// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Button naming for switch devices.

use std::fmt;

/// Reserved name for the single, unnamed button of one-button switches.
///
/// Some devices (e.g. the Aqara switch H1) expose exactly one button and
/// report bare state tokens without a button suffix. The sentinel stands in
/// for the missing name so the identity key stays two-dimensional. The value
/// is deliberately not a legal button name on any supported vendor protocol.
const UNNAMED_BUTTON: &str = "*/main/*";

/// Name of one button on a switch device.
///
/// Together with the device identifier this forms the identity key of a
/// switch within a group. Devices with a single anonymous button use
/// [`ButtonName::unnamed`].
///
/// # Examples
///
/// ```
/// use switchsync_lib::types::ButtonName;
///
/// let left = ButtonName::new("left");
/// assert_eq!(left.as_str(), "left");
/// assert!(!left.is_unnamed());
///
/// let main = ButtonName::unnamed();
/// assert!(main.is_unnamed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ButtonName(String);

impl ButtonName {
    /// Creates a button name from a vendor-reported string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the sentinel name for a device's single, unnamed button.
    #[must_use]
    pub fn unnamed() -> Self {
        Self(UNNAMED_BUTTON.to_string())
    }

    /// Returns `true` if this is the unnamed-button sentinel.
    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.0 == UNNAMED_BUTTON
    }

    /// Returns the button name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ButtonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unnamed() {
            write!(f, "main")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for ButtonName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ButtonName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_button() {
        let button = ButtonName::new("button2");
        assert_eq!(button.as_str(), "button2");
        assert!(!button.is_unnamed());
    }

    #[test]
    fn unnamed_sentinel() {
        let button = ButtonName::unnamed();
        assert!(button.is_unnamed());
        assert_eq!(button.as_str(), UNNAMED_BUTTON);
    }

    #[test]
    fn sentinel_contains_no_separator() {
        // The compound-token decoder splits on '_'; the sentinel must never
        // introduce one when substituted into a bare payload.
        assert!(!UNNAMED_BUTTON.contains('_'));
    }

    #[test]
    fn display_unnamed_as_main() {
        assert_eq!(ButtonName::unnamed().to_string(), "main");
        assert_eq!(ButtonName::new("right").to_string(), "right");
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ButtonName::new("a"));
        set.insert(ButtonName::unnamed());
        set.insert(ButtonName::new("a"));

        assert_eq!(set.len(), 2);
    }
}
