//! User-facing notifications produced by the client

use serde::{Deserialize, Serialize};

/// How a notification should be rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    /// Informational or success
    #[default]
    Default,
    /// An error the user should act on
    Destructive,
}

/// A short message for the UI shell to display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The headline
    pub title: String,
    /// Optional detail below the headline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The rendering variant
    #[serde(default)]
    pub variant: NotificationVariant,
}

#[allow(clippy::needless_pass_by_value)]
impl Notification {
    /// An informational notification
    pub fn info<T: ToString>(title: T, description: Option<String>) -> Self {
        Self { title: title.to_string(), description, variant: NotificationVariant::Default }
    }

    /// An error notification
    pub fn destructive<T: ToString>(title: T, description: Option<String>) -> Self {
        Self { title: title.to_string(), description, variant: NotificationVariant::Destructive }
    }

    /// Whether the notification reports an error
    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}
