use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(UserId);

/// Who is editing in this session. Shared read-only with anything that
/// renders identity (user list, annotations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: UserId,
    pub name: String,
    pub color_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub start_offset: u64,
    pub end_offset: u64,
}

impl Selection {
    pub fn new(start_offset: u64, end_offset: u64) -> Self {
        Self {
            start_offset,
            end_offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

/// Collaboration channel connection state.
///
/// Any wire value other than `CONNECTED` or `DISCONNECTED` decodes as
/// [`ConnectionState::Connecting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Disconnected => "DISCONNECTED",
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl From<&str> for ConnectionState {
    fn from(value: &str) -> Self {
        match value {
            "CONNECTED" => ConnectionState::Connected,
            "DISCONNECTED" => ConnectionState::Disconnected,
            _ => ConnectionState::Connecting,
        }
    }
}

impl From<String> for ConnectionState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
