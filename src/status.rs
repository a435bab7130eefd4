//! The server status document and its normalization.
//! [Status Response](https://wiki.vg/Server_List_Ping#Status_Response)

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A normalized server status.
///
/// `description` always has the object shape and `retrieved_at` is stamped by
/// the client when the response is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// The version of the server.
    pub version: Version,
    /// Information about online players
    pub players: Players,
    /// The description of the server (MOTD).
    pub description: Description,
    /// The server icon, a `data:image/png;base64,` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Mod information, only sent by modded servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modinfo: Option<ModInfo>,
    /// Does this server enforce server signing?
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforces_secure_chat: Option<bool>,
    /// Does this server have chat previews?
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previews_chat: Option<bool>,
    /// Milliseconds since the unix epoch at which the response was decoded.
    pub retrieved_at: i64,
}

/// Information about the server's version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// The name of the version the server is running
    ///
    /// In practice this comes in a large variety of different formats.
    pub name: String,
    /// See [Protocol Version Numbers](https://wiki.vg/Protocol_version_numbers)
    pub protocol: i64,
}

/// The stats for players on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub max: i64,
    pub online: i64,
    /// A preview of which players are online
    ///
    /// In practice servers often don't send this or use it for more advertising
    #[serde(default)]
    pub sample: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// The player's UUID
    pub id: String,
}

/// The server's MOTD in object form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Description {
    pub text: String,
}

impl Description {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModInfo {
    /// The mod loader, e.g. `FML`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "modList", default)]
    pub mod_list: Vec<ModMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModMetadata {
    pub modid: String,
    pub version: String,
}

/// What servers actually put in `description`.
///
/// This is a partial chat component, limited to its `text`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Chat {
    String(String),
    Text {
        #[serde(default)]
        text: String,
    },
}

impl From<Chat> for Description {
    fn from(chat: Chat) -> Self {
        match chat {
            Chat::String(text) | Chat::Text { text } => Self { text },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    version: Version,
    players: Players,
    #[serde(default)]
    description: Option<Chat>,
    favicon: Option<String>,
    modinfo: Option<ModInfo>,
    enforces_secure_chat: Option<bool>,
    previews_chat: Option<bool>,
}

impl RawStatus {
    fn normalize(self, retrieved_at: i64) -> ServerStatus {
        ServerStatus {
            version: self.version,
            players: self.players,
            description: self.description.map(Description::from).unwrap_or_default(),
            favicon: self.favicon,
            modinfo: self.modinfo,
            enforces_secure_chat: self.enforces_secure_chat,
            previews_chat: self.previews_chat,
            retrieved_at,
        }
    }
}

impl ServerStatus {
    /// Decodes the JSON a server sent and normalizes it, stamping the current time.
    ///
    /// # Errors
    /// [`Error::ResponseParse`] if `json` is not a status document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::from_json_at(json, now_millis())
    }

    /// Like [`ServerStatus::from_json`], with an explicit `retrieved_at`.
    ///
    /// # Errors
    /// [`Error::ResponseParse`] if `json` is not a status document.
    pub fn from_json_at(json: &str, retrieved_at: i64) -> Result<Self, Error> {
        let raw: RawStatus = serde_json::from_str(json)?;
        Ok(raw.normalize(retrieved_at))
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
