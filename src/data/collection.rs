//! Collection names, backend modes and the local key layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DataError;

/// A schemaless record. Record shapes belong to the consuming feature.
pub type Record = serde_json::Value;

/// Prefix of the primary local entry of a collection
pub const PRIMARY_KEY_PREFIX: &str = "santseva_";
/// Prefix of the cache-shadow entry of a collection
pub const CACHE_KEY_PREFIX: &str = "cache_";
/// Local entry holding the persisted mode flag
pub const MODE_KEY: &str = "db_mode";

/// Named logical table persisted by the data manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Calendar events
    Events,
    /// Blog posts
    Blogs,
    /// Booking inquiries
    Inquiries,
    /// Newsletter subscribers
    Subscribers,
    /// Singleton-style settings records (e.g. the daily quote)
    Settings,
    /// Media gallery metadata
    Media,
    /// Curated social media posts
    SocialPosts,
}

/// Whether a collection may be published in a world-readable location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Safe to expose publicly
    Public,
    /// Contains contact details of visitors
    Private,
}

impl Collection {
    /// Every collection, in display order
    pub const ALL: [Collection; 7] = [
        Collection::Events,
        Collection::Blogs,
        Collection::Inquiries,
        Collection::Subscribers,
        Collection::Settings,
        Collection::Media,
        Collection::SocialPosts,
    ];

    /// Stable name used in storage keys and remote locations
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Blogs => "blogs",
            Collection::Inquiries => "inquiries",
            Collection::Subscribers => "subscribers",
            Collection::Settings => "settings",
            Collection::Media => "media",
            Collection::SocialPosts => "social_posts",
        }
    }

    /// Primary local key, e.g. `santseva_events`
    pub fn primary_key(&self) -> String {
        format!("{}{}", PRIMARY_KEY_PREFIX, self.as_str())
    }

    /// Cache-shadow local key, e.g. `cache_events`
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.as_str())
    }

    /// File name used by file-oriented backends
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Inquiries and subscribers hold visitor contact details
    pub fn visibility(&self) -> Visibility {
        match self {
            Collection::Inquiries | Collection::Subscribers => Visibility::Private,
            _ => Visibility::Public,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DataError::UnknownCollection {
                name: s.to_string(),
            })
    }
}

/// Which backend is authoritative for collection reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local store only (demo mode)
    #[default]
    Local,
    /// Cloud document store (Google Drive)
    Drive,
    /// Relational cloud backend (Supabase)
    Supabase,
    /// Version-controlled repository (GitHub)
    GitHub,
}

impl Mode {
    /// Every mode
    pub const ALL: [Mode; 4] = [Mode::Local, Mode::Drive, Mode::Supabase, Mode::GitHub];

    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Drive => "drive",
            Mode::Supabase => "supabase",
            Mode::GitHub => "github",
        }
    }

    /// Whether this mode is backed by a remote adapter
    pub fn is_remote(&self) -> bool {
        !matches!(self, Mode::Local)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "local-only" => Ok(Mode::Local),
            "drive" | "cloud-document" => Ok(Mode::Drive),
            "supabase" | "relational-cloud" => Ok(Mode::Supabase),
            "github" | "version-controlled-repository" => Ok(Mode::GitHub),
            other => Err(DataError::UnknownMode {
                name: other.to_string(),
            }),
        }
    }
}
