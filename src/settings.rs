//! # Settings
//!
//! Startup configuration read from a JSON file. Every field has a default.
//! Fields are resolved independently: a field with the wrong type keeps its
//! default and the rest of the file still applies. A missing or unparsable
//! file falls back to all defaults. Configuration problems are logged, never
//! fatal.
//!
//! ```json
//! {
//!     "seed": 42,
//!     "renderDistance": 8,
//!     "enableCulling": 1,
//!     "nearClip": 0.1,
//!     "farClip": 1000.0
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Errors produced while reading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Streaming and rendering configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// World seed. `None` derives one from the clock at startup.
    pub seed: Option<u64>,
    /// Retention radius in chunks.
    pub render_distance: u32,
    /// Hide faces between adjacent solid blocks. Accepts `true`/`false` or `0`/`1`.
    pub enable_culling: bool,
    /// Near clip plane, passed through to the camera.
    pub near_clip: f32,
    /// Far clip plane, passed through to the camera.
    pub far_clip: f32,
    /// Worker thread count. `None` uses the available parallelism.
    pub worker_threads: Option<usize>,
    /// Directory searched first for block textures.
    pub texture_directory: PathBuf,
    /// Directory searched when a texture is missing from `texture_directory`.
    pub fallback_texture_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            seed: None,
            render_distance: 8,
            enable_culling: false,
            near_clip: 0.1,
            far_clip: 1000.0,
            worker_threads: None,
            texture_directory: PathBuf::from("assets/textures/blocks"),
            fallback_texture_directory: PathBuf::from("assets/textures/fallback_blocks"),
        }
    }
}

/// A flag written either as a boolean or as an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> bool {
        match flag {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        }
    }
}

/// Reads `key` from `fields`, keeping `default` if it is absent or has the
/// wrong type.
fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = fields.get(key) else {
        return default;
    };
    match T::deserialize(value) {
        Ok(value) => value,
        Err(err) => {
            warn!("Ignoring setting {key} = {value}: {err}");
            default
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Settings {
    /// Parses settings from JSON text.
    ///
    /// Absent fields and fields of the wrong type take their defaults. Only
    /// text that is not a JSON object is an error.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let fields = match serde_json::from_str::<Value>(json)? {
            Value::Object(fields) => fields,
            other => return Err(SettingsError::NotAnObject(json_type_name(&other))),
        };
        let defaults = Settings::default();

        Ok(Settings {
            seed: field(&fields, "seed", defaults.seed),
            render_distance: field(&fields, "renderDistance", defaults.render_distance),
            enable_culling: field(&fields, "enableCulling", Flag::Bool(defaults.enable_culling)).into(),
            near_clip: field(&fields, "nearClip", defaults.near_clip),
            far_clip: field(&fields, "farClip", defaults.far_clip),
            worker_threads: field(&fields, "workerThreads", defaults.worker_threads),
            texture_directory: field(&fields, "textureDirectory", defaults.texture_directory),
            fallback_texture_directory: field(
                &fields,
                "fallbackTextureDirectory",
                defaults.fallback_texture_directory,
            ),
        })
    }

    /// Reads and parses a settings file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reads a settings file, falling back to defaults on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// The configured seed, or one derived from the current time.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or_default()
        })
    }

    /// Number of worker threads to spawn.
    pub fn worker_count(&self) -> usize {
        self.worker_threads
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Settings::from_json_str("{}").expect("parse"), Settings::default());
    }

    #[test]
    fn culling_accepts_integers_and_booleans() {
        let on = Settings::from_json_str(r#"{ "enableCulling": 1 }"#).expect("parse");
        let off = Settings::from_json_str(r#"{ "enableCulling": 0 }"#).expect("parse");
        let flag = Settings::from_json_str(r#"{ "enableCulling": true }"#).expect("parse");
        assert!(on.enable_culling);
        assert!(!off.enable_culling);
        assert!(flag.enable_culling);
    }

    #[test]
    fn reads_known_fields() {
        let settings = Settings::from_json_str(
            r#"{ "seed": 42, "renderDistance": 3, "nearClip": 0.5, "farClip": 250.0, "workerThreads": 2 }"#,
        )
        .expect("parse");
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.resolved_seed(), 42);
        assert_eq!(settings.render_distance, 3);
        assert_eq!(settings.near_clip, 0.5);
        assert_eq!(settings.far_clip, 250.0);
        assert_eq!(settings.worker_count(), 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json_str(r#"{ "renderDistance": "#),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_json_str("[8, true]"),
            Err(SettingsError::NotAnObject("an array"))
        ));
    }

    #[test]
    fn mistyped_field_keeps_only_its_default() {
        let settings = Settings::from_json_str(
            r#"{ "renderDistance": "far", "enableCulling": 1, "seed": 9, "workerThreads": -2 }"#,
        )
        .expect("parse");
        assert_eq!(settings.render_distance, Settings::default().render_distance);
        assert_eq!(settings.worker_threads, None);
        assert!(settings.enable_culling);
        assert_eq!(settings.seed, Some(9));
    }

    #[test]
    fn negative_render_distance_is_ignored() {
        let settings =
            Settings::from_json_str(r#"{ "renderDistance": -1, "farClip": 64 }"#).expect("parse");
        assert_eq!(settings.render_distance, 8);
        assert_eq!(settings.far_clip, 64.0);
    }

    #[test]
    fn zero_workers_is_raised_to_one() {
        let settings = Settings {
            worker_threads: Some(0),
            ..Settings::default()
        };
        assert_eq!(settings.worker_count(), 1);
    }
}
