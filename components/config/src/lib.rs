use std::io;
use std::path::Path;

pub extern crate paste;
pub extern crate serde;
pub extern crate tracing;

pub mod util;

/// Declares a configuration section.
///
/// Every field has a default, and may name an environment variable that overrides it
/// when [`Configuration::configure`] runs. Without a parse function the variable's value
/// is converted with `Into`, otherwise the function's `Ok` value is used and errors are
/// logged and ignored.
///
/// ```ignore
/// config::section! {
///     pub struct Store {
///         /// Storage directory
///         pub dir: PathBuf = "./data".into() => "BLOB_STORE_DIR",
///         pub line_mode: LineMode = LineMode::Joined => "BLOB_STORE_LINE_MODE" | config::util::parse,
///     }
/// }
/// ```
#[macro_export]
macro_rules! section {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {$(
            $(#[$field_meta:meta])*
            $field_vis:vis $field_name:ident : $field_ty:ty = $field_default:expr
                $(=> $field_env:literal $(| $func:path)?)?
        ),*$(,)?}

        $(impl Extra { $($extra:tt)+ })?
    ) => { $crate::paste::paste! {
        #[derive(Debug, Clone, $crate::serde::Serialize, $crate::serde::Deserialize)]
        $(#[$meta])*
        #[serde(default, deny_unknown_fields)]
        $vis struct $name {$(
            $(#[$field_meta])*
            $(
                #[doc = ""]
                #[doc = "**Environment override: `" $field_env "`**"]
            )?
            $field_vis $field_name: $field_ty,
        )*}

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                $name {$(
                    $field_name: $field_default,
                )*}
            }
        }

        impl $crate::ConfigExtra for $name {
            $($($extra)+)?
        }

        impl $crate::Configuration for $name {
            fn configure(&mut self) {
                $($(
                    if let Ok(value) = std::env::var($field_env) {
                        $crate::tracing::debug!("Applying environment override for {}.{} from {}", stringify!($name), stringify!($field_name), $field_env);
                        $crate::__env_override!(self.$field_name, $field_env, value $(, $func)?);
                    }
                )?)*

                $crate::ConfigExtra::configure(self);
            }
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __env_override {
    ($field:expr, $env:expr, $value:ident) => {
        $field = $value.into();
    };
    ($field:expr, $env:expr, $value:ident, $func:path) => {
        match $func(&$value) {
            Ok(parsed) => $field = parsed,
            Err(e) => $crate::tracing::warn!("Ignoring invalid value {:?} for {}: {}", $value, $env, e),
        }
    };
}

/// Groups sections into a top-level configuration, one table per field.
#[macro_export]
macro_rules! config {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {$(
            $(#[$field_meta:meta])*
            $field:ident: $field_ty:ty
        ),*$(,)?}
    ) => {
        $(#[$meta])*
        #[derive(Default, Debug, Clone, $crate::serde::Serialize, $crate::serde::Deserialize)]
        #[serde(default, deny_unknown_fields)]
        $vis struct $name {
            $($(#[$field_meta])* pub $field: $field_ty,)*
        }

        impl $crate::ConfigExtra for $name {}

        impl $crate::Configuration for $name {
            fn configure(&mut self) {
                $($crate::Configuration::configure(&mut self.$field);)*
            }
        }
    };
}

pub trait ConfigExtra: Configuration {
    fn configure(&mut self) {}
}

pub trait Configuration: serde::de::DeserializeOwned + serde::Serialize + Default {
    /// Applies any environmental overrides and adjustments
    fn configure(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// JSON for `.json` files, TOML for anything else.
    pub fn of(path: &Path) -> Format {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    IOError(#[from] io::Error),

    #[error("TOML Parse Error: {0}")]
    TomlDeError(#[from] toml::de::Error),
    #[error("TOML Format Error: {0}")]
    TomlSeError(#[from] toml::ser::Error),

    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Loads a configuration file, falling back to defaults if it does not exist.
///
/// The returned flag is `true` when defaults were used. Environment overrides are
/// not applied here, call [`Configuration::configure`] afterwards.
pub async fn load<C: Configuration>(path: impl AsRef<Path>) -> Result<(bool, C), ConfigError> {
    let path = path.as_ref();

    let file = match tokio::fs::read_to_string(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, using default config", path.display());

            return Ok((true, C::default()));
        }
        Err(e) => return Err(e.into()),
    };

    let config = match Format::of(path) {
        Format::Toml => toml::from_str(&file)?,
        Format::Json => serde_json::from_str(&file)?,
    };

    Ok((false, config))
}

pub async fn save<C: Configuration>(path: impl AsRef<Path>, config: &C) -> Result<(), ConfigError> {
    let path = path.as_ref();

    let file = match Format::of(path) {
        Format::Toml => toml::to_string_pretty(config)?,
        Format::Json => serde_json::to_string_pretty(config)?,
    };

    tokio::fs::write(path, file).await?;

    Ok(())
}
