use std::path::{Path, PathBuf};

pub use ::config::ConfigError;

pub mod sections {
    use std::path::PathBuf;

    use blob_store::{FileStore, LineMode, WriteStrategy};

    config::section! {
        pub struct Store {
            /// Directory holding one file per stored name
            pub dir: PathBuf = "./data".into() => "BLOB_STORE_DIR",

            /// `joined` drops line breaks when reading, `verbatim` returns content unchanged
            pub line_mode: LineMode = LineMode::Joined => "BLOB_STORE_LINE_MODE" | config::util::parse,

            /// `replace` deletes and recreates files, `atomic` writes a temporary file and renames it
            pub write: WriteStrategy = WriteStrategy::Replace => "BLOB_STORE_WRITE" | config::util::parse,
        }
    }

    impl Store {
        pub fn open(&self) -> FileStore {
            FileStore::builder(&self.dir)
                .line_mode(self.line_mode)
                .write_strategy(self.write)
                .build()
        }
    }

    config::section! {
        pub struct Paths {
            /// Where to write logfiles to. Automatically rotated. Empty disables file logging.
            pub log_dir: PathBuf = PathBuf::new() => "BLOBCTL_LOG_DIR",
        }
    }

    impl Paths {
        pub fn log_dir(&self) -> Option<PathBuf> {
            config::util::non_empty(&self.log_dir)
        }
    }
}

config::config! {
    pub struct LocalConfig {
        /// Storage settings
        store: sections::Store,
        /// Filesystem paths
        paths: sections::Paths,
    }
}

/// Loads the config file and applies environment overrides.
pub async fn load(path: &Path) -> Result<(bool, LocalConfig), ConfigError> {
    log::info!("Loading config from: {}", path.display());

    let (generated, mut config) = ::config::load::<LocalConfig>(path).await?;

    log::info!("Applying environment overrides to configuration");
    ::config::Configuration::configure(&mut config);

    Ok((generated, config))
}

pub async fn save(path: &Path, config: &LocalConfig) -> Result<(), ConfigError> {
    log::info!("Saving config to: {}", path.display());

    ::config::save(path, config).await
}

pub fn default_path() -> PathBuf {
    PathBuf::from("./blobctl.toml")
}
