use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use blob_store::{FileStore, LineMode};
use tokio::io::AsyncReadExt;

use crate::cli::Command;
use crate::config::{self, LocalConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The named file does not exist.
    Missing,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Missing => ExitCode::from(1),
        }
    }
}

pub async fn run(
    command: Command,
    config_path: &Path,
    config: &LocalConfig,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let store = config.store.open();

    log::debug!("Using storage directory: {}", store.root().display());

    Ok(match command {
        Command::Put(put) => {
            let value = match put.value {
                Some(value) => value,
                None => {
                    let mut value = String::new();
                    tokio::io::stdin().read_to_string(&mut value).await?;
                    value
                }
            };

            let len = value.len();
            store.write_async(put.name.as_str(), value).await?;

            log::info!("Stored {len} bytes as {}", put.name);
            Outcome::Done
        }
        Command::Get(get) => {
            let store = match get.verbatim {
                false => store,
                true => FileStore::builder(store.root())
                    .line_mode(LineMode::Verbatim)
                    .write_strategy(store.write_strategy())
                    .build(),
            };

            match store.read_async(get.name.as_str()).await? {
                Some(value) => {
                    writeln!(out, "{value}")?;
                    Outcome::Done
                }
                None => {
                    log::warn!("Nothing stored as {}", get.name);
                    Outcome::Missing
                }
            }
        }
        Command::Rm(rm) => match store.remove_async(rm.name.as_str()).await? {
            true => {
                log::info!("Removed {}", rm.name);
                Outcome::Done
            }
            false => {
                log::warn!("Nothing stored as {}", rm.name);
                Outcome::Missing
            }
        },
        Command::Ls(_) => {
            for name in store.list_async().await? {
                writeln!(out, "{name}")?;
            }

            Outcome::Done
        }
        Command::WriteConfig(_) => {
            config::save(config_path, config).await?;
            Outcome::Done
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{GetCommand, LsCommand, PutCommand, RmCommand, WriteConfigCommand};

    struct Harness {
        dir: tempfile::TempDir,
        config: LocalConfig,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();

            let mut config = LocalConfig::default();
            config.store.dir = dir.path().join("data");

            Harness { dir, config }
        }

        async fn run(&self, command: Command) -> (Outcome, String) {
            let mut out = Vec::new();
            let config_path = self.dir.path().join("blobctl.toml");

            let outcome = run(command, &config_path, &self.config, &mut out).await.unwrap();

            (outcome, String::from_utf8(out).unwrap())
        }
    }

    fn put(name: &str, value: &str) -> Command {
        Command::Put(PutCommand {
            name: name.to_owned(),
            value: Some(value.to_owned()),
        })
    }

    fn get(name: &str, verbatim: bool) -> Command {
        Command::Get(GetCommand {
            name: name.to_owned(),
            verbatim,
        })
    }

    #[tokio::test]
    async fn test_put_get() {
        let h = Harness::new();

        assert_eq!(h.run(put("a.txt", "line1\nline2")).await, (Outcome::Done, String::new()));
        assert_eq!(h.run(get("a.txt", false)).await, (Outcome::Done, "line1line2\n".to_owned()));
        assert_eq!(h.run(get("a.txt", true)).await, (Outcome::Done, "line1\nline2\n".to_owned()));
    }

    #[tokio::test]
    async fn test_missing() {
        let h = Harness::new();

        assert_eq!(h.run(get("nope.json", false)).await.0, Outcome::Missing);
        assert_eq!(
            h.run(Command::Rm(RmCommand { name: "nope.json".to_owned() })).await.0,
            Outcome::Missing
        );
    }

    #[tokio::test]
    async fn test_ls_and_rm() {
        let h = Harness::new();

        h.run(put("b.json", "{}")).await;
        h.run(put("a.json", "{}")).await;

        assert_eq!(h.run(Command::Ls(LsCommand {})).await.1, "a.json\nb.json\n");

        let (outcome, _) = h.run(Command::Rm(RmCommand { name: "a.json".to_owned() })).await;
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(h.run(Command::Ls(LsCommand {})).await.1, "b.json\n");
    }

    #[tokio::test]
    async fn test_write_config() {
        let h = Harness::new();

        h.run(Command::WriteConfig(WriteConfigCommand {})).await;

        let (generated, loaded) = ::config::load::<LocalConfig>(h.dir.path().join("blobctl.toml")).await.unwrap();
        assert!(!generated);
        assert_eq!(loaded.store.dir, h.config.store.dir);
    }

    #[test]
    fn test_invalid_name_is_an_error() {
        let h = Harness::new();
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        let mut out = Vec::new();
        let res = rt.block_on(run(put("../escape", "x"), Path::new("unused.toml"), &h.config, &mut out));

        let err = res.unwrap_err();
        let store_err = err.downcast_ref::<blob_store::StoreError>().unwrap();
        assert_eq!(store_err.kind(), blob_store::ErrorKind::InvalidName);
    }
}
