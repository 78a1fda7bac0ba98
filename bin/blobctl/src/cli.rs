use std::path::PathBuf;

/// Inspect and edit a blob store directory
#[derive(Debug, argh::FromArgs)]
pub struct CliOptions {
    /// print version information and exit
    #[argh(switch, short = 'V')]
    pub version: bool,

    /// logging level (0 = Info, 1 = Debug, 2 = Trace) [env BLOBCTL_VERBOSE]
    #[argh(option, short = 'v')]
    pub verbose: Option<u8>,

    /// path to the TOML or JSON config file
    #[argh(option, short = 'c', default = "crate::config::default_path()")]
    pub config: PathBuf,

    #[argh(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, argh::FromArgs)]
#[argh(subcommand)]
pub enum Command {
    Put(PutCommand),
    Get(GetCommand),
    Rm(RmCommand),
    Ls(LsCommand),
    WriteConfig(WriteConfigCommand),
}

/// store a value under a name, replacing anything already there
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "put")]
pub struct PutCommand {
    /// file name inside the storage directory
    #[argh(positional)]
    pub name: String,

    /// value to store, read from stdin when omitted
    #[argh(positional)]
    pub value: Option<String>,
}

/// print the value stored under a name
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "get")]
pub struct GetCommand {
    /// file name inside the storage directory
    #[argh(positional)]
    pub name: String,

    /// keep line breaks regardless of the configured line mode
    #[argh(switch)]
    pub verbatim: bool,
}

/// delete the value stored under a name
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "rm")]
pub struct RmCommand {
    /// file name inside the storage directory
    #[argh(positional)]
    pub name: String,
}

/// list stored names
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "ls")]
pub struct LsCommand {}

/// write the effective configuration to the config path
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "write-config")]
pub struct WriteConfigCommand {}

impl CliOptions {
    pub fn parse() -> Result<Self, anyhow::Error> {
        let mut args: CliOptions = argh::from_env();

        if args.version {
            println!("blobctl {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }

        if args.verbose.is_none() {
            if let Ok(verbose) = std::env::var("BLOBCTL_VERBOSE") {
                args.verbose = verbose.parse().ok();
            }
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use argh::FromArgs;

    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::from_args(&["blobctl"], args).unwrap()
    }

    #[test]
    fn test_put_with_value() {
        let args = parse(&["-v", "2", "put", "profile.json", "{\"id\":1}"]);

        assert_eq!(args.verbose, Some(2));
        assert_eq!(args.config, PathBuf::from("./blobctl.toml"));

        match args.command {
            Some(Command::Put(put)) => {
                assert_eq!(put.name, "profile.json");
                assert_eq!(put.value.as_deref(), Some("{\"id\":1}"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_get_verbatim() {
        let args = parse(&["-c", "other.json", "get", "a.txt", "--verbatim"]);

        assert_eq!(args.config, PathBuf::from("other.json"));
        assert!(matches!(args.command, Some(Command::Get(GetCommand { verbatim: true, .. }))));
    }

    #[test]
    fn test_no_command() {
        assert!(parse(&[]).command.is_none());
    }
}
