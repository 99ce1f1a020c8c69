use std::path::PathBuf;
use structopt::StructOpt;

/// Configuration for common systems
#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    /// Sets the log level for the logger
    /// The levels correspond to the following:
    ///
    ///   0 - Warn
    ///   1 - Info
    ///   2 - Debug
    ///   3 - Trace
    #[structopt(long, default_value = "1")]
    pub log_level: u8,

    /// Sets the data directory to be used
    /// If unset, the default data directory is used
    #[structopt(long)]
    pub data_directory: Option<PathBuf>,
}

impl Config {
    /// The data directory given on the command line, or the per-user default
    pub fn data_directory(&self) -> Option<PathBuf> {
        match &self.data_directory {
            Some(custom_data_directory) => Some(custom_data_directory.clone()),
            None => directories::ProjectDirs::from("org", "CryptoNote", "RingCT")
                .map(|dirs| dirs.data_dir().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_arguments() {
        let config = Config::from_iter(&["test", "--log-level", "2", "--data-directory", "/tmp/x"]);
        assert_eq!(config.log_level, 2);
        assert_eq!(config.data_directory(), Some(PathBuf::from("/tmp/x")));

        let config = Config::from_iter(&["test"]);
        assert_eq!(config.log_level, 1);
        assert!(config.data_directory.is_none());
    }
}
