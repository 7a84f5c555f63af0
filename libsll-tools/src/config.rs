use crate::error::Error;
use std::io;

/// Key of the input file path (stdin when unset)
pub const OPT_INPUT: &str = "input";
/// Key of the output file path (stdout when unset)
pub const OPT_OUTPUT: &str = "output";

/// Converter configuration, backed by a TOML table.
///
/// Values are loaded from a file with [`Config::load_config`], then usually
/// overridden from the command line with [`Config::set`].
#[derive(Clone, Debug)]
pub struct Config {
    value: toml::Value,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            value: toml::Value::Table(toml::Table::new()),
        }
    }
}

impl Config {
    fn lookup<T: AsRef<str>>(&self, k: T) -> Option<&toml::Value> {
        let mut item = &self.value;
        for key in k.as_ref().split('.') {
            item = item.get(key)?;
        }
        Some(item)
    }

    /// Get an entry by path. If the input argument contains dots, the path is split
    /// into keys, each key being requested recursively.
    pub fn get<T: AsRef<str>>(&self, k: T) -> Option<&str> {
        self.lookup(k)?.as_str()
    }

    /// Get an entry of type integer by path
    pub fn get_usize<T: AsRef<str>>(&self, k: T) -> Option<usize> {
        self.lookup(k)?
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
    }

    /// Test if an entry is present, whatever its type
    pub fn is_set<T: AsRef<str>>(&self, k: T) -> bool {
        self.lookup(k).is_some()
    }

    /// Set a top-level entry, replacing any previous value
    pub fn set<T: Into<toml::Value>>(&mut self, k: &str, v: T) {
        if let toml::Value::Table(ref mut table) = self.value {
            table.insert(k.to_owned(), v.into());
        }
    }

    /// Load configuration from input object. If keys are already present, they are overwritten
    pub fn load_config<R: io::Read>(&mut self, mut config: R) -> Result<(), Error> {
        let mut s = String::new();
        config.read_to_string(&mut s).map_err(Error::ReadError)?;
        let table: toml::Table = toml::from_str(&s)?;
        for (k, v) in table {
            self.set(&k, v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_override() {
        let mut config = Config::default();
        assert!(!config.is_set(OPT_INPUT));
        let text = "input = \"in.pcap\"\nbuffer_initial_capacity = 4096\n[nested]\nkey = \"v\"\n";
        config.load_config(text.as_bytes()).unwrap();
        assert_eq!(config.get(OPT_INPUT), Some("in.pcap"));
        assert_eq!(config.get_usize("buffer_initial_capacity"), Some(4096));
        assert_eq!(config.get("nested.key"), Some("v"));

        config.set(OPT_INPUT, "other.pcap");
        assert_eq!(config.get(OPT_INPUT), Some("other.pcap"));
        assert!(!config.is_set(OPT_OUTPUT));
    }

    #[test]
    fn negative_integer_is_not_usize() {
        let mut config = Config::default();
        config.set("linktype", -1i64);
        assert!(config.is_set("linktype"));
        assert_eq!(config.get_usize("linktype"), None);
    }

    #[test]
    fn malformed_file() {
        let mut config = Config::default();
        let res = config.load_config("input = ".as_bytes());
        assert!(matches!(res, Err(Error::Configuration(_))));
    }
}
