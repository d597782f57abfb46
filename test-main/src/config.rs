use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use serde::{Serialize, Deserialize};

const CONFIG_FILE_VAR: &str = "PILCD_CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// BSC controller the backpack is wired to.
    pub bsc: u8,
    pub address: u8,
    pub width: u8,
    pub lines: u8,
    pub clock_hz: u32,
}

impl Config {
    fn path() -> std::path::PathBuf {
        let config_str = var_os(CONFIG_FILE_VAR);
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new(DEFAULT_CONFIG_FILE));
        Path::new(config_str).to_path_buf()
    }

    pub fn try_load() -> Option<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(config_path: &Path) -> Option<Self> {
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bsc: 1,
            address: 0x27,
            width: 16,
            lines: 2,
            clock_hz: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{ "address": 63, "width": 20 }"#).unwrap();
        assert_eq!(config.address, 0x3F);
        assert_eq!(config.width, 20);
        assert_eq!(config.lines, 2);
        assert_eq!(config.bsc, 1);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("pilcd-config-{}.json", std::process::id()));
        let config = Config { lines: 4, width: 20, ..Config::default() };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, Some(config));
    }

    #[test]
    fn load_missing_file() {
        assert_eq!(Config::load_from(Path::new("/nonexistent/pilcd.json")), None);
    }
}
