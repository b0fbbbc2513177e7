use config::{Config, File, FileFormat};
use std::{env, path::Path};

const DEFAULT_SECURE_PROFILE_PATH: &str = "/etc/krb5.conf";
const DEFAULT_PROFILE_PATH: &str = DEFAULT_SECURE_PROFILE_PATH;

/// Ordered list of INI profile files; earlier files take precedence.
#[derive(Debug, Default)]
pub struct Profile {
    files: Vec<ProfileFile>,
}

macro_rules! get_value {
    ($fn:ident, $type:ident) => {
        pub fn $fn(&self, key: &str) -> Option<$type> {
            for file in &self.files {
                if let Ok(value) = file.config.$fn(key) {
                    return Some(value);
                }
            }
            None
        }
    };
}

impl Profile {
    /// Loads `KRB5_CONFIG` (or `/etc/krb5.conf`). Files that do not exist are
    /// skipped.
    pub fn new(secure: bool) -> anyhow::Result<Self> {
        let mut files = vec![];
        for file in Self::default_config_files(secure) {
            files.push(ProfileFile::new(&file, false)?);
        }
        Ok(Self { files })
    }

    /// Loads exactly the given files, all of which must exist.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Self> {
        let mut files = vec![];
        for path in paths {
            let path = path.as_ref().to_str().ok_or_else(|| {
                anyhow::anyhow!("Invalid profile path {}", path.as_ref().display())
            })?;
            files.push(ProfileFile::new(path, true)?);
        }
        Ok(Self { files })
    }

    fn default_config_files(secure: bool) -> Vec<String> {
        let filepath = if secure {
            DEFAULT_SECURE_PROFILE_PATH.to_owned()
        } else {
            env::var("KRB5_CONFIG").unwrap_or(DEFAULT_PROFILE_PATH.to_owned())
        };
        filepath
            .split(':')
            .filter(|f| !f.is_empty())
            .map(|f| f.to_owned())
            .collect()
    }

    get_value!(get_string, String);

    get_value!(get_bool, bool);
}

#[derive(Debug)]
struct ProfileFile {
    config: Config,
}

impl ProfileFile {
    fn new(filename: &str, required: bool) -> anyhow::Result<Self> {
        let expanded_filename = match (filename.starts_with("~/"), env::var("HOME")) {
            (true, Ok(home_env)) => format!("{}{}", home_env, &filename[1..]),
            _ => filename.to_owned(),
        };
        let config = Config::builder()
            .add_source(
                File::with_name(&expanded_filename)
                    .format(FileFormat::Ini)
                    .required(required),
            )
            .build()?;
        Ok(Self { config })
    }
}
