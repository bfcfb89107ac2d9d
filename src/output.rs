use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{config::Config, error::Result, model::Calendar};

pub const FILE_NAME: &str = "calendar.ics";

/// `<output_dir>/<path_secret>/calendar.ics`
pub fn calendar_path(config: &Config) -> PathBuf {
    config.output_dir.join(&config.path_secret).join(FILE_NAME)
}

/// Replaces the calendar file. The document goes to a sibling temp file first, so the
/// old file stays intact if writing fails.
pub fn save_calendar(config: &Config, calendar: &Calendar) -> Result<PathBuf> {
    let path = calendar_path(config);
    write_atomically(&path, calendar.to_ics().as_bytes())?;
    Ok(path)
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let tmp = path.with_extension("ics.tmp");
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EMAIL_VAR, OUTPUT_DIR_VAR, PASSWORD_VAR, PATH_SECRET_VAR};

    fn config(dir: &Path) -> Config {
        let dir = dir.to_string_lossy().into_owned();
        Config::from_lookup(|key| match key {
            EMAIL_VAR => Some("a@b.c".to_string()),
            PASSWORD_VAR => Some("pw".to_string()),
            PATH_SECRET_VAR => Some("n0t-gu3ssable".to_string()),
            OUTPUT_DIR_VAR => Some(dir.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn path_is_namespaced_by_secret() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        assert_eq!(
            calendar_path(&config),
            tmp.path().join("n0t-gu3ssable").join("calendar.ics")
        );
    }

    #[test]
    fn creates_directories_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let path = calendar_path(&config);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();

        let saved = save_calendar(&config, &Calendar::default()).unwrap();
        assert_eq!(saved, path);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("BEGIN:VCALENDAR"));
        assert!(!contents.contains("stale"));
        assert!(!path.with_extension("ics.tmp").exists());
    }
}
