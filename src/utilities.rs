//! File-system and time helpers used when writing configurations.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use jiff::SignedDuration;
use jiff::civil::{Date, DateTime, Time};

use crate::error::{Error, Result};

/// Replace a leading `~` with the home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Make sure `directory` exists and return it.
///
/// A path naming an existing file resolves to that file's parent.
pub fn ensure_directory(directory: &Path) -> Result<PathBuf> {
    let mut directory = expand_user(directory);
    if directory.is_file()
        && let Some(parent) = directory.parent()
    {
        directory = parent.to_path_buf();
    }
    if !directory.as_os_str().is_empty() && !directory.exists() {
        fs::create_dir_all(&directory)?;
    }
    Ok(directory)
}

/// What [`create_symlink`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,

    /// The link could not be created, so the source was copied instead.
    Copied { reason: String },
}

/// Point `link` at `source`, replacing an existing symlink at `link`.
///
/// With `relative`, the link target is written relative to the link's
/// directory when `source` lives under it. If the platform refuses the
/// link, `source` is copied to `link` and a warning is logged.
pub fn create_symlink(source: &Path, link: &Path, relative: bool) -> Result<LinkOutcome> {
    if fs::symlink_metadata(link).is_ok_and(|metadata| metadata.file_type().is_symlink()) {
        tracing::debug!("removing symlink \"{}\"", link.display());
        fs::remove_file(link)?;
    }

    let link_directory = match link.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::path::absolute(parent)?,
        _ => env::current_dir()?,
    };
    let absolute_source = std::path::absolute(source)?;
    let target = if relative {
        match absolute_source.strip_prefix(&link_directory) {
            Ok(path) => path.to_path_buf(),
            Err(error) => {
                tracing::warn!(
                    "linking \"{}\" by absolute path: {error}",
                    absolute_source.display()
                );
                absolute_source.clone()
            }
        }
    } else {
        absolute_source.clone()
    };

    match symlink(&target, link) {
        Ok(()) => Ok(LinkOutcome::Linked),
        Err(error) => {
            tracing::warn!("could not create symbolic link: {error}");
            fs::copy(&absolute_source, link)?;
            Ok(LinkOutcome::Copied {
                reason: error.to_string(),
            })
        }
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Parse a civil datetime.
///
/// Accepts ISO 8601 (`2012-10-27T00:00:00`), `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, and the same forms with a compact
/// `YYYYMMDD` date.
pub fn parse_datetime(value: &str) -> Result<DateTime> {
    let value = value.trim();
    if let Ok(datetime) = value.parse::<DateTime>() {
        return Ok(datetime);
    }

    let (date, time) = match value.split_once(char::is_whitespace) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (value, None),
    };
    let date = if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    };
    let invalid = || Error::InvalidDatetime(value.to_string());

    let Some(time) = time else {
        let date = Date::strptime("%Y-%m-%d", &date).map_err(|_| invalid())?;
        return Ok(date.to_datetime(Time::midnight()));
    };
    let time = if time.matches(':').count() == 1 {
        format!("{time}:00")
    } else {
        time.to_string()
    };
    DateTime::strptime("%Y-%m-%d %H:%M:%S", format!("{date} {time}")).map_err(|_| invalid())
}

/// Parse a duration such as `56h`, `1h 30m` or `PT56H`.
pub fn parse_duration(value: &str) -> Result<SignedDuration> {
    value
        .trim()
        .parse::<SignedDuration>()
        .map_err(|_| Error::InvalidDuration(value.to_string()))
}

/// Whole hours in `duration`, ties to even.
pub fn whole_hours(duration: SignedDuration) -> i64 {
    round_half_even(duration.as_nanos(), 3_600_000_000_000)
}

/// Whole seconds in `duration`, ties to even.
pub fn whole_seconds(duration: SignedDuration) -> i64 {
    round_half_even(duration.as_nanos(), 1_000_000_000)
}

/// `nanos / unit` rounded to the nearest integer, ties to even.
fn round_half_even(nanos: i128, unit: i128) -> i64 {
    let quotient = nanos.div_euclid(unit);
    let twice_remainder = 2 * nanos.rem_euclid(unit);
    let rounded = if twice_remainder > unit || (twice_remainder == unit && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;
    use tempfile::TempDir;

    #[test]
    fn parses_supported_datetime_formats() {
        let expected = date(2012, 10, 27).at(6, 30, 0, 0);
        for value in [
            "2012-10-27T06:30:00",
            "2012-10-27 06:30:00",
            "2012-10-27 06:30",
            "20121027 06:30:00",
            "20121027 06:30",
        ] {
            assert_eq!(parse_datetime(value).unwrap(), expected, "{value}");
        }
    }

    #[test]
    fn date_only_is_midnight() {
        let expected = date(2020, 6, 1).at(0, 0, 0, 0);
        assert_eq!(parse_datetime("2020-06-01").unwrap(), expected);
        assert_eq!(parse_datetime("20200601").unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_datetime() {
        let err = parse_datetime("27/10/2012").unwrap_err();
        assert!(matches!(err, Error::InvalidDatetime(s) if s == "27/10/2012"));
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("56h").unwrap(), SignedDuration::from_hours(56));
        assert_eq!(parse_duration("PT1H30M").unwrap(), SignedDuration::from_mins(90));
        assert!(matches!(
            parse_duration("a while"),
            Err(Error::InvalidDuration(_))
        ));
    }

    #[test]
    fn hours_round_half_to_even() {
        assert_eq!(whole_hours(SignedDuration::from_hours(56)), 56);
        assert_eq!(whole_hours(SignedDuration::from_mins(89)), 1);
        assert_eq!(whole_hours(SignedDuration::from_mins(90)), 2);
        assert_eq!(whole_hours(SignedDuration::from_mins(150)), 2);
        assert_eq!(whole_hours(SignedDuration::from_mins(151)), 3);
        assert_eq!(whole_hours(SignedDuration::from_mins(210)), 4);
        assert_eq!(whole_hours(SignedDuration::from_mins(30)), 0);
    }

    #[test]
    fn seconds_round_half_to_even() {
        assert_eq!(whole_seconds(SignedDuration::from_millis(1_800_500)), 1800);
        assert_eq!(whole_seconds(SignedDuration::from_millis(1_801_500)), 1802);
        assert_eq!(whole_seconds(SignedDuration::from_millis(1_800_501)), 1801);
        assert_eq!(whole_seconds(SignedDuration::from_secs(3600)), 3600);
    }

    #[test]
    fn ensure_directory_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let ensured = ensure_directory(&nested).unwrap();
        assert_eq!(ensured, nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_directory_of_file_is_its_parent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nems.configure");
        fs::write(&file, "").unwrap();

        assert_eq!(ensure_directory(&file).unwrap(), dir.path());
    }

    #[test]
    fn expand_user_leaves_other_paths_alone() {
        assert_eq!(expand_user(Path::new("out/run")), Path::new("out/run"));
    }

    #[cfg(unix)]
    #[test]
    fn relative_symlink_points_at_file_name() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("model_configure");
        let link = dir.path().join("atm_namelist.rc");
        fs::write(&source, "total_member: 1\n").unwrap();

        let outcome = create_symlink(&source, &link, true).unwrap();

        assert_eq!(outcome, LinkOutcome::Linked);
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("model_configure"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "total_member: 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn existing_symlink_is_replaced() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let link = dir.path().join("link");
        fs::write(&first, "1").unwrap();
        fs::write(&second, "2").unwrap();

        create_symlink(&first, &link, false).unwrap();
        create_symlink(&second, &link, false).unwrap();

        assert_eq!(fs::read_to_string(&link).unwrap(), "2");
    }

    #[test]
    fn blocked_link_falls_back_to_copy() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("model_configure");
        let link = dir.path().join("atm_namelist.rc");
        fs::write(&source, "new").unwrap();
        // A regular file in the way makes the link fail.
        fs::write(&link, "old").unwrap();

        let outcome = create_symlink(&source, &link, true).unwrap();

        assert!(matches!(outcome, LinkOutcome::Copied { .. }));
        assert_eq!(fs::read_to_string(&link).unwrap(), "new");
    }
}
