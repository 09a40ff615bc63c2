use std::io::Write;
use std::path::Path;

use chrono::DateTime;
use tarfs_core::{Entry, EntryKind};

use crate::{Error, Options, Session, TarFs};

const COPY_BUFFER: usize = 8192;

/// Print the members of an archive to `out`, one per line. With `long`, each
/// line carries the type and permissions, owner, size, mtime and link target
/// the way `ls -l` does. Times are shown in UTC, so listings do not depend on
/// the local time zone.
pub fn list<W: Write>(archive_path: &str, long: bool, options: Options, out: &mut W) -> Result<(), Error> {
    let session = Session::open(archive_path, options)?;
    let path = Path::new(archive_path);

    for entry in session.index() {
        let line = if long {
            long_line(entry)
        } else {
            entry.path().to_string()
        };
        writeln!(out, "{}", line).map_err(wrap_io_err!(path, "Writing listing"))?;
    }

    Ok(())
}

/// Copy each of `paths`, opened through a [`TarFs`] with `archive_path`
/// loaded, to `out`
pub fn cat<W: Write>(archive_path: &str, paths: &[&str], options: Options, out: &mut W) -> Result<(), Error> {
    let mut fs = TarFs::new(options);
    fs.init_from_file(archive_path)?;

    let mut buf = vec![0; COPY_BUFFER];
    for path in paths {
        let mut file = fs.open(path)?;
        loop {
            let count = file.read(&mut buf, 1, COPY_BUFFER)?;
            if count == 0 {
                break;
            }
            out.write_all(&buf[..count])
                .map_err(wrap_io_err!(Path::new(path), "Copying file"))?;
        }
        file.close()?;
    }

    Ok(())
}

fn long_line(entry: &Entry) -> String {
    let (owner, group) = match entry.ustar() {
        Some(ustar) if !ustar.user_name.is_empty() => (ustar.user_name.clone(), ustar.group_name.clone()),
        _ => (entry.uid().to_string(), entry.gid().to_string()),
    };

    let size = match entry.ustar() {
        Some(ustar) if entry.kind().is_device() => format!("{},{}", ustar.dev_major, ustar.dev_minor),
        _ => entry.size().to_string(),
    };

    let mtime = i64::try_from(entry.mtime())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| entry.mtime().to_string());

    let link = match entry.kind() {
        EntryKind::HardLink => format!(" link to {}", entry.link_name()),
        EntryKind::Symlink => format!(" -> {}", entry.link_name()),
        _ => String::new(),
    };

    format!(
        "{}{} {}/{} {:>10} {} {}{}",
        entry.kind().as_char(),
        entry.mode(),
        owner,
        group,
        size,
        mtime,
        entry.path(),
        link
    )
}
