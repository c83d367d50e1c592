//! Archive member metadata.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;

/// Display format for member timestamps, e.g. `Tue, 01 Aug 2023 12:00:00 UTC`.
pub const MTIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// Type of a member stored in an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link, device, FIFO or any other special entry.
    Other,
}

impl MemberType {
    /// Returns `true` if this member can be written to disk on extraction.
    #[must_use]
    pub const fn is_extractable(self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }

    /// Returns a short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of one archive entry.
///
/// Members are built fresh on every listing call; they do not track later
/// changes to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Relative path of the entry inside the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored size in bytes, when the format records it per entry.
    pub compressed_size: Option<u64>,
    /// Last modification time, when the format records it.
    pub modified: Option<DateTime<Utc>>,
    /// Entry type.
    pub member_type: MemberType,
}

impl Member {
    /// Returns the modification time formatted with [`MTIME_FORMAT`], or `-`
    /// when unknown.
    #[must_use]
    pub fn mtime_display(&self) -> String {
        self.modified
            .map_or_else(|| "-".to_string(), |t| t.format(MTIME_FORMAT).to_string())
    }
}

/// Renders members as a grid table with name, modification time, size and
/// type columns.
///
/// ```text
/// +----------+-------------------------------+------+------+
/// | Name     | Modified                      | Size | Type |
/// +==========+===============================+======+======+
/// | file.txt | Tue, 01 Aug 2023 12:00:00 UTC | 12   | file |
/// +----------+-------------------------------+------+------+
/// ```
#[must_use]
pub fn render_table(members: &[Member]) -> String {
    const HEADERS: [&str; 4] = ["Name", "Modified", "Size", "Type"];

    let rows: Vec<[String; 4]> = members
        .iter()
        .map(|m| {
            [
                m.name.clone(),
                m.mtime_display(),
                m.size.to_string(),
                m.member_type.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |fill: char| {
        let mut line = String::from("+");
        for width in widths {
            line.extend(std::iter::repeat_n(fill, width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let line = |cells: [&str; 4]| {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(widths) {
            let pad = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.extend(std::iter::repeat_n(' ', pad + 1));
            line.push('|');
        }
        line.push('\n');
        line
    };

    let mut out = rule('-');
    out.push_str(&line(HEADERS));
    out.push_str(&rule('='));
    for row in &rows {
        out.push_str(&line([&row[0], &row[1], &row[2], &row[3]]));
        out.push_str(&rule('-'));
    }
    out
}
