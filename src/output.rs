//! Renderings of probe results for the command line.

use crate::pcstatus::PcStatus;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Terse,
    Json,
}

pub fn write<W: Write>(out: &mut W, format: Format, stats: &[PcStatus], header: bool) -> io::Result<()> {
    match format {
        Format::Table => write_table(out, stats, header),
        Format::Terse => write_terse(out, stats, header),
        Format::Json => write_json(out, stats),
    }
}

pub fn write_json<W: Write>(out: &mut W, stats: &[PcStatus]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)
}

pub fn write_terse<W: Write>(out: &mut W, stats: &[PcStatus], header: bool) -> io::Result<()> {
    if header {
        writeln!(out, "name,size,timestamp,mtime,pages,cached,percent")?;
    }
    for pcs in stats {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            pcs.name.display(),
            pcs.size,
            pcs.timestamp.map_or(0, |t| t.timestamp()),
            pcs.mtime.map_or(0, |t| t.timestamp()),
            pcs.pages,
            pcs.cached,
            pcs.percent
        )?;
    }
    Ok(())
}

pub fn write_table<W: Write>(out: &mut W, stats: &[PcStatus], header: bool) -> io::Result<()> {
    let name_width = stats
        .iter()
        .map(|pcs| pcs.name.display().to_string().chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let border = format!(
        "+{}+----------------+------------+-----------+---------+",
        "-".repeat(name_width + 2)
    );

    if header {
        writeln!(out, "{}", border)?;
        writeln!(
            out,
            "| {:<width$} | Size (bytes)   | Pages      | Cached    | Percent |",
            "Name",
            width = name_width
        )?;
        writeln!(out, "{}", border.replace('+', "|"))?;
    }
    for pcs in stats {
        writeln!(
            out,
            "| {:<width$} | {:<14} | {:<10} | {:<9} | {:07.3} |",
            pcs.name.display().to_string(),
            pcs.size,
            pcs.pages,
            pcs.cached,
            pcs.percent,
            width = name_width
        )?;
    }
    if header {
        writeln!(out, "{}", border)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PcStatus> {
        vec![PcStatus {
            name: "LICENSE".into(),
            size: 11323,
            pages: 3,
            cached: 3,
            uncached: 0,
            percent: 100.0,
            ..PcStatus::default()
        }]
    }

    fn render(format: Format, header: bool) -> String {
        let mut out = Vec::new();
        write(&mut out, format, &sample(), header).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table() {
        let expected = "\
+---------+----------------+------------+-----------+---------+
| Name    | Size (bytes)   | Pages      | Cached    | Percent |
|---------|----------------|------------|-----------|---------|
| LICENSE | 11323          | 3          | 3         | 100.000 |
+---------+----------------+------------+-----------+---------+
";
        assert_eq!(render(Format::Table, true), expected);
        assert_eq!(
            render(Format::Table, false),
            "| LICENSE | 11323          | 3          | 3         | 100.000 |\n"
        );
    }

    #[test]
    fn test_terse() {
        assert_eq!(
            render(Format::Terse, true),
            "name,size,timestamp,mtime,pages,cached,percent\nLICENSE,11323,0,0,3,3,100\n"
        );
    }

    #[test]
    fn test_json() {
        let value: serde_json::Value = serde_json::from_str(&render(Format::Json, true)).unwrap();
        assert_eq!(value[0]["filename"], "LICENSE");
        assert_eq!(value[0]["cached"], 3);
        assert_eq!(value[0]["percent"], 100.0);
    }
}
