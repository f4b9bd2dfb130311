use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Write};

/// Opens `input` for buffered reading. `stdin` reads from the console and
/// files ending in `.gz` are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = gar::reader("tests/pseudo/records.psl").unwrap();
/// assert_eq!(reader.lines().count(), 4);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Non-empty, non-comment lines of a text input
pub fn read_data_lines(input: &str) -> anyhow::Result<Vec<String>> {
    let mut lines = vec![];
    for line in reader(input)?.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_read_plain_and_gz() {
        let dir = tempdir().unwrap();

        let plain = dir.path().join("plain.tsv");
        {
            let mut file = File::create(&plain).unwrap();
            writeln!(file, "# header").unwrap();
            writeln!(file, "a\t1").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "b\t2").unwrap();
        }
        let lines = read_data_lines(plain.to_str().unwrap()).unwrap();
        assert_eq!(lines, vec!["a\t1".to_string(), "b\t2".to_string()]);

        let gz = dir.path().join("packed.tsv.gz");
        {
            let file = File::create(&gz).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            writeln!(encoder, "c\t3").unwrap();
            encoder.finish().unwrap();
        }
        let lines = read_data_lines(gz.to_str().unwrap()).unwrap();
        assert_eq!(lines, vec!["c\t3".to_string()]);
    }

    #[test]
    fn test_missing_file() {
        let res = reader("tests/no/such/file.txt");
        assert!(res.is_err());
        assert!(res.err().unwrap().to_string().contains("could not open"));
    }
}
