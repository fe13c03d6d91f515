use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use atty::Stream;
use flate2::write::GzEncoder;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Value x count pairs, highest counts first, squeezed to `upper` leading and `bottom`
/// trailing entries when the map is larger than that.
pub fn distro_format<T>(map: &HashMap<T, usize>, upper: usize, bottom: usize) -> String
	where T: std::fmt::Display + std::clone::Clone + Ord
{
	let mut vec: Vec<(usize, T)> = map.iter().map(|(k, v)| (*v, k.clone())).collect();
	// ties broken on the value for predictable output
	vec.sort_by(|x, y| y.0.cmp(&x.0).then_with(|| x.1.cmp(&y.1)));

	let mut msg = String::with_capacity(16);
	if upper + bottom >= vec.len() {
		for (c, v) in &vec {
			msg.push_str(&format!("({} x {})", v, c));
		}
	} else {
		for (c, v) in &vec[..upper] {
			msg.push_str(&format!("({} x {})", v, c));
		}
		msg.push_str(&format!("..{}..", vec.len() - (bottom + upper)));
		for (c, v) in &vec[vec.len() - bottom..] {
			msg.push_str(&format!("({} x {})", v, c));
		}
	}
	msg
}

#[test]
fn test_distro_format() {
	let mut v: HashMap<&str, usize> = HashMap::new();
	v.insert("arts", 10);
	v.insert("uniformed", 111);
	v.insert("commerce", 11);
	v.insert("health", 5);

	assert_eq!(distro_format(&v, 0, 0), "..4..");
	assert_eq!(distro_format(&v, 1, 1), "(uniformed x 111)..2..(health x 5)");
	assert_eq!(distro_format(&v, 2, 2), "(uniformed x 111)(commerce x 11)(arts x 10)(health x 5)");

	let mut tie: HashMap<&str, usize> = HashMap::new();
	tie.insert("technical", 25);
	tie.insert("arts", 25);
	tie.insert("fine_arts", 25);
	assert_eq!(distro_format(&tie, 5, 2), "(arts x 25)(fine_arts x 25)(technical x 25)");
}

fn mem_metric<'a>(v: usize) -> (f64, &'a str) {
	const METRIC: [&str; 8] = ["B ", "KB", "MB", "GB", "TB", "PB", "EB", "ZB"];

	let mut size = 1usize << 10;
	for m in METRIC.iter() {
		if v < size {
			return (v as f64 / (size >> 10) as f64, *m);
		}
		size <<= 10;
	}
	(v as f64, "")
}

/// keep only a few significant digits of a simple float value
fn sig_dig(v: f64, digits: usize) -> String {
	let x = format!("{}", v);
	let mut d = String::new();
	let mut count = 0;
	let mut found_pt = false;
	for c in x.chars() {
		if c != '.' {
			count += 1;
		} else {
			if count >= digits { break; }
			found_pt = true;
		}

		d.push(c);

		if count >= digits && found_pt { break; }
	}
	d
}

pub fn mem_metric_digit(v: usize, sig: usize) -> String {
	if v == 0 || v > std::usize::MAX / 2 {
		return format!("{:>width$}", "unknown", width = sig + 3);
	}
	let vt = mem_metric(v);
	format!("{:>width$} {}", sig_dig(vt.0, sig), vt.1, width = sig + 1)
}

#[test]
fn test_mem_metric_digit() {
	for t in &[(0, "unknown"),
		(1, "    1 B "),
		(1024, "    1 KB"),
		(2524, "2.464 KB"),
		(15050, "14.69 KB"),
		(1024 * 1023, " 1023 KB"),
		(11usize << 40, "   11 TB")] {
		assert_eq!(mem_metric_digit(t.0, 4), t.1, "mem_metric_digit for {}", t.0);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// pick from the file extension
	Auto,
	None,
	Gzip,
	Zstd,
}

impl FromStr for Compression {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"auto" => Ok(Compression::Auto),
			"none" => Ok(Compression::None),
			"gz" | "gzip" => Ok(Compression::Gzip),
			"zst" | "zstd" => Ok(Compression::Zstd),
			_ => Err(format!("compression \"{}\" not understood - use auto, none, gzip or zstd", s)),
		}
	}
}

impl Compression {
	/// Resolves `Auto` against the destination; stdout is never guessed compressed.
	pub fn resolve(self, path: Option<&Path>) -> Compression {
		match self {
			Compression::Auto => match path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
				Some("gz") => Compression::Gzip,
				Some("zst") | Some("zstd") => Compression::Zstd,
				_ => Compression::None,
			},
			c => c,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
	File(PathBuf),
	Stdout,
}

impl std::fmt::Display for OutputTarget {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputTarget::File(p) => write!(f, "{}", p.display()),
			OutputTarget::Stdout => write!(f, "<stdout>"),
		}
	}
}

enum SinkInner<W: Write> {
	Plain(BufWriter<W>),
	Gzip(GzEncoder<BufWriter<W>>),
	Zstd(zstd::Encoder<'static, BufWriter<W>>),
}

impl<W: Write> SinkInner<W> {
	fn new(w: W, compression: Compression) -> io::Result<SinkInner<W>> {
		let buffered = BufWriter::new(w);
		Ok(match compression {
			Compression::Gzip => SinkInner::Gzip(GzEncoder::new(buffered, flate2::Compression::default())),
			Compression::Zstd => SinkInner::Zstd(zstd::Encoder::new(buffered, 0)?),
			Compression::Auto | Compression::None => SinkInner::Plain(buffered),
		})
	}

	fn writer(&mut self) -> &mut dyn Write {
		match self {
			SinkInner::Plain(w) => w,
			SinkInner::Gzip(w) => w,
			SinkInner::Zstd(w) => w,
		}
	}

	fn finish(self) -> io::Result<()> {
		let mut buffered = match self {
			SinkInner::Plain(w) => w,
			SinkInner::Gzip(w) => w.finish()?,
			SinkInner::Zstd(w) => w.finish()?,
		};
		buffered.flush()
	}
}

enum SinkKind {
	File(SinkInner<File>),
	Stdout(SinkInner<Stdout>),
}

/// Where generated rows go. The file, if any, is closed when the sink is dropped, but
/// only `finish` reports errors from the final flush and compression trailer.
pub struct OutputSink {
	kind: SinkKind,
	target: OutputTarget,
	compression: Compression,
	bytes: usize,
}

impl OutputSink {
	/// Opens the target, truncating an existing file.
	pub fn create(target: &OutputTarget, compression: Compression) -> Result<OutputSink> {
		let (kind, compression) = match target {
			OutputTarget::File(path) => {
				let compression = compression.resolve(Some(path.as_path()));
				let file = File::create(path)
					.map_err(|err| format!("cannot create output file \"{}\", cause: {}", path.display(), err))?;
				(SinkKind::File(SinkInner::new(file, compression)?), compression)
			}
			OutputTarget::Stdout => {
				let compression = compression.resolve(None);
				if compression != Compression::None && atty::is(Stream::Stdout) {
					Err("refusing to write compressed output to a terminal")?;
				}
				(SinkKind::Stdout(SinkInner::new(io::stdout(), compression)?), compression)
			}
		};
		Ok(OutputSink {
			kind,
			target: target.clone(),
			compression,
			bytes: 0,
		})
	}

	pub fn compression(&self) -> Compression {
		self.compression
	}

	/// Flushes buffers and writes any compression trailer. Returns the uncompressed
	/// byte count.
	pub fn finish(self) -> Result<usize> {
		let target = self.target;
		let res = match self.kind {
			SinkKind::File(inner) => inner.finish(),
			SinkKind::Stdout(inner) => inner.finish(),
		};
		res.map_err(|err| format!("error finishing output to {}, cause: {}", target, err))?;
		Ok(self.bytes)
	}

	fn writer(&mut self) -> &mut dyn Write {
		match &mut self.kind {
			SinkKind::File(inner) => inner.writer(),
			SinkKind::Stdout(inner) => inner.writer(),
		}
	}
}

impl Write for OutputSink {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let n = self.writer().write(buf)?;
		self.bytes += n;
		Ok(n)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.writer().flush()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Read;

	#[test]
	fn test_compression_resolve() {
		let auto = Compression::Auto;
		assert_eq!(auto.resolve(Some(Path::new("jobs.sql.gz"))), Compression::Gzip);
		assert_eq!(auto.resolve(Some(Path::new("jobs.zst"))), Compression::Zstd);
		assert_eq!(auto.resolve(Some(Path::new("generated_sql_jobs.txt"))), Compression::None);
		assert_eq!(auto.resolve(None), Compression::None);
		assert_eq!(Compression::Gzip.resolve(Some(Path::new("x.txt"))), Compression::Gzip);
		assert!("lz4".parse::<Compression>().is_err());
	}

	#[test]
	fn test_sink_plain_truncates() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("out.txt");
		std::fs::write(&path, "stale content that is longer than what comes next\n")?;

		let target = OutputTarget::File(path.clone());
		let mut sink = OutputSink::create(&target, Compression::Auto)?;
		sink.write_all(b"fresh\n")?;
		assert_eq!(sink.finish()?, 6);
		assert_eq!(std::fs::read_to_string(&path)?, "fresh\n");
		Ok(())
	}

	#[test]
	fn test_sink_gzip_and_zstd() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let payload = b"INSERT INTO job VALUES(1, \"a\", \"b\", \"c\");\n";

		let gz = dir.path().join("out.txt.gz");
		let mut sink = OutputSink::create(&OutputTarget::File(gz.clone()), Compression::Auto)?;
		assert_eq!(sink.compression(), Compression::Gzip);
		sink.write_all(payload)?;
		sink.finish()?;
		let mut back = Vec::new();
		flate2::read::GzDecoder::new(File::open(&gz)?).read_to_end(&mut back)?;
		assert_eq!(&back[..], &payload[..]);

		let zs = dir.path().join("out.txt.zst");
		let mut sink = OutputSink::create(&OutputTarget::File(zs.clone()), Compression::Auto)?;
		assert_eq!(sink.compression(), Compression::Zstd);
		sink.write_all(payload)?;
		sink.finish()?;
		let back = zstd::decode_all(File::open(&zs)?)?;
		assert_eq!(&back[..], &payload[..]);
		Ok(())
	}

	#[test]
	fn test_sink_bad_path() {
		let target = OutputTarget::File(PathBuf::from("/no/such/dir/generated_sql_jobs.txt"));
		match OutputSink::create(&target, Compression::None) {
			Ok(_) => panic!("expected failure creating file in a missing directory"),
			Err(err) => assert!(err.to_string().contains("/no/such/dir/generated_sql_jobs.txt")),
		}
	}
}
