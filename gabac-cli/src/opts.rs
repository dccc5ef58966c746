use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use atty::Stream;
use log::info;

#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let input_path = Path::new(path);
    if !input_path.is_file() {
        return Err(format!("`{}` is not a file", path));
    }

    Ok(InputFile {
        path: input_path.to_path_buf(),
    })
}

impl InputFile {
    pub fn as_reader(&self) -> anyhow::Result<InputReader> {
        InputReader::from_path(&self.path)
    }
}

pub fn input_stream(path: &str) -> Result<InputStream, String> {
    Ok(InputStream {
        path: PathBuf::from(path),
    })
}

#[derive(Debug, Clone)]
pub struct InputStream {
    path: PathBuf,
}

impl Display for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self {
            path: PathBuf::from("-"),
        }
    }
}

impl InputStream {
    pub fn as_reader(&self) -> anyhow::Result<InputReader> {
        InputReader::from_path(&self.path)
    }
}

#[derive(Debug)]
pub enum InputReader {
    Stdin(io::Stdin),
    File { file: File, path: PathBuf },
}

impl InputReader {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let is_stdin = path.to_string_lossy() == "-";

        let val = if is_stdin {
            Self::Stdin(io::stdin())
        } else {
            let file = File::open(path)?;

            Self::File {
                file,
                path: path.to_owned(),
            }
        };
        Ok(val)
    }

    /// Size of the input in bytes, if known up front.
    pub fn length(&self) -> anyhow::Result<Option<u64>> {
        let val = match self {
            InputReader::Stdin(_) => None,
            InputReader::File { file, .. } => Some(file.metadata()?.len()),
        };
        Ok(val)
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            InputReader::Stdin(_) => None,
            InputReader::File { path, .. } => Some(path),
        }
    }

    #[must_use]
    pub fn into_read(self) -> Box<dyn Read + Send> {
        match self {
            InputReader::Stdin(stdin) => Box::new(stdin),
            InputReader::File { file, .. } => Box::new(file),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Binary,
}

#[derive(Debug)]
pub enum OutputWriter {
    Stdout(io::Stdout),
    File(File),
}

impl OutputWriter {
    /// Opens `output`, or when it is not given, a file next to the input
    /// with `new_extension` (standard output for standard input).
    pub fn from_path_and_input(
        output: &Option<PathBuf>,
        input: Option<&InputReader>,
        new_extension: &str,
        mode: OutputMode,
    ) -> anyhow::Result<Self> {
        if let Some(path) = output {
            Self::from_path(path, mode)
        } else {
            let path = input
                .and_then(InputReader::file_path)
                .map(|path| path.with_extension(new_extension))
                .unwrap_or_else(|| PathBuf::from("-"));

            Self::from_path(&path, mode)
        }
    }

    fn from_path(path: &Path, mode: OutputMode) -> anyhow::Result<Self> {
        let is_stdout = path.to_string_lossy() == "-";
        if !is_stdout {
            info!("Output file: {}", path.display());
        }

        if mode == OutputMode::Binary && is_stdout && atty::is(Stream::Stdout) {
            bail!("Cannot output binary data to stdout when running in terminal; please use -o option instead or pipe the standard output");
        }

        let writer = if is_stdout {
            Self::Stdout(io::stdout())
        } else {
            Self::File(File::create(path)?)
        };

        Ok(writer)
    }

    pub fn into_write(self) -> Box<dyn Write + Send> {
        match self {
            OutputWriter::Stdout(stdout) => Box::new(stdout),
            OutputWriter::File(file) => Box::new(file),
        }
    }
}
