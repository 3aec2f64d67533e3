/*!
I/O utilities for reading inputs and writing outputs, files or stdin/stdout
*/

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Input source - either stdin or a file
#[derive(Debug, Clone)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// Read all bytes from the input source
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        match self {
            Input::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            Input::File(path) => fs::read(path),
        }
    }

    /// Read all data as a UTF-8 string
    pub fn read_to_string(&self) -> io::Result<String> {
        match self {
            Input::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            Input::File(path) => fs::read_to_string(path),
        }
    }

    /// Read the input as raw bytes, or as hex text when `hex` is set
    pub fn read_bytes(&self, hex: bool) -> anyhow::Result<Vec<u8>> {
        if hex {
            parse_hex(&self.read_to_string()?)
        } else {
            Ok(self.read_all()?)
        }
    }
}

/// Decodes hex text, ignoring any whitespace between digits
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(digits)?)
}

impl FromStr for Input {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Input::Stdin)
        } else {
            Ok(Input::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Output destination - either stdout or a file
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// Write a string to the output destination
    pub fn write_str(&self, data: &str) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().write_all(data.as_bytes()),
            Output::File(path) => fs::write(path, data),
        }
    }
}

impl FromStr for Output {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "-" {
            Ok(Output::Stdout)
        } else {
            Ok(Output::File(PathBuf::from(s)))
        }
    }
}
