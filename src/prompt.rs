use shapesort_core::validate_directory;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub const SOURCE_PROMPT: &str = "Enter the path to the source folder containing images: ";
pub const DESTINATION_PROMPT: &str =
    "Enter the path to the destination folder for sorted images: ";

/// Asks for a folder until the answer names an existing directory.
///
/// Fails only when the input closes or cannot be read.
pub fn prompt_directory<R, W>(input: &mut R, output: &mut W, message: &str) -> io::Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{}", message)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a folder was given",
            ));
        }

        let candidate = PathBuf::from(line.trim());
        match validate_directory(candidate) {
            Ok(path) => return Ok(path),
            Err(error) => writeln!(output, "Error: {}. Please try again.", error)?,
        }
    }
}
