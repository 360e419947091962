use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Note that most per-class and per-member decode problems never surface through this type:
/// the shaking pipeline treats an unresolvable or undecodable class as a dead end in the
/// reachability graph, and malformed signatures, annotations and metadata blobs are absorbed
/// at the point of decoding. Only failures on explicitly required inputs and outputs (the
/// classpath archives themselves, the output archive) are reported to the caller.
///
/// # Examples
///
/// ```rust,no_run
/// use jarshake::{ClasspathIndex, Error};
/// use std::path::PathBuf;
///
/// match ClasspathIndex::new(&[PathBuf::from("input.jar")]) {
///     Ok(index) => println!("{} classes indexed", index.class_count()),
///     Err(Error::ArchiveError(e)) => eprintln!("corrupt archive: {}", e),
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class data is damaged and could not be parsed.
    ///
    /// This error indicates that a byte sequence does not conform to the class-file
    /// format. The error includes the source location where the malformation was
    /// detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing class data.
    ///
    /// This error occurs when trying to read data beyond the end of a buffer.
    /// It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The class-file version is newer than this library understands.
    ///
    /// The associated value is the major version found in the class header.
    #[error("Class file major version {0} is not supported")]
    UnsupportedVersion(u16),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the zip crate while opening or writing an archive.
    ///
    /// A classpath entry that exists on disk but cannot be opened as an archive
    /// is a fatal input error, as is any failure writing the output archive.
    #[error("{0}")]
    ArchiveError(#[from] zip::result::ZipError),
}
