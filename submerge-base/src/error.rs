// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

#[cfg(test)]
use test_log::test;

/// Coarse taxonomy a caller can switch on without downcasting, matching the
/// exception hierarchy the error model replaces: `IOException`,
/// `EndOfFileException`, `OutOfSpaceException`, `DelayWriteException`,
/// `OpenFileException`, `BrokenPipeException`, `DataFormatException`,
/// `InvalidObjectException`, `SizeValueTooLargeException`,
/// `BadVersionException`, `NotFoundFactoryException`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EndOfFile,
    OutOfSpace,
    DelayWrite,
    OpenFile,
    BrokenPipe,
    DataFormat,
    InvalidObject,
    SizeValueTooLarge,
    BadVersion,
    NotFoundFactory,
    Other,
}

#[derive(Debug)]
#[allow(dead_code)]
pub struct Error(DynBacktraceError, ErrorKind);
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {
    fn description(&self) -> &str {
        &self.0
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::new(err)
    }
}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
        Error::new_kind(err, ErrorKind::Other)
    }

    pub fn new_kind<E: std::error::Error + Send + Sync + 'static>(
        err: E,
        kind: ErrorKind,
    ) -> Error {
        error!(target: "submerge", "{:?}", err);
        let dbe = DynBacktraceError::from(err);
        Error(dbe, kind)
    }

    pub fn kind(&self) -> ErrorKind {
        self.1
    }
}

pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    let err = SimpleErr(msg.into());
    Error::new(err)
}

fn err_kind(msg: impl Into<Cow<'static, str>>, kind: ErrorKind) -> Error {
    Error::new_kind(SimpleErr(msg.into()), kind)
}

pub fn end_of_file(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::EndOfFile)
}
pub fn out_of_space(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::OutOfSpace)
}
pub fn delay_write(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::DelayWrite)
}
pub fn open_file(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::OpenFile)
}
pub fn broken_pipe(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::BrokenPipe)
}
pub fn data_format(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::DataFormat)
}
pub fn invalid_object(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::InvalidObject)
}
pub fn size_value_too_large(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::SizeValueTooLarge)
}
pub fn bad_version(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::BadVersion)
}
pub fn not_found_factory(msg: impl Into<Cow<'static, str>>) -> Error {
    err_kind(msg, ErrorKind::NotFoundFactory)
}

#[test]
fn test_error() {
    let _err = err("test error");
    assert_eq!(end_of_file("eof").kind(), ErrorKind::EndOfFile);
}
