use std::fmt;

/// Distinct nonzero exit statuses, one per fatal error kind. `Ok` is never
/// constructed as an error; it exists so [`ExitCode`] has a single type for
/// "how did the run end".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// The run completed and every matching paragraph was printed.
    Ok = 0,
    /// Wrong argument count, or `num_workers` outside `[1, 32]`.
    Usage = 1,
    /// The wrapped pattern failed to compile.
    Regex = 2,
    /// The input file could not be opened for reading.
    FileOpen = 3,
    /// A read/write/seek failed on the file or on a worker pipe.
    Io = 4,
    /// An unknown message tag or a truncated frame was received.
    Protocol = 5,
    /// A memory allocation failed.
    Allocation = 6,
}

impl ExitCode {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Usage => "usage error",
            Self::Regex => "pattern did not compile",
            Self::FileOpen => "input file could not be opened",
            Self::Io => "I/O error",
            Self::Protocol => "protocol error",
            Self::Allocation => "allocation failure",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The kind half of [`ExitCode`], usable by lower crates that want to tag an
/// error without depending on the exit-code numbering directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Usage,
    Regex,
    FileOpen,
    Io,
    Protocol,
    Allocation,
}

impl ErrorKind {
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::Usage => ExitCode::Usage,
            Self::Regex => ExitCode::Regex,
            Self::FileOpen => ExitCode::FileOpen,
            Self::Io => ExitCode::Io,
            Self::Protocol => ExitCode::Protocol,
            Self::Allocation => ExitCode::Allocation,
        }
    }
}
