use std::fmt;
use std::str::FromStr;

use super::FsError;

/// Mode a file is opened in.
///
/// Binary (`b`) and text (`t`) flags are accepted when parsing but carry no meaning:
/// no encoding transformation is modeled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// `r`: content is loaded lazily on the first read.
    #[default]
    Read,
    /// `w`: starts from an empty buffer; the file is replaced on close.
    Write,
    /// `a`: existing content is loaded lazily on the first write and extended.
    Append,
}

impl OpenMode {
    pub fn is_readable(self) -> bool {
        self == OpenMode::Read
    }

    pub fn is_writable(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::Append)
    }
}

impl FromStr for OpenMode {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FsError::InvalidMode(s.to_string());

        let mut mode = None;
        for flag in s.chars() {
            match flag {
                'r' | 'w' | 'a' if mode.is_some() => return Err(invalid()),
                'r' => mode = Some(OpenMode::Read),
                'w' => mode = Some(OpenMode::Write),
                'a' => mode = Some(OpenMode::Append),
                'b' | 't' => {}
                _ => return Err(invalid()),
            }
        }
        mode.ok_or_else(invalid)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Append => "a",
        };
        f.write_str(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_modes() {
        assert_eq!("r".parse::<OpenMode>().unwrap(), OpenMode::Read);
        assert_eq!("w".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert_eq!("a".parse::<OpenMode>().unwrap(), OpenMode::Append);
    }

    #[test]
    fn test_parse_binary_and_text_variants() {
        assert_eq!("rb".parse::<OpenMode>().unwrap(), OpenMode::Read);
        assert_eq!("wb".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert_eq!("at".parse::<OpenMode>().unwrap(), OpenMode::Append);
        assert_eq!("br".parse::<OpenMode>().unwrap(), OpenMode::Read);
    }

    #[test]
    fn test_parse_invalid_modes() {
        for mode in ["", "b", "rw", "r+", "x", "wa"] {
            let result = mode.parse::<OpenMode>();
            assert!(
                matches!(result, Err(FsError::InvalidMode(_))),
                "{mode:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_readable_writable() {
        assert!(OpenMode::Read.is_readable());
        assert!(!OpenMode::Read.is_writable());
        assert!(OpenMode::Write.is_writable());
        assert!(!OpenMode::Write.is_readable());
        assert!(OpenMode::Append.is_writable());
        assert!(!OpenMode::Append.is_readable());
    }

    #[test]
    fn test_display() {
        assert_eq!(OpenMode::Append.to_string(), "a");
    }
}
