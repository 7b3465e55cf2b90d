use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Length of a hex-encoded fingerprint (BLAKE3, 256 bits).
pub const FINGERPRINT_LEN: usize = 64;

/// Hash the full content of `reader` (read to EOF) into a hex fingerprint.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn fingerprint_file(file: &Path) -> io::Result<String> {
    let f = File::open(file)?;
    fingerprint_reader(BufReader::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device went away"))
        }
    }

    #[test]
    fn test_same_content_same_fingerprint() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.jpg");
        let nested = tmp.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        let b = nested.join("renamed.png");
        fs::write(&a, b"identical bytes").unwrap();
        fs::write(&b, b"identical bytes").unwrap();

        let fa = fingerprint_file(&a).unwrap();
        let fb = fingerprint_file(&b).unwrap();
        assert_eq!(fa, fb);
        assert_eq!(fa.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        let fa = fingerprint_reader(&b"one"[..]).unwrap();
        let fb = fingerprint_reader(&b"two"[..]).unwrap();
        assert_ne!(fa, fb);
    }

    #[test]
    fn test_empty_input_has_fixed_length() {
        let f = fingerprint_reader(io::empty()).unwrap();
        assert_eq!(f.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_read_failure_is_an_error() {
        assert!(fingerprint_reader(FailingReader).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(fingerprint_file(&tmp.path().join("nope")).is_err());
    }
}
