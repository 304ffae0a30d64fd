//! Reversible line obfuscation keyed by an integer.
//!
//! Not cryptography. Each UTF-8 byte of a line is bit-rotated left by
//! `key mod 8`, scaled by the key, and the products are written out as a
//! `?`-delimited decimal list. This expands raw bytes into plain decimal
//! text, trading compactness for safety against ambiguous byte values.
//! Decryption inverts the transform exactly; a line that fails to parse is
//! returned unmodified.

/// Line transform configured with an integer key.
///
/// Arithmetic is done in `i64` so the byte product cannot overflow for any
/// `i32` key.
#[derive(Debug, Clone, Copy)]
pub struct LineCipher {
    key: i64,
}

impl LineCipher {
    /// A zero key would erase every byte, so the degenerate case collapses
    /// to 1.
    pub fn new(key: i32) -> Self {
        let key = if key == 0 { 1 } else { key };
        Self { key: i64::from(key) }
    }

    pub fn key(&self) -> i32 {
        self.key as i32
    }

    fn rotation(&self) -> u32 {
        self.key.rem_euclid(8) as u32
    }

    /// Obfuscate one line.
    pub fn encrypt(&self, line: &str) -> String {
        let rotation = self.rotation();
        line.as_bytes()
            .iter()
            .map(|byte| (i64::from(byte.rotate_left(rotation)) * self.key).to_string())
            .collect::<Vec<_>>()
            .join("?")
    }

    /// Invert [`LineCipher::encrypt`]. Undecodable lines pass through
    /// unchanged rather than erroring.
    pub fn decrypt(&self, line: &str) -> String {
        self.try_decrypt(line)
            .unwrap_or_else(|| line.to_string())
    }

    fn try_decrypt(&self, line: &str) -> Option<String> {
        if line.is_empty() {
            return Some(String::new());
        }
        let rotation = self.rotation();
        let mut bytes = Vec::with_capacity(line.len() / 2);
        for token in line.split('?') {
            let value: i64 = token.parse().ok()?;
            let byte = u8::try_from(value / self.key).ok()?;
            bytes.push(byte.rotate_right(rotation));
        }
        String::from_utf8(bytes).ok()
    }
}
