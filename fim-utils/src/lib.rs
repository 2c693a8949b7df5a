//! Shared utility functions for FIM crates.

/// Currency and count formatting for chart labels
pub mod money {
    /// Divisor for chart values expressed in millions.
    pub const MILLION: f64 = 1_000_000.0;

    /// Convert a currency amount to millions.
    pub fn to_millions(value: f64) -> f64 {
        value / MILLION
    }

    /// Format an amount as pounds in millions with one decimal, e.g. "£1.2M".
    pub fn format_millions(value: f64) -> String {
        format!("£{:.1}M", to_millions(value))
    }

    /// Format a count with thousands separators, e.g. 12345 -> "12,345".
    pub fn format_count(value: u64) -> String {
        let digits = value.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

}

/// Dataset file reading
pub mod input {
    use anyhow::Context;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::path::Path;

    /// Read a dataset file to a string, gunzipping it when the name ends in `.gz`.
    pub fn read_dataset(path: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);
        if is_gzip {
            decompress_gzip(&bytes).with_context(|| format!("failed to gunzip {}", path.display()))
        } else {
            Ok(String::from_utf8(bytes)?)
        }
    }

    /// Decompress gzip bytes into a UTF-8 string.
    pub fn decompress_gzip(bytes: &[u8]) -> anyhow::Result<String> {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = String::new();
        decoder.read_to_string(&mut out)?;
        Ok(out)
    }

}
