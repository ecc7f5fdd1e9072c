use std::fmt::Write as _;

/// Maximum object nesting depth tracked by the builder.
const MAX_DEPTH: usize = 16;

/// Upper bound on requested float decimals.
const MAX_DECIMALS: usize = 9;

/// Single-pass JSON object writer over a caller-owned byte buffer.
///
/// Every `add_*` call first checks that the complete element fits, counting one
/// reserved byte per open object so a matching `end_object` can always be
/// written. An element that does not fit is dropped whole: the bytes already
/// written are left intact and the output stays balanced. This lossy-on-overflow
/// policy is deliberate; callers size buffers conservatively and a partial but
/// valid object is still produced.
///
/// String values escape only `"` and `\`. Control characters are the caller's
/// responsibility to avoid.
///
/// Floats are encoded as fixed-point with a caller-chosen decimal count,
/// truncated rather than rounded. `NaN` encodes as `null`; infinities encode as
/// the sentinel magnitude `9999999` with sign, which the platform treats as an
/// out-of-range marker.
///
/// A "first element" flag is kept per open object, so siblings after a closed
/// nested object are comma-separated correctly at any depth.
pub struct JsonBuilder<'a> {
    buf: &'a mut [u8],
    pos: usize,
    depth: usize,
    // Bit i set: the object at depth i is still waiting for its first element.
    first: u16,
}

impl<'a> JsonBuilder<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            first: 0,
        }
    }

    /// Rewinds the builder for reuse over the same buffer.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.depth = 0;
        self.first = 0;
    }

    pub fn start_object(&mut self) {
        if self.depth >= MAX_DEPTH || !self.fits(1, 1) {
            return;
        }
        self.put(b'{');
        self.push_scope();
    }

    pub fn end_object(&mut self) {
        if self.depth == 0 {
            return;
        }
        // The closing byte was reserved when the object was opened.
        self.put(b'}');
        self.depth -= 1;
    }

    /// Opens a sub-object under `key`.
    pub fn start_nested_object(&mut self, key: &str) {
        if self.depth == 0 || self.depth >= MAX_DEPTH {
            return;
        }
        let needed = self.comma_len() + key.len() + 4;
        if !self.fits(needed, 1) {
            return;
        }
        self.comma_if_needed();
        self.put_key(key);
        self.put(b'{');
        self.push_scope();
    }

    pub fn add_string(&mut self, key: &str, value: &str) {
        let escapes = value.bytes().filter(|b| *b == b'"' || *b == b'\\').count();
        let needed = self.comma_len() + key.len() + 3 + value.len() + escapes + 2;
        if self.depth == 0 || !self.fits(needed, 0) {
            return;
        }
        self.comma_if_needed();
        self.put_key(key);
        self.put(b'"');
        for b in value.bytes() {
            if b == b'"' || b == b'\\' {
                self.put(b'\\');
            }
            self.put(b);
        }
        self.put(b'"');
    }

    pub fn add_int(&mut self, key: &str, value: i64) {
        let mut tmp = NumBuf::new();
        let _ = write!(tmp, "{value}");
        self.add_raw(key, tmp.as_bytes());
    }

    pub fn add_uint(&mut self, key: &str, value: u64) {
        let mut tmp = NumBuf::new();
        let _ = write!(tmp, "{value}");
        self.add_raw(key, tmp.as_bytes());
    }

    pub fn add_bool(&mut self, key: &str, value: bool) {
        self.add_raw(key, if value { b"true" } else { b"false" });
    }

    pub fn add_float(&mut self, key: &str, value: f64, decimals: usize) {
        let mut tmp = NumBuf::new();
        format_float(&mut tmp, value, decimals.min(MAX_DECIMALS));
        self.add_raw(key, tmp.as_bytes());
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// The text produced so far.
    pub fn as_str(&self) -> &str {
        // Only whole UTF-8 sequences and ASCII are ever appended.
        std::str::from_utf8(&self.buf[..self.pos]).unwrap_or("")
    }

    fn add_raw(&mut self, key: &str, value: &[u8]) {
        let needed = self.comma_len() + key.len() + 3 + value.len();
        if self.depth == 0 || !self.fits(needed, 0) {
            return;
        }
        self.comma_if_needed();
        self.put_key(key);
        for &b in value {
            self.put(b);
        }
    }

    /// True when `needed` bytes plus `extra_reserve` additional closing braces
    /// fit alongside the braces already owed.
    fn fits(&self, needed: usize, extra_reserve: usize) -> bool {
        self.pos + needed + self.depth + extra_reserve <= self.buf.len()
    }

    fn push_scope(&mut self) {
        self.first |= 1 << self.depth;
        self.depth += 1;
    }

    fn comma_len(&self) -> usize {
        if self.depth > 0 && self.first & (1 << (self.depth - 1)) == 0 {
            1
        } else {
            0
        }
    }

    fn comma_if_needed(&mut self) {
        let bit = 1 << (self.depth - 1);
        if self.first & bit == 0 {
            self.put(b',');
        }
        self.first &= !bit;
    }

    fn put_key(&mut self, key: &str) {
        self.put(b'"');
        for b in key.bytes() {
            self.put(b);
        }
        self.put(b'"');
        self.put(b':');
    }

    fn put(&mut self, b: u8) {
        if self.pos < self.buf.len() {
            self.buf[self.pos] = b;
            self.pos += 1;
        }
    }
}

/// Stack scratch for formatting one numeric value.
struct NumBuf {
    buf: [u8; 32],
    len: usize,
}

impl NumBuf {
    fn new() -> Self {
        Self {
            buf: [0; 32],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn push(&mut self, b: u8) {
        if self.len < self.buf.len() {
            self.buf[self.len] = b;
            self.len += 1;
        }
    }
}

impl std::fmt::Write for NumBuf {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        for b in s.bytes() {
            self.push(b);
        }
        Ok(())
    }
}

/// Fixed-point float encoding by manual digit extraction. No scientific
/// notation, no locale, truncation instead of rounding.
fn format_float(out: &mut NumBuf, value: f64, decimals: usize) {
    if value.is_nan() {
        let _ = out.write_str("null");
        return;
    }
    if value.is_infinite() {
        let _ = out.write_str(if value > 0.0 { "9999999" } else { "-9999999" });
        return;
    }

    let mut value = value;
    if value < 0.0 {
        out.push(b'-');
        value = -value;
    }

    let int_part = value as i64;
    let _ = write!(out, "{int_part}");

    if decimals > 0 {
        out.push(b'.');
        let mut frac = value - int_part as f64;
        for _ in 0..decimals {
            frac *= 10.0;
            let digit = frac as u8;
            out.push(b'0' + digit);
            frac -= f64::from(digit);
        }
    }
}
