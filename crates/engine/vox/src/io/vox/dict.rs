//! MATL/MATT payload: material id followed by a string dictionary.

use super::{ChunkTag, FormatError};

/// Key/value pairs in file order. Order matters: for aliased keys the later
/// entry wins.
pub type Dict = Vec<(String, String)>;

/// Byte cursor over one chunk's content.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_i32(&mut self) -> Option<i32> {
        let bytes = self.take(4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(out)
    }

    fn read_string(&mut self) -> Result<String, String> {
        let len = self
            .read_i32()
            .ok_or_else(|| "string length runs past end of chunk".to_string())?;
        if len < 0 {
            return Err(format!("negative string length {}", len));
        }
        let bytes = self.take(len as usize).ok_or_else(|| {
            format!(
                "string of {} bytes with only {} remaining",
                len,
                self.remaining()
            )
        })?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Decode a MATL/MATT chunk body into `(material id, dictionary)`.
///
/// `offset` is the chunk's position in the file and is only used for error
/// reporting.
pub fn read_material_chunk(
    content: &[u8],
    tag: ChunkTag,
    offset: usize,
) -> Result<(i32, Dict), FormatError> {
    let mut cursor = Cursor::new(content);

    let material_id = cursor.read_i32().ok_or(FormatError::Truncated {
        tag,
        offset,
        expected_bytes: 4,
        available_bytes: content.len(),
    })?;

    let malformed = |reason: String| FormatError::MalformedMaterialDict {
        material_id,
        reason,
    };

    let count = cursor
        .read_i32()
        .ok_or_else(|| malformed("missing entry count".to_string()))?;
    if count < 0 {
        return Err(malformed(format!("negative entry count {}", count)));
    }

    let mut dict = Vec::with_capacity((count as usize).min(64));
    for index in 0..count {
        let key = cursor
            .read_string()
            .map_err(|e| malformed(format!("entry {} of {}: key {}", index, count, e)))?;
        let value = cursor
            .read_string()
            .map_err(|e| malformed(format!("entry {} of {}: value {}", index, count, e)))?;
        dict.push((key, value));
    }

    if cursor.remaining() > 0 {
        return Err(malformed(format!(
            "{} bytes left after {} entries",
            cursor.remaining(),
            count
        )));
    }

    Ok((material_id, dict))
}

/// Encode a MATL body. Inverse of [`read_material_chunk`].
pub fn write_material_chunk(material_id: i32, dict: &[(String, String)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&material_id.to_le_bytes());
    out.extend_from_slice(&(dict.len() as i32).to_le_bytes());
    for (key, value) in dict {
        write_string(&mut out, key);
        write_string(&mut out, value);
    }
    out
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as i32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}
