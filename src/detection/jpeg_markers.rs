//! JPEG marker walking — segment iteration and SOF dimensions

/// One marker segment: marker byte and its payload (length field excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub marker: u8,
    pub payload: &'a [u8],
}

/// Iterates header segments from SOI up to (not including) scan data.
/// Stops quietly on SOS, EOI, or a truncated segment.
pub struct Segments<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Segments<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let pos = if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
            2
        } else {
            data.len()
        };
        Self { data, pos }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        loop {
            // Skip garbage and fill bytes up to the next marker
            while self.pos < data.len() && data[self.pos] != 0xFF {
                self.pos += 1;
            }
            while self.pos < data.len() && data[self.pos] == 0xFF {
                self.pos += 1;
            }
            if self.pos >= data.len() {
                return None;
            }
            let marker = data[self.pos];
            self.pos += 1;

            match marker {
                0xD9 | 0xDA => {
                    self.pos = data.len();
                    return None;
                }
                // Standalone markers carry no length
                0x01 | 0xD0..=0xD7 => continue,
                _ => {}
            }

            if self.pos + 2 > data.len() {
                return None;
            }
            let len = u16::from_be_bytes([data[self.pos], data[self.pos + 1]]) as usize;
            if len < 2 || self.pos + len > data.len() {
                self.pos = data.len();
                return None;
            }
            let payload = &data[self.pos + 2..self.pos + len];
            self.pos += len;
            return Some(Segment { marker, payload });
        }
    }
}

/// Start-of-frame markers (baseline, progressive, lossless, arithmetic)
fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Frame dimensions `(width, height)` from the first SOF segment
pub fn sof_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Segments::new(data)
        .find(|s| is_sof(s.marker) && s.payload.len() >= 5)
        .map(|s| {
            let h = u16::from_be_bytes([s.payload[1], s.payload[2]]) as u32;
            let w = u16::from_be_bytes([s.payload[3], s.payload[4]]) as u32;
            (w, h)
        })
}
