use super::{CaptureError, LinkType};

const MAGIC_USEC: u32 = 0xa1b2_c3d4;
const MAGIC_NSEC: u32 = 0xa1b2_3c4d;

const GLOBAL_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;

/// Sequential reader over an in-memory classic pcap capture.
///
/// Capture sources are finite, already-collected files, so the whole
/// container is held in memory and walked with a private cursor; the magic
/// number fixes the byte order of every container field that follows.
/// Timestamps are not interpreted (both the microsecond and nanosecond
/// magics are accepted), only frame payloads matter here.
pub struct PcapReader {
    data: Vec<u8>,
    pos: usize,
    big_endian: bool,
    link_type: LinkType,
}

impl PcapReader {
    pub fn new(data: Vec<u8>) -> Result<Self, CaptureError> {
        if data.len() < GLOBAL_HEADER_LEN {
            return Err(CaptureError::Format(format!(
                "capture shorter than the {} byte global header",
                GLOBAL_HEADER_LEN
            )));
        }

        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let big_endian = match magic {
            MAGIC_USEC | MAGIC_NSEC => false,
            m if m.swap_bytes() == MAGIC_USEC || m.swap_bytes() == MAGIC_NSEC => true,
            other => {
                return Err(CaptureError::Format(format!(
                    "unrecognized magic number {:#010x}",
                    other
                )))
            }
        };

        let mut reader = PcapReader {
            data,
            pos: GLOBAL_HEADER_LEN,
            big_endian,
            link_type: LinkType::Other(u32::MAX),
        };
        reader.link_type = LinkType::from(reader.read_u32(20));
        Ok(reader)
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Next captured frame payload, `None` at clean end of file.
    ///
    /// A record header or payload that extends past the end of the file is
    /// a truncated frame: it is surfaced as an error once and the cursor
    /// moves to the end, so callers observe exactly one fault and then end
    /// of stream.
    pub fn next_frame(&mut self) -> Option<Result<&[u8], CaptureError>> {
        if self.pos == self.data.len() {
            return None;
        }

        if self.data.len() - self.pos < RECORD_HEADER_LEN {
            self.pos = self.data.len();
            return Some(Err(CaptureError::Format(
                "truncated record header".to_string(),
            )));
        }

        let incl_len = self.read_u32(self.pos + 8) as usize;
        let frame_start = self.pos + RECORD_HEADER_LEN;

        if self.data.len() - frame_start < incl_len {
            self.pos = self.data.len();
            return Some(Err(CaptureError::Format(
                "record extends past end of capture".to_string(),
            )));
        }

        self.pos = frame_start + incl_len;
        Some(Ok(&self.data[frame_start..frame_start + incl_len]))
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }
}
