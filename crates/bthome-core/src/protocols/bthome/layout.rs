pub const SERVICE_ID_RANGE: std::ops::Range<usize> = 0..2;
pub const DEVICE_INFO_OFFSET: usize = 2;
pub const PAYLOAD_OFFSET: usize = 3;

pub const SERVICE_ID: u16 = 0xFCD2;
pub const VERSION_SHIFT: u32 = 5;
pub const VERSION_MASK: u8 = 0x07;
pub const SUPPORTED_VERSION: u8 = 2;

pub const MIN_LEN: usize = PAYLOAD_OFFSET;
