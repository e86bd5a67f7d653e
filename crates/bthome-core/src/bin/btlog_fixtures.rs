use std::fs;
use std::path::{Path, PathBuf};

const SERVICE_ID: u16 = 0xFCD2;
const DEVICE_INFO_V2: u8 = 0x40;

const DEVICE_A: [u8; 6] = [0xA4, 0xC1, 0x38, 0x2F, 0x6E, 0x01];
const DEVICE_B: [u8; 6] = [0x7C, 0xC6, 0xB6, 0xAA, 0x01, 0x02];

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_basic(&root)?;
    write_truncated(&root)?;
    write_rejects(&root)?;
    Ok(())
}

struct LogLine {
    ts: Option<u64>,
    address: [u8; 6],
    frame: Vec<u8>,
}

impl LogLine {
    fn new(ts: Option<u64>, address: [u8; 6], frame: Vec<u8>) -> Self {
        Self { ts, address, frame }
    }
}

fn frame(device_info: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = SERVICE_ID.to_le_bytes().to_vec();
    frame.push(device_info);
    frame.extend_from_slice(payload);
    frame
}

fn write_basic(root: &Path) -> Result<(), String> {
    let lines = [
        LogLine::new(
            Some(1_706_745_600),
            DEVICE_A,
            frame(DEVICE_INFO_V2, &[0x01, 0x64, 0x02, 0x34, 0x12]),
        ),
        LogLine::new(
            Some(1_706_745_601),
            DEVICE_B,
            frame(DEVICE_INFO_V2, &[0x00, 0x0C, 0x01, 0x50, 0x0C, 0xE8, 0x03]),
        ),
        LogLine::new(
            Some(1_706_745_602),
            DEVICE_A,
            frame(DEVICE_INFO_V2, &[0x01, 0x63, 0x02, 0xFC, 0x11]),
        ),
    ];
    write_log(root.join("basic").join("input.btlog"), &lines)
}

fn write_truncated(root: &Path) -> Result<(), String> {
    let lines = [
        LogLine::new(
            Some(1_706_832_000),
            DEVICE_A,
            frame(DEVICE_INFO_V2, &[0x01, 0x64, 0x02, 0x34, 0x12]),
        ),
        LogLine::new(
            Some(1_706_832_001),
            DEVICE_A,
            frame(DEVICE_INFO_V2, &[0x01, 0x64, 0x02, 0x34]),
        ),
        LogLine::new(
            Some(1_706_832_002),
            DEVICE_A,
            frame(DEVICE_INFO_V2, &[0xFF, 0x01, 0x02]),
        ),
    ];
    write_log(root.join("truncated").join("input.btlog"), &lines)
}

fn write_rejects(root: &Path) -> Result<(), String> {
    let lines = [
        LogLine::new(None, DEVICE_A, frame(DEVICE_INFO_V2, &[0x01, 0x64])),
        // Wrong service identifier (0xFCD4 on the wire).
        LogLine::new(None, DEVICE_A, vec![0xD4, 0xFC, 0x40, 0x01, 0x64]),
        // Device info carries version 3.
        LogLine::new(None, DEVICE_A, vec![0xD2, 0xFC, 0x60, 0x01, 0x64]),
        // Envelope cut after the service identifier.
        LogLine::new(None, DEVICE_B, vec![0xD2, 0xFC]),
    ];
    write_log(root.join("rejects").join("input.btlog"), &lines)
}

fn write_log(path: PathBuf, lines: &[LogLine]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }

    let mut text = String::new();
    for line in lines {
        if let Some(ts) = line.ts {
            text.push('@');
            text.push_str(&ts.to_string());
            text.push(' ');
        }
        text.push_str(&hex::encode(line.address));
        text.push_str(&hex::encode(&line.frame));
        text.push('\n');
    }

    fs::write(&path, text).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
