#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Compact save payload shaped like the game's own output.
pub const SAMPLE_JSON: &str = concat!(
    r#"{"AppStore":{"purchasedItems":["vpn_pro"],"unlockedMarketItems":[]},"#,
    r#""Bank":{"accounts":["#,
    r#"{"id":"a1","accountName":"Alice","provider":"NeoBank","balance":500.0,"IBAN":"DE00","isMine":true},"#,
    r#"{"id":"b2","fullName":"Bob","balance":-20,"IBAN":"DE01","isMine":false,"futureField":{"tier":2}}"#,
    r#"],"lastTransfer":1700000000000},"#,
    r#""Quests":[{"id":1,"done":false,"progress":0.5}],"#,
    r#""Terminal":{"history":["ls","cat notes.txt"],"cwd":"/home"},"#,
    r#""Suspicion":3,"#,
    r#""SeasonPass":{"seed":123456789012345678901234567890,"ratio":0.25}}"#
);

/// Gzip-wraps `payload` the way the game writes `.hhsav` files.
pub fn game_container(payload: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

pub fn inflate(bytes: &[u8]) -> String {
    use std::io::Read;
    let mut out = String::new();
    flate2::read::GzDecoder::new(bytes)
        .read_to_string(&mut out)
        .unwrap();
    out
}
