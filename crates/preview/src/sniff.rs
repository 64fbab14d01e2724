use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use infer::MatcherType;

use crate::capability::Capability;

/// Media kinds probed by magic bytes, in priority order.
const MEDIA_PROBES: [(fn(&[u8]) -> bool, MatcherType, Capability); 3] = [
    (infer::is_image, MatcherType::Image, Capability::Image),
    (infer::is_video, MatcherType::Video, Capability::Video),
    (infer::is_audio, MatcherType::Audio, Capability::Audio),
];

/// Read at most `len` bytes from the start of `path`.
pub fn read_sample(path: &Path, len: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    file.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Detect image, then video, then audio content from magic bytes.
///
/// Returns the capability and the detected MIME type.
pub fn sniff_media(buf: &[u8]) -> Option<(Capability, &'static str)> {
    for (probe, matcher, capability) in MEDIA_PROBES {
        if !probe(buf) {
            continue;
        }
        let mime = infer::get(buf)
            .filter(|kind| kind.matcher_type() == matcher)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");
        return Some((capability, mime));
    }
    None
}

/// Text heuristic over a head sample: no NUL bytes and valid UTF-8, except
/// that a multi-byte sequence cut off by the sample boundary is tolerated.
pub fn is_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // `error_len() == None` means the input ended mid-sequence.
        Err(e) => e.error_len().is_none(),
    }
}

#[cfg(test)]
#[path = "sniff_tests.rs"]
mod tests;
