//! Embedded tag extraction for uploaded audio buffers.
//!
//! Everything here is best-effort: the pipeline treats any failure as "no
//! tags" and keeps going, so a file with a mangled tag block is still stored.

use lofty::config::ParseOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::io::Cursor;
use thiserror::Error;

/// Raised when the tag container cannot be parsed at all.
#[derive(Debug, Error)]
pub enum TagReadError {
    #[error("unreadable audio container: {0}")]
    Parse(String),
}

/// First embedded picture found in the tag block, payload untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPicture {
    pub data: Vec<u8>,
    /// Mime type as declared by the tag, not validated against the payload.
    pub mime: Option<String>,
}

/// Tags recovered from one buffer. Every field is optional; absence is not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Playback length rounded to the nearest whole second, 0 when the
    /// container does not report one.
    pub duration_secs: u64,
    pub picture: Option<EmbeddedPicture>,
}

/// Parse title/artist/album, duration and the first embedded picture from an
/// in-memory buffer.
///
/// The caller decides what a failure means; the ingestion pipeline downgrades
/// it to [`ExtractedTags::default`].
pub fn extract(buffer: &[u8]) -> Result<ExtractedTags, TagReadError> {
    let tagged = Probe::new(Cursor::new(buffer))
        .options(ParseOptions::new())
        .guess_file_type()
        .map_err(|e| TagReadError::Parse(e.to_string()))?
        .read()
        .map_err(|e| TagReadError::Parse(e.to_string()))?;

    let duration_secs = tagged.properties().duration().as_secs_f64().round() as u64;

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let (title, artist, album, picture) = match tag {
        Some(tag) => (
            tag.title().map(|s| s.to_string()),
            tag.artist().map(|s| s.to_string()),
            tag.album().map(|s| s.to_string()),
            tag.pictures().first().map(|pic| EmbeddedPicture {
                data: pic.data().to_vec(),
                mime: pic.mime_type().map(|m| m.as_str().to_string()),
            }),
        ),
        None => (None, None, None, None),
    };

    Ok(ExtractedTags {
        title,
        artist,
        album,
        duration_secs,
        picture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::config::WriteOptions;
    use lofty::picture::{MimeType, Picture, PictureType};
    use lofty::tag::{Tag, TagExt, TagType};

    // One CBR MPEG-1 Layer III frame: 128 kbps, 44.1 kHz, no padding.
    const FRAME_LEN: usize = 417;
    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

    fn cbr_frames(count: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(count * FRAME_LEN);
        for _ in 0..count {
            out.extend_from_slice(&FRAME_HEADER);
            out.extend(std::iter::repeat(0u8).take(FRAME_LEN - FRAME_HEADER.len()));
        }
        out
    }

    fn mp3_with_tag(tag: Tag, frames: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        tag.dump_to(&mut buf, WriteOptions::default()).unwrap();
        buf.extend_from_slice(&cbr_frames(frames));
        buf
    }

    #[test]
    fn test_extracts_text_tags() {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Real Title".to_string());
        tag.set_artist("Some Artist".to_string());
        tag.set_album("Some Album".to_string());
        let buf = mp3_with_tag(tag, 115);

        let tags = extract(&buf).unwrap();
        assert_eq!(tags.title.as_deref(), Some("Real Title"));
        assert_eq!(tags.artist.as_deref(), Some("Some Artist"));
        assert_eq!(tags.album.as_deref(), Some("Some Album"));
        assert!(tags.picture.is_none());
    }

    #[test]
    fn test_duration_rounds_to_whole_seconds() {
        // 115 frames of 417 bytes at 128 kbps sit just around the three
        // second mark whichever estimation strategy the parser uses.
        let buf = cbr_frames(115);
        let tags = extract(&buf).unwrap();
        assert_eq!(tags.duration_secs, 3);
    }

    #[test]
    fn test_untagged_stream_yields_empty_tags() {
        let buf = cbr_frames(40);
        let tags = extract(&buf).unwrap();
        assert!(tags.title.is_none());
        assert!(tags.artist.is_none());
        assert!(tags.album.is_none());
        assert!(tags.picture.is_none());
    }

    #[test]
    fn test_first_picture_is_captured_verbatim() {
        let payload = vec![0xAB; 256];
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Pictured".to_string());
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Png),
            None,
            payload.clone(),
        ));
        let buf = mp3_with_tag(tag, 115);

        let tags = extract(&buf).unwrap();
        let picture = tags.picture.expect("picture should survive extraction");
        assert_eq!(picture.data, payload);
        assert_eq!(picture.mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_garbage_buffer_is_an_error_not_a_panic() {
        let buf = vec![0x42u8; 512];
        assert!(extract(&buf).is_err());
    }

    #[test]
    fn test_empty_buffer_is_an_error() {
        assert!(extract(&[]).is_err());
    }
}
