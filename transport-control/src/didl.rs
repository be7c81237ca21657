//! DIDL-Lite track metadata
//!
//! `GetPositionInfo` carries the current track's metadata as a second XML
//! document inside the `TrackMetaData` field. Depending on firmware it is
//! escaped once (the normal case, already decoded by the envelope parser) or
//! twice, may use undeclared `dc:`/`upnp:` prefixes, and may or may not be
//! wrapped in a `<DIDL-Lite>` root.
//!
//! ```xml
//! <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
//!   <item id="-1" parentID="-1">
//!     <dc:title>Song Title</dc:title>
//!     <dc:creator>Artist Name</dc:creator>
//!     <upnp:album>Album Name</upnp:album>
//!     <upnp:albumArtURI>http://...</upnp:albumArtURI>
//!   </item>
//! </DIDL-Lite>
//! ```

use serde::Deserialize;
use soap_client::envelope;

use crate::error::TransportCause;

#[derive(Debug, Deserialize)]
struct DidlLite {
    #[serde(default)]
    item: Vec<RawItem>,
}

/// `<item>` as it appears on the wire. Every field may repeat, e.g. one
/// `albumArtURI` per DLNA image profile.
#[derive(Debug, Default, Deserialize)]
struct RawItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    creator: Vec<String>,
    #[serde(default)]
    album: Vec<String>,
    #[serde(rename = "albumArtURI", default)]
    album_art_uri: Vec<String>,
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values.into_iter().find(|value| !value.trim().is_empty())
}

impl From<RawItem> for DidlItem {
    fn from(raw: RawItem) -> Self {
        Self {
            title: first_non_empty(raw.title),
            creator: first_non_empty(raw.creator),
            album: first_non_empty(raw.album),
            album_art_uri: first_non_empty(raw.album_art_uri),
        }
    }
}

/// The fields of a DIDL-Lite `<item>` that describe a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DidlItem {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub album: Option<String>,
    pub album_art_uri: Option<String>,
}

/// Decode the `TrackMetaData` text of a position reply.
///
/// Empty text and the `NOT_IMPLEMENTED` placeholder yield an empty item;
/// anything else that fails to parse is a decode error. Of repeated items
/// and repeated fields the first non-empty one wins.
pub fn parse_track_metadata(raw: &str) -> Result<DidlItem, TransportCause> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NOT_IMPLEMENTED" {
        return Ok(DidlItem::default());
    }

    // Still escaped after the envelope parser decoded it once
    let document = if trimmed.starts_with("&lt;") {
        envelope::unescape(trimmed)
    } else {
        trimmed.to_string()
    };
    let document = envelope::strip_namespaces(&document);

    let item = if document.contains("<DIDL-Lite") {
        quick_xml::de::from_str::<DidlLite>(&document)
            .map(|didl| didl.item.into_iter().next().unwrap_or_default())
    } else {
        quick_xml::de::from_str::<RawItem>(&document)
    };

    item.map(DidlItem::from)
        .map_err(|e| TransportCause::Decode(format!("TrackMetaData: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_didl_document() {
        let raw = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="-1" parentID="-1" restricted="true"><res protocolInfo="http-get:*:audio/mpeg:*" duration="0:03:58">http://example.com/track.mp3</res><upnp:albumArtURI>/getaa?u=track</upnp:albumArtURI><upnp:class>object.item.audioItem.musicTrack</upnp:class><dc:title>Song &amp; Dance</dc:title><dc:creator>Artist Name</dc:creator><upnp:album>Album Name</upnp:album></item></DIDL-Lite>"#;

        let item = parse_track_metadata(raw).unwrap();

        assert_eq!(item.title.as_deref(), Some("Song & Dance"));
        assert_eq!(item.creator.as_deref(), Some("Artist Name"));
        assert_eq!(item.album.as_deref(), Some("Album Name"));
        assert_eq!(item.album_art_uri.as_deref(), Some("/getaa?u=track"));
    }

    #[test]
    fn test_parse_bare_item() {
        let item = parse_track_metadata("<item><creator>Artist X</creator></item>").unwrap();
        assert_eq!(item.creator.as_deref(), Some("Artist X"));
        assert_eq!(item.title, None);
    }

    #[test]
    fn test_parse_still_escaped_metadata() {
        let raw = "&lt;item&gt;&lt;dc:creator&gt;Artist X&lt;/dc:creator&gt;&lt;dc:title&gt;Track&lt;/dc:title&gt;&lt;/item&gt;";
        let item = parse_track_metadata(raw).unwrap();

        assert_eq!(item.creator.as_deref(), Some("Artist X"));
        assert_eq!(item.title.as_deref(), Some("Track"));
    }

    #[test]
    fn test_placeholder_metadata_is_empty() {
        assert_eq!(parse_track_metadata("").unwrap(), DidlItem::default());
        assert_eq!(parse_track_metadata("  NOT_IMPLEMENTED ").unwrap(), DidlItem::default());
    }

    #[test]
    fn test_malformed_metadata_is_decode_error() {
        let result = parse_track_metadata("<item><creator>Artist X</item>");
        assert!(matches!(result, Err(TransportCause::Decode(_))));
    }

    #[test]
    fn test_repeated_album_art_and_creators() {
        let raw = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:dlna="urn:schemas-dlna-org:metadata-1-0/"><item id="1" parentID="0"><dc:title>Track</dc:title><dc:creator></dc:creator><upnp:albumArtURI dlna:profileID="JPEG_TN">http://192.168.1.30/art_tn.jpg</upnp:albumArtURI><upnp:albumArtURI dlna:profileID="JPEG_SM">http://192.168.1.30/art_sm.jpg</upnp:albumArtURI><dc:creator>Lead Artist</dc:creator><dc:creator>Featured Artist</dc:creator></item></DIDL-Lite>"#;

        let item = parse_track_metadata(raw).unwrap();

        assert_eq!(item.title.as_deref(), Some("Track"));
        assert_eq!(item.creator.as_deref(), Some("Lead Artist"));
        assert_eq!(item.album_art_uri.as_deref(), Some("http://192.168.1.30/art_tn.jpg"));
        assert_eq!(item.album, None);
    }

    #[test]
    fn test_first_of_several_items_wins() {
        let raw = "<DIDL-Lite><item><title>First</title></item><item><title>Second</title></item></DIDL-Lite>";
        assert_eq!(parse_track_metadata(raw).unwrap().title.as_deref(), Some("First"));
    }

    #[test]
    fn test_empty_didl_document() {
        assert_eq!(parse_track_metadata("<DIDL-Lite></DIDL-Lite>").unwrap(), DidlItem::default());
    }
}
