//! Inbound push frame decoding.

use chrono::{DateTime, Utc};
use serde_json::Deserializer;

use crate::models::{Notification, NotificationPayload};

/// Decode a text frame into notifications.
///
/// A frame holds one or more JSON objects separated by whitespace; the
/// server batches queued events with newlines. Objects may themselves span
/// several lines. Objects without a `type` are skipped quietly. A malformed
/// entry is logged and decoding resumes on the next line.
pub fn parse_frame(text: &str, received_at: DateTime<Utc>) -> Vec<Notification> {
    let mut list = Vec::new();
    let mut rest = text;

    loop {
        let mut stream = Deserializer::from_str(rest).into_iter::<NotificationPayload>();

        let failed = loop {
            match stream.next() {
                Some(Ok(payload)) => list.extend(accept(payload, received_at)),
                Some(Err(e)) => {
                    log::warn!("[ws] dropping malformed frame: {}", e);
                    break true;
                }
                None => break false,
            }
        };
        if !failed {
            return list;
        }

        // skip past the line the bad entry starts on
        let bad = &rest[stream.byte_offset()..];
        let bad = bad.trim_start();
        match bad.find('\n') {
            Some(i) => rest = &bad[i + 1..],
            None => return list,
        }
    }
}

fn accept(payload: NotificationPayload, received_at: DateTime<Utc>) -> Option<Notification> {
    if !payload.has_kind() {
        log::trace!("[ws] ignoring frame without type");
        return None;
    }

    match payload.normalize(received_at) {
        Ok(noti) => Some(noti),
        Err(e) => {
            log::warn!("[ws] dropping frame: {}", e);
            None
        }
    }
}
