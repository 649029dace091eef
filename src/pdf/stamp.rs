//! Seal (hanko) overlay compositor.
//!
//! Fetches the user's seal image and merges it onto the first page of a
//! rendered order document. The URL must pass a strict allow-list before any
//! network request is made; a rejected or failed fetch leaves the document
//! exactly as rendered.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::time::Duration;

use super::{RenderedDocument, StampError};
use crate::storage::SupabaseConfig;

// Placement policy "top-right sender zone": the seal overlaps the sender block
// at a fixed inset from the top-right corner of the first page (A4, points).
const PAGE_WIDTH_PT: f32 = 595.276;
const PAGE_HEIGHT_PT: f32 = 841.89;
const SEAL_SIZE_PT: f32 = 64.0;
const SEAL_RIGHT_INSET_PT: f32 = 42.0;
const SEAL_TOP_INSET_PT: f32 = 52.0;

const SEAL_XOBJECT_NAME: &[u8] = b"HankoIm0";
const TRUSTED_PUBLIC_SUFFIX: &str = ".supabase.co";
const TRUSTED_PATH_PREFIX: &str = "/storage/v1/object/public/";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SEAL_BYTES: usize = 4 * 1024 * 1024;

pub struct SealStamper {
    trusted_host: Option<String>,
    http: reqwest::Client,
}

impl SealStamper {
    pub fn new(storage: Option<&SupabaseConfig>, http: reqwest::Client) -> Self {
        let trusted_host = storage
            .and_then(|c| reqwest::Url::parse(&c.supabase_url).ok())
            .and_then(|u| u.host_str().map(str::to_owned));
        Self { trusted_host, http }
    }

    /// Allow-list check, applied before any fetch. A caller-supplied seal URL
    /// must never steer the server to an arbitrary or internal address.
    pub fn is_trusted_seal_url(&self, raw: &str) -> bool {
        let Ok(url) = reqwest::Url::parse(raw) else {
            return false;
        };
        if url.scheme() != "https" {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host_allowed = match &self.trusted_host {
            Some(trusted) => host == trusted,
            None => host.ends_with(TRUSTED_PUBLIC_SUFFIX),
        };
        host_allowed && url.path().starts_with(TRUSTED_PATH_PREFIX)
    }

    /// Merge the seal at `seal_url` onto the first page of `document`.
    ///
    /// Never fails the surrounding send: rejections and fetch/decode errors
    /// are logged and the document stays untouched.
    pub async fn stamp_first_page(&self, document: &mut RenderedDocument, seal_url: &str) {
        if !self.is_trusted_seal_url(seal_url) {
            log::warn!("rejected untrusted seal URL: {seal_url}");
            return;
        }

        match self.fetch_and_overlay(document.bytes(), seal_url).await {
            Ok(stamped) => {
                if let Err(e) = document.replace_bytes(stamped) {
                    log::warn!("failed to persist stamped document: {e}");
                }
            }
            Err(e) => log::warn!("seal overlay skipped: {e}"),
        }
    }

    async fn fetch_and_overlay(&self, pdf: &[u8], seal_url: &str) -> Result<Vec<u8>, StampError> {
        let response = self
            .http
            .get(seal_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StampError::FetchStatus(response.status()));
        }
        let body = response.bytes().await?;
        if body.len() > MAX_SEAL_BYTES {
            return Err(StampError::TooLarge);
        }
        overlay_seal(pdf, &body)
    }
}

/// Overlay-merge: embed the seal as an image XObject with an alpha soft mask
/// and append a `q cm Do Q` block to the first page's content streams.
fn overlay_seal(pdf: &[u8], seal: &[u8]) -> Result<Vec<u8>, StampError> {
    let mut doc = Document::load_mem(pdf)?;
    let page_id = *doc.get_pages().get(&1).ok_or(StampError::EmptyDocument)?;

    let rgba = image::load_from_memory(seal)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8
        },
        alpha,
    ));
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id
        },
        rgb,
    ));

    let x = PAGE_WIDTH_PT - SEAL_RIGHT_INSET_PT - SEAL_SIZE_PT;
    let y = PAGE_HEIGHT_PT - SEAL_TOP_INSET_PT - SEAL_SIZE_PT;
    let overlay = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    SEAL_SIZE_PT.into(),
                    0f32.into(),
                    0f32.into(),
                    SEAL_SIZE_PT.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(SEAL_XOBJECT_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay.encode()?));

    attach_xobject(&mut doc, page_id, image_id)?;
    append_content(&mut doc, page_id, overlay_id)?;

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(lopdf::Error::from)?;
    Ok(out)
}

/// Register the seal image in the page's XObject resources, resolving the
/// Resources / XObject indirection variants a writer may have chosen.
fn attach_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    image_id: ObjectId,
) -> Result<(), StampError> {
    let resources_entry = doc.get_dictionary(page_id)?.get(b"Resources").cloned();

    match resources_entry {
        Ok(Object::Reference(resources_id)) => {
            let mut resources = doc.get_dictionary(resources_id)?.clone();
            merge_xobject(doc, &mut resources, image_id)?;
            doc.objects
                .insert(resources_id, Object::Dictionary(resources));
        }
        Ok(Object::Dictionary(existing)) => {
            let mut resources = existing;
            merge_xobject(doc, &mut resources, image_id)?;
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Dictionary(resources));
        }
        _ => {
            let mut resources = Dictionary::new();
            merge_xobject(doc, &mut resources, image_id)?;
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Dictionary(resources));
        }
    }
    Ok(())
}

fn merge_xobject(
    doc: &Document,
    resources: &mut Dictionary,
    image_id: ObjectId,
) -> Result<(), StampError> {
    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(existing)) => existing.clone(),
        Ok(Object::Reference(r)) => doc.get_dictionary(*r)?.clone(),
        _ => Dictionary::new(),
    };
    xobjects.set(SEAL_XOBJECT_NAME, Object::Reference(image_id));
    resources.set("XObject", Object::Dictionary(xobjects));
    Ok(())
}

fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    overlay_id: ObjectId,
) -> Result<(), StampError> {
    let page = doc.get_dictionary_mut(page_id)?;
    let new_contents = match page.get(b"Contents") {
        Ok(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(*existing),
            Object::Reference(overlay_id),
        ]),
        Ok(Object::Array(streams)) => {
            let mut streams = streams.clone();
            streams.push(Object::Reference(overlay_id));
            Object::Array(streams)
        }
        _ => Object::Reference(overlay_id),
    };
    page.set("Contents", new_contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> SealStamper {
        SealStamper::new(None, reqwest::Client::new())
    }

    fn configured() -> SealStamper {
        let config = SupabaseConfig {
            supabase_url: "https://myproject.supabase.co".to_string(),
            supabase_anon_key: "key".to_string(),
            bucket_name: "hanko".to_string(),
        };
        SealStamper::new(Some(&config), reqwest::Client::new())
    }

    #[test]
    fn rejects_plain_http() {
        let stamper = unconfigured();
        assert!(!stamper
            .is_trusted_seal_url("http://myproject.supabase.co/storage/v1/object/public/h/a.png"));
    }

    #[test]
    fn rejects_untrusted_host() {
        let stamper = unconfigured();
        assert!(!stamper.is_trusted_seal_url("https://evil.example.com/storage/v1/object/public/h/a.png"));
        // Suffix must match on a label boundary, not merely as a substring.
        assert!(!stamper
            .is_trusted_seal_url("https://supabase.co.evil.com/storage/v1/object/public/h/a.png"));
    }

    #[test]
    fn rejects_wrong_path_prefix() {
        let stamper = unconfigured();
        assert!(!stamper.is_trusted_seal_url("https://myproject.supabase.co/storage/v1/object/sign/h/a.png"));
        assert!(!stamper.is_trusted_seal_url("https://myproject.supabase.co/rest/v1/orders"));
    }

    #[test]
    fn rejects_internal_addresses() {
        let stamper = unconfigured();
        assert!(!stamper.is_trusted_seal_url("https://169.254.169.254/storage/v1/object/public/x"));
        assert!(!stamper.is_trusted_seal_url("https://localhost/storage/v1/object/public/x"));
    }

    #[test]
    fn accepts_public_object_on_known_suffix() {
        let stamper = unconfigured();
        assert!(stamper
            .is_trusted_seal_url("https://myproject.supabase.co/storage/v1/object/public/hanko/u/a.png"));
    }

    #[test]
    fn configured_host_must_match_exactly() {
        let stamper = configured();
        assert!(stamper
            .is_trusted_seal_url("https://myproject.supabase.co/storage/v1/object/public/hanko/u/a.png"));
        assert!(!stamper
            .is_trusted_seal_url("https://other.supabase.co/storage/v1/object/public/hanko/u/a.png"));
    }

    #[test]
    fn garbage_urls_are_rejected() {
        let stamper = unconfigured();
        assert!(!stamper.is_trusted_seal_url("not a url"));
        assert!(!stamper.is_trusted_seal_url("file:///etc/passwd"));
    }
}
