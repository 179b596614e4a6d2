//! Names for album folders and image files.
//!
//! Titles from the service are free text, so every on-disk name goes through
//! [`slugify`]. Within one album, [`SlugRegistry`] keeps names unique by
//! appending `-1`, `-2`, ... to repeats.

use std::collections::HashSet;

use url::Url;

/// Slug used when a title has no usable characters.
pub const UNTITLED_SLUG: &str = "untitled";

/// Longest slug produced, in bytes. Keeps room for prefixes and extensions.
const MAX_SLUG_LEN: usize = 120;

/// Extension used when neither the link nor the MIME type names one.
const FALLBACK_EXTENSION: &str = "bin";

/// Turns free text into a filesystem-safe, lower-case slug.
///
/// Latin letters with diacritics are folded to ASCII. Letters and digits from
/// other scripts are kept as they are (lower-cased). Every other run of
/// characters becomes a single `-`.
///
/// ```
/// use imgur_downloader::download::slugify;
///
/// assert_eq!(slugify("Crème Brûlée, Part 2!"), "creme-brulee-part-2");
/// assert_eq!(slugify("Кошки и Собаки"), "кошки-и-собаки");
/// assert_eq!(slugify("../../etc/passwd"), "etc-passwd");
/// assert_eq!(slugify("  ***  "), "untitled");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        let folded = if ch.is_ascii() { None } else { fold_to_ascii(ch) };
        if !ch.is_alphanumeric() && folded.is_none() {
            pending_separator = true;
            continue;
        }

        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;
        match folded {
            Some(replacement) => out.push_str(replacement),
            None => out.extend(ch.to_lowercase()),
        }

        if out.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    truncate_at_char_boundary(&mut out, MAX_SLUG_LEN);
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

fn truncate_at_char_boundary(text: &mut String, max_len: usize) {
    if text.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

fn fold_to_ascii(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä'
        | 'Å' | 'Ā' | 'Ă' | 'Ą' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'đ' | 'ð' | 'Ď' | 'Đ' | 'Ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => {
            "e"
        }
        'ğ' | 'Ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'İ' => "i",
        'ł' | 'ľ' | 'Ł' | 'Ľ' => "l",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø'
        | 'Ō' | 'Ő' => "o",
        'œ' | 'Œ' => "oe",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'ș' | 'ş' | 'Ś' | 'Š' | 'Ș' | 'Ş' => "s",
        'ß' => "ss",
        'ť' | 'ț' | 'ţ' | 'Ť' | 'Ț' | 'Ţ' => "t",
        'þ' | 'Þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => {
            "u"
        }
        'ý' | 'ÿ' | 'Ý' | 'Ÿ' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Hands out unique slugs within one scope (an album folder, or the set of
/// album folders of a run).
///
/// The first request for a slug gets it unchanged; repeats get `-1`, `-2`, ...
///
/// ```
/// use imgur_downloader::download::SlugRegistry;
///
/// let mut names = SlugRegistry::new();
/// assert_eq!(names.unique("Sunset"), "sunset");
/// assert_eq!(names.unique("sunset!"), "sunset-1");
/// assert_eq!(names.unique("Sunset"), "sunset-2");
/// ```
#[derive(Debug, Default, Clone)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry where `reserved` names are already taken.
    #[must_use]
    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// Slugifies `text` and returns a slug not handed out before.
    pub fn unique(&mut self, text: &str) -> String {
        self.next_free(slugify(text))
    }

    /// Claims `base` if it is free, otherwise the first free `base-N`.
    pub fn next_free(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut suffix: u64 = 1;
        loop {
            let candidate = format!("{base}-{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Claims `name` exactly. Returns `false` if it was already taken.
    pub fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// Returns whether `name` has been handed out or reserved.
    #[must_use]
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

/// Picks the file extension for an image, without the leading dot.
///
/// The extension in the link's last path segment wins; otherwise the MIME
/// subtype is used. `jpeg` is normalised to `jpg`.
///
/// ```
/// use imgur_downloader::download::image_extension;
///
/// assert_eq!(image_extension(Some("https://i.imgur.com/AAAAA.PNG"), Some("image/png")), "png");
/// assert_eq!(image_extension(Some("https://i.imgur.com/AAAAA"), Some("image/jpeg")), "jpg");
/// assert_eq!(image_extension(None, Some("video/mp4")), "mp4");
/// ```
#[must_use]
pub fn image_extension(link: Option<&str>, mime_type: Option<&str>) -> String {
    let extension = link
        .and_then(extension_from_link)
        .or_else(|| mime_type.and_then(extension_from_mime))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    if extension == "jpeg" {
        "jpg".to_string()
    } else {
        extension
    }
}

fn extension_from_link(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(last_segment).ok()?;
    let (_, ext) = decoded.rsplit_once('.')?;
    is_plain_extension(ext).then(|| ext.to_ascii_lowercase())
}

fn extension_from_mime(mime_type: &str) -> Option<String> {
    let essence = mime_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    // image/svg+xml -> svg
    let subtype = subtype.split('+').next()?;
    is_plain_extension(subtype).then(|| subtype.to_ascii_lowercase())
}

fn is_plain_extension(ext: &str) -> bool {
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Position prefix for ordered mode: `"<n> - "`, zero-padded to the digit
/// count of `total`.
///
/// ```
/// use imgur_downloader::download::ordered_prefix;
///
/// assert_eq!(ordered_prefix(3, 120), "003 - ");
/// assert_eq!(ordered_prefix(7, 9), "7 - ");
/// ```
#[must_use]
pub fn ordered_prefix(position: usize, total: usize) -> String {
    let width = total.max(1).to_string().len();
    format!("{position:0width$} - ")
}
