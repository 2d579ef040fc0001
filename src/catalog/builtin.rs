//! Built-in downloader presets.

use preset_engine::{Overrides, Preset, PresetError, PARENTS_KEY};
use serde_json::{json, Value};

/// Values the built-in presets are parameterized on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogContext {
    /// Absolute output root, `/`-separated, without a trailing slash
    pub output_root: String,

    /// Firefox profile for cookie extraction; `None` drops the cookie option
    pub browser_profile: Option<String>,
}

impl CatalogContext {
    pub fn new(output_root: impl AsRef<str>, browser_profile: Option<String>) -> Self {
        Self {
            output_root: normalize_root(output_root.as_ref()),
            browser_profile,
        }
    }

    fn template(&self, rest: &str) -> Value {
        json!({ "default": format!("{}/{}", self.output_root, rest) })
    }
}

/// Use forward slashes and drop any trailing separator.
fn normalize_root(root: &str) -> String {
    root.replace('\\', "/").trim_end_matches('/').to_string()
}

const UPLOADER_TEMPLATE: &str =
    "%(webpage_url_domain)s/%(uploader_id)s/[%(upload_date>%Y-%m-%d)s] [%(id)s] %(title)s.%(ext)s";
const CHANNEL_TEMPLATE: &str =
    "%(webpage_url_domain)s/%(channel)s/[%(upload_date>%Y-%m-%d)s] [%(id)s] %(title)s.%(ext)s";
const FLAT_TEMPLATE: &str = "[%(upload_date>%Y-%m-%d)s] %(title)s.%(ext)s";

const FIREFOX_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:140.0)Gecko/20100101 Firefox/140.0";

/// Notice shown after selecting a preset whose site has no audio-only streams.
fn audio_fallback_notice(site: &str) -> String {
    format!(
        "{} does not support audio-only streams, so the full highest-quality video will be downloaded.",
        site.to_uppercase()
    )
}

fn object(value: Value) -> Overrides {
    match value {
        Value::Object(map) => map,
        _ => Overrides::new(),
    }
}

fn inherits(parents: &[&str]) -> Overrides {
    let mut map = Overrides::new();
    map.insert(PARENTS_KEY.to_string(), json!(parents));
    map
}

/// Raw preset mappings in declaration order.
///
/// Parents are declared inline with `_inherits`, the same notation catalog
/// files may use.
pub fn builtin_mappings(ctx: &CatalogContext) -> Vec<(&'static str, Overrides)> {
    let mut bunny = object(json!({
        "concurrent_fragment_downloads": 4,
        "http_headers": {
            "Referer": "https://iframe.mediadelivery.net/",
            "User-Agent": FIREFOX_USER_AGENT
        },
        "nopart": true,
        "outtmpl": ctx.template(FLAT_TEMPLATE),
        "ratelimit": 8250000
    }));
    if let Some(ref profile) = ctx.browser_profile {
        bunny.insert(
            "cookiesfrombrowser".to_string(),
            json!(["firefox", profile, null, null]),
        );
    }

    vec![
        (
            "_default",
            object(json!({
                "concurrent_fragment_downloads": 3,
                "merge_output_format": "mkv",
                "outtmpl": ctx.template(UPLOADER_TEMPLATE),
                "postprocessors": [{
                    "add_chapters": true,
                    "add_infojson": "if_exists",
                    "add_metadata": true,
                    "key": "FFmpegMetadata"
                }],
                "ratelimit": 6250000,
                "restrictfilenames": true,
                "writeannotations": true,
                "writedescription": true,
                "writeinfojson": true
            })),
        ),
        (
            "_audio-only",
            object(json!({
                "format": "bestaudio/best",
                "postprocessors": [{
                    "key": "FFmpegExtractAudio",
                    "nopostoverwrites": false,
                    "preferredcodec": "best",
                    "preferredquality": "0"
                }]
            })),
        ),
        ("youtube", Overrides::new()),
        ("youtube-audio", inherits(&["_audio-only"])),
        ("twitch", object(json!({ "throttledratelimit": 1000000 }))),
        ("twitch-audio", inherits(&["_audio-only", "twitch"])),
        ("kick", object(json!({ "outtmpl": ctx.template(CHANNEL_TEMPLATE) }))),
        ("kick-audio", inherits(&["_audio-only", "kick"])),
        ("bunny", bunny),
    ]
}

/// Built-in presets, parents lifted out of the inline declarations.
pub fn builtin_presets(ctx: &CatalogContext) -> Result<Vec<Preset>, PresetError> {
    builtin_mappings(ctx)
        .into_iter()
        .map(|(name, mapping)| Preset::from_mapping(name, mapping))
        .collect()
}

/// Post-selection notices for built-in presets.
pub fn builtin_notices() -> Vec<(&'static str, String)> {
    vec![
        ("youtube-audio", audio_fallback_notice("youtube")),
        ("kick-audio", audio_fallback_notice("kick")),
    ]
}
