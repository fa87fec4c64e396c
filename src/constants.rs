//! Shared constants for on-disk layout and defaults.

/// Prefix of every forward-index page key (`page_<N>`).
pub const PAGE_KEY_PREFIX: &str = "page_";

/// Category every taxonomy contains and every unknown category falls back to.
pub const OTHER_CATEGORY: &str = "Other";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LOOKBOOK_CONFIG";
/// Environment variable overriding `data_dir` from any config source.
pub const DATA_DIR_ENV_VAR: &str = "LOOKBOOK_DATA_DIR";
/// Sub-directory of the platform config dir searched by `CatalogConfig::discover`.
pub const CONFIG_DIR_NAME: &str = "lookbook";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Timestamp format appended to backup copies (`<stem>_<stamp>.json`).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Image extensions recognised when scanning a page image directory.
pub const PAGE_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Known brand names used to detect concatenated dual-item OCR strings.
pub const DEFAULT_BRANDS: &[&str] = &[
    "The Row",
    "Saint Laurent",
    "Loro Piana",
    "Brunello Cucinelli",
    "Bottega Veneta",
    "Prada",
    "Gucci",
    "Hermès",
    "Celine",
    "Loewe",
    "Tom Ford",
    "Zegna",
    "Kiton",
    "Brioni",
    "Berluti",
    "John Lobb",
    "Church's",
    "Alden",
    "Drake's",
    "Sunspel",
    "Zimmerli",
    "Auralee",
    "Lemaire",
    "Acne Studios",
    "A.P.C.",
    "Our Legacy",
    "Margaret Howell",
    "Ralph Lauren",
    "Polo Ralph Lauren",
    "Paraboot",
    "J.M. Weston",
    "Common Projects",
    "Todd Snyder",
    "Buck Mason",
    "Uniqlo",
    "Jil Sander",
    "Dries Van Noten",
    "Officine Générale",
    "Barbour",
    "Baracuta",
    "Incotex",
    "Rubinacci",
    "Cartier",
    "Rolex",
    "Persol",
    "Oliver Peoples",
    "Moncler",
    "Max Mara",
];

/// Stray tokens OCR glues to the front of a name ("i The Row loafer").
pub const DEFAULT_CONNECTORS: &[&str] = &[
    "a", "an", "i", "l", "by", "in", "on", "at", "of", "with", "and", "&", "-", "•", "*", "|",
];

/// Markers joining two brands into one collaboration ("Sunspel x Lemaire").
pub const DEFAULT_COLLAB_MARKERS: &[&str] = &["x", "×", "for", "&"];
