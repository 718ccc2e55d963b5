use std::{collections::HashMap, sync::LazyLock};

use pressmetrics_common::{ExporterError, Result};
use regex::Regex;

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// `define( 'NAME', <expression> );` with the expression kept verbatim.
static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"define\(\s*['"]([A-Z_][A-Z0-9_]*)['"]\s*,\s*(.+?)\s*\)\s*;"#)
        .expect("define pattern is valid")
});

static LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^['"]([^'"]*)['"]$"#).expect("literal pattern is valid"));

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$table_prefix\s*=\s*['"]([^'"]*)['"]"#).expect("prefix pattern is valid")
});

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$wp_version\s*=\s*['"]([^'"]+)['"]"#).expect("version pattern is valid")
});

/// Settings extracted from `wp-config.php` without executing it.
///
/// Values computed at runtime (`getenv_docker(...)`, constants, concatenation)
/// cannot be known statically and are left as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WpConfig {
    pub db_name: Option<String>,
    pub db_host: Option<String>,
    pub table_prefix: String,
}

impl WpConfig {
    /// Fails only when `DB_NAME` is never defined; any expression is accepted.
    pub fn parse(source: &str) -> Result<Self> {
        let defines = DEFINE_RE
            .captures_iter(source)
            .map(|captures| (captures[1].to_string(), captures[2].trim().to_string()))
            .collect::<HashMap<_, _>>();

        let db_name = defines
            .get("DB_NAME")
            .filter(|expression| !expression.is_empty())
            .ok_or_else(|| {
                ExporterError::BootstrapFailed("DB_NAME is not defined in wp-config.php".to_string())
            })?;

        let db_host = match defines.get("DB_HOST") {
            Some(expression) => literal(expression),
            None => Some(DEFAULT_DB_HOST.to_string()),
        };

        let table_prefix = PREFIX_RE
            .captures(source)
            .map(|captures| captures[1].to_string())
            .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string());

        Ok(Self {
            db_name: literal(db_name),
            db_host,
            table_prefix,
        })
    }
}

fn literal(expression: &str) -> Option<String> {
    LITERAL_RE
        .captures(expression)
        .map(|captures| captures[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts `$wp_version` from `wp-includes/version.php`.
pub fn parse_wp_version(source: &str) -> Option<String> {
    VERSION_RE
        .captures(source)
        .map(|captures| captures[1].to_string())
}
