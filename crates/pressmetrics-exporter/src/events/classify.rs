use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
    Other,
}

impl QueryType {
    /// Classifies a statement by its first keyword, ignoring case and
    /// leading whitespace.
    pub fn classify(sql: &str) -> Self {
        let statement = sql.trim_start();
        let keyword_len = statement
            .find(|ch: char| !ch.is_ascii_alphabetic())
            .unwrap_or(statement.len());
        let keyword = &statement[..keyword_len];

        [
            ("select", Self::Select),
            ("insert", Self::Insert),
            ("update", Self::Update),
            ("delete", Self::Delete),
            ("create", Self::Create),
            ("alter", Self::Alter),
            ("drop", Self::Drop),
        ]
        .into_iter()
        .find(|(name, _)| keyword.eq_ignore_ascii_case(name))
        .map_or(Self::Other, |(_, query_type)| query_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Alter => "alter",
            Self::Drop => "drop",
            Self::Other => "other",
        }
    }
}

/// Conditional tags of the page being rendered, as the host reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFlags {
    pub is_admin: bool,
    pub is_ajax: bool,
    pub is_home: bool,
    pub is_front_page: bool,
    pub is_single: bool,
    pub is_page: bool,
    pub is_category: bool,
    pub is_tag: bool,
    pub is_archive: bool,
    pub is_search: bool,
    pub is_404: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Admin,
    Home,
    Single,
    Page,
    Category,
    Tag,
    Archive,
    Search,
    NotFound,
    Other,
}

impl Endpoint {
    /// First matching flag wins, in fixed priority order.
    pub fn classify(flags: &RequestFlags) -> Self {
        [
            (flags.is_admin, Self::Admin),
            (flags.is_home || flags.is_front_page, Self::Home),
            (flags.is_single, Self::Single),
            (flags.is_page, Self::Page),
            (flags.is_category, Self::Category),
            (flags.is_tag, Self::Tag),
            (flags.is_archive, Self::Archive),
            (flags.is_search, Self::Search),
            (flags.is_404, Self::NotFound),
        ]
        .into_iter()
        .find(|(matched, _)| *matched)
        .map_or(Self::Other, |(_, endpoint)| endpoint)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Home => "home",
            Self::Single => "single",
            Self::Page => "page",
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Archive => "archive",
            Self::Search => "search",
            Self::NotFound => "404",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, QueryType, RequestFlags};

    #[test]
    fn classifies_by_first_keyword() {
        assert_eq!(QueryType::classify("  select * from x"), QueryType::Select);
        assert_eq!(QueryType::classify("DROP TABLE x"), QueryType::Drop);
        assert_eq!(QueryType::classify("EXEC sp_x"), QueryType::Other);
        assert_eq!(QueryType::classify("\n\tInsert INTO wp_posts"), QueryType::Insert);
        assert_eq!(QueryType::classify("ALTER TABLE wp_options"), QueryType::Alter);
    }

    #[test]
    fn classification_is_total() {
        assert_eq!(QueryType::classify(""), QueryType::Other);
        assert_eq!(QueryType::classify("   "), QueryType::Other);
        assert_eq!(QueryType::classify("(SELECT 1)"), QueryType::Other);
        assert_eq!(QueryType::classify("selection"), QueryType::Other);
        assert_eq!(QueryType::classify("update`wp_posts`"), QueryType::Update);
        assert_eq!(QueryType::classify("délete"), QueryType::Other);
    }

    #[test]
    fn admin_beats_archive() {
        let flags = RequestFlags {
            is_admin: true,
            is_archive: true,
            ..RequestFlags::default()
        };
        assert_eq!(Endpoint::classify(&flags), Endpoint::Admin);
    }

    #[test]
    fn front_page_is_home_and_unflagged_is_other() {
        let front = RequestFlags {
            is_front_page: true,
            is_page: true,
            ..RequestFlags::default()
        };
        assert_eq!(Endpoint::classify(&front), Endpoint::Home);
        assert_eq!(Endpoint::classify(&RequestFlags::default()), Endpoint::Other);

        let missing = RequestFlags {
            is_404: true,
            ..RequestFlags::default()
        };
        assert_eq!(Endpoint::classify(&missing).as_str(), "404");
    }

    #[test]
    fn flags_default_when_absent() {
        let flags: RequestFlags = serde_json::from_str(r#"{"is_single": true}"#).unwrap();
        assert!(flags.is_single);
        assert!(!flags.is_admin);
        assert_eq!(Endpoint::classify(&flags), Endpoint::Single);
    }
}
