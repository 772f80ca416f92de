//! Identifier handling for columns, tables and their aliases.
//!
//! A [`NameAlias`] describes one reference to a name inside a statement: the raw name, an
//! optional table qualifier, an optional `AS` alias and an optional keyword prefix such as
//! `DISTINCT`. Names are quoted with SQLite backticks unless the alias was built raw.
//!
//! # Example
//! ```
//! use flowsql::NameAlias;
//!
//! let name = NameAlias::builder("name").with_table("users").alias("n").build();
//! assert_eq!(name.query(), "`users`.`name`");
//! assert_eq!(name.full_query(), "`users`.`name` AS `n`");
//! ```

use std::fmt;

const QUOTE: char = '`';

/// Quote `name` with backticks unless it is empty or already quoted.
pub fn quote_if_needed(name: &str) -> String {
    if name.is_empty() || is_quoted(name) {
        name.to_string()
    } else {
        format!("{QUOTE}{}{QUOTE}", name.replace(QUOTE, "``"))
    }
}

/// Strip one level of backtick quoting, if present.
pub fn strip_quotation(name: &str) -> &str {
    if is_quoted(name) {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

fn is_quoted(name: &str) -> bool {
    name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE)
}

/// An identifier descriptor: name, table qualifier, alias and keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAlias {
    name: String,
    alias: Option<String>,
    table: Option<String>,
    keyword: Option<String>,
    quote_name: bool,
    quote_alias: bool,
}

impl NameAlias {
    /// A quoted name without table or alias.
    pub fn of(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// A name rendered verbatim (expressions, `*`, function calls).
    pub fn raw(name: impl Into<String>) -> Self {
        Self::raw_builder(name).build()
    }

    /// Start building a quoted name.
    pub fn builder(name: impl Into<String>) -> NameAliasBuilder {
        NameAliasBuilder::new(name.into(), true)
    }

    /// Start building a raw (unquoted) name.
    pub fn raw_builder(name: impl Into<String>) -> NameAliasBuilder {
        NameAliasBuilder::new(name.into(), false)
    }

    /// Join two rendered names with an infix operator into a raw name: `a <op> b`.
    pub fn join_names(operation: &str, left: &str, right: &str) -> Self {
        Self::raw(format!("{left} {operation} {right}"))
    }

    /// The name as rendered, without table, keyword or alias.
    pub fn name(&self) -> String {
        if self.quote_name {
            quote_if_needed(&self.name)
        } else {
            self.name.clone()
        }
    }

    /// The unquoted name.
    pub fn name_raw(&self) -> &str {
        strip_quotation(&self.name)
    }

    /// The rendered alias, if any.
    pub fn alias_name(&self) -> Option<String> {
        self.alias.as_ref().map(|alias| {
            if self.quote_alias {
                quote_if_needed(alias)
            } else {
                alias.clone()
            }
        })
    }

    /// The unquoted alias, if any.
    pub fn alias_name_raw(&self) -> Option<&str> {
        self.alias.as_deref().map(strip_quotation)
    }

    /// The table qualifier, unquoted.
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The keyword prefix, e.g. `DISTINCT`.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Whether this name is rendered without quoting.
    pub fn is_raw(&self) -> bool {
        !self.quote_name
    }

    /// The alias if present, otherwise the name. Used as the column key in result rows.
    pub fn name_as_key(&self) -> String {
        match self.alias_name() {
            Some(alias) => alias,
            None => self.name(),
        }
    }

    /// `table.name`, without keyword or alias.
    pub fn full_name(&self) -> String {
        match &self.table {
            Some(table) if !self.name.is_empty() => {
                format!("{}.{}", quote_if_needed(table), self.name())
            }
            _ => self.name(),
        }
    }

    /// `[keyword ]table.name`, the form used inside predicates.
    pub fn query(&self) -> String {
        match &self.keyword {
            Some(keyword) => format!("{} {}", keyword, self.full_name()),
            None => self.full_name(),
        }
    }

    /// `[keyword ]table.name[ AS alias]`, the form used in column lists.
    pub fn full_query(&self) -> String {
        match self.alias_name() {
            Some(alias) => format!("{} AS {}", self.query(), alias),
            None => self.query(),
        }
    }

    /// Return a builder seeded with this name's settings.
    pub fn new_builder(&self) -> NameAliasBuilder {
        NameAliasBuilder {
            inner: self.clone(),
        }
    }

    /// Copy of this name qualified with `table`.
    pub fn with_table(&self, table: impl Into<String>) -> Self {
        self.new_builder().with_table(table).build()
    }

    /// Copy of this name with an `AS` alias.
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        self.new_builder().alias(alias).build()
    }

    /// Copy of this name prefixed with `DISTINCT`.
    pub fn distinct(&self) -> Self {
        self.new_builder().keyword("DISTINCT").build()
    }
}

impl fmt::Display for NameAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_query())
    }
}

/// Fluent builder for [`NameAlias`].
#[derive(Debug, Clone)]
pub struct NameAliasBuilder {
    inner: NameAlias,
}

impl NameAliasBuilder {
    fn new(name: String, quote: bool) -> Self {
        let quote_name = quote && !name.is_empty();
        Self {
            inner: NameAlias {
                name,
                alias: None,
                table: None,
                keyword: None,
                quote_name,
                quote_alias: true,
            },
        }
    }

    /// Set the `AS` alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.inner.alias = Some(alias.into());
        self
    }

    /// Qualify with a table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.inner.table = Some(table.into());
        self
    }

    /// Prefix the rendered name with a keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.inner.keyword = Some(keyword.into());
        self
    }

    /// Whether backticks are added around the name.
    pub fn should_add_identifier_to_name(mut self, quote: bool) -> Self {
        self.inner.quote_name = quote && !self.inner.name.is_empty();
        self
    }

    /// Whether backticks are added around the alias.
    pub fn should_add_identifier_to_alias(mut self, quote: bool) -> Self {
        self.inner.quote_alias = quote;
        self
    }

    /// Finish.
    pub fn build(self) -> NameAlias {
        self.inner
    }
}

impl From<&str> for NameAlias {
    fn from(name: &str) -> Self {
        NameAlias::of(name)
    }
}

impl From<String> for NameAlias {
    fn from(name: String) -> Self {
        NameAlias::of(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_names() {
        assert_eq!(NameAlias::of("name").query(), "`name`");
    }

    #[test]
    fn raw_names_are_verbatim() {
        assert_eq!(NameAlias::raw("COUNT(*)").query(), "COUNT(*)");
    }

    #[test]
    fn already_quoted_names_are_not_requoted() {
        assert_eq!(NameAlias::of("`name`").query(), "`name`");
        assert_eq!(NameAlias::of("`name`").name_raw(), "name");
    }

    #[test]
    fn empty_name_renders_empty() {
        let empty = NameAlias::of("");
        assert_eq!(empty.query(), "");
        assert_eq!(empty.with_table("users").query(), "");
    }

    #[test]
    fn table_alias_and_keyword() {
        let name = NameAlias::builder("id")
            .with_table("users")
            .alias("user_id")
            .keyword("DISTINCT")
            .build();
        assert_eq!(name.query(), "DISTINCT `users`.`id`");
        assert_eq!(name.full_query(), "DISTINCT `users`.`id` AS `user_id`");
        assert_eq!(name.name_as_key(), "`user_id`");
    }

    #[test]
    fn with_table_returns_new_value() {
        let name = NameAlias::of("id");
        let qualified = name.with_table("t");
        assert_eq!(name.query(), "`id`");
        assert_eq!(qualified.query(), "`t`.`id`");
        assert_ne!(name, qualified);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(NameAlias::of("a").with_alias("b"), NameAlias::of("a").with_alias("b"));
    }

    #[test]
    fn join_names_is_raw() {
        let joined = NameAlias::join_names("+", "`a`", "`b`");
        assert_eq!(joined.query(), "`a` + `b`");
        assert!(joined.is_raw());
    }

    #[test]
    fn unquoted_alias() {
        let name = NameAlias::raw_builder("COUNT(*)")
            .alias("total")
            .should_add_identifier_to_alias(false)
            .build();
        assert_eq!(name.full_query(), "COUNT(*) AS total");
    }
}
