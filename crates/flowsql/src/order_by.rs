//! ORDER BY terms.

use crate::name_alias::NameAlias;
use crate::operator::Collate;

/// One ORDER BY term: `<column>[ COLLATE x][ ASC|DESC]`, or raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    column: Option<NameAlias>,
    ascending: Option<bool>,
    collation: Option<Collate>,
    raw: Option<String>,
}

impl OrderBy {
    /// A term without explicit direction.
    pub fn from_name_alias(column: NameAlias) -> Self {
        Self {
            column: Some(column),
            ascending: None,
            collation: None,
            raw: None,
        }
    }

    /// A trusted ordering expression rendered verbatim, e.g. `RANDOM()`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            column: None,
            ascending: None,
            collation: None,
            raw: Some(sql.into()),
        }
    }

    pub fn ascending(mut self) -> Self {
        self.ascending = Some(true);
        self
    }

    pub fn descending(mut self) -> Self {
        self.ascending = Some(false);
        self
    }

    pub fn collate(mut self, collation: Collate) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn query(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let mut sql = self
            .column
            .as_ref()
            .map(NameAlias::query)
            .unwrap_or_default();
        if let Some(collation) = self.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation.as_sql());
        }
        match self.ascending {
            Some(true) => sql.push_str(" ASC"),
            Some(false) => sql.push_str(" DESC"),
            None => {}
        }
        sql
    }
}

impl From<NameAlias> for OrderBy {
    fn from(column: NameAlias) -> Self {
        OrderBy::from_name_alias(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_and_collation() {
        let term = OrderBy::from_name_alias(NameAlias::of("name"));
        assert_eq!(term.query(), "`name`");
        assert_eq!(term.clone().descending().query(), "`name` DESC");
        assert_eq!(
            term.collate(Collate::RTrim).ascending().query(),
            "`name` COLLATE RTRIM ASC"
        );
    }

    #[test]
    fn raw_term() {
        assert_eq!(OrderBy::raw("RANDOM()").query(), "RANDOM()");
    }
}
