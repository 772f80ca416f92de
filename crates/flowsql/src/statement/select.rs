//! `SELECT` column lists.

use crate::name_alias::NameAlias;
use crate::property::AsColumn;
use crate::statement::from::SelectFrom;
use crate::table::Adapter;

/// `SELECT` qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qualifier {
    #[default]
    None,
    Distinct,
    All,
}

/// The `SELECT [DISTINCT|ALL] <columns>` head of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    qualifier: Qualifier,
    columns: Vec<NameAlias>,
}

impl Select {
    /// Select `columns`; an empty list selects `*`.
    pub fn new(columns: &[&dyn AsColumn]) -> Self {
        Self {
            qualifier: Qualifier::None,
            columns: columns.iter().map(|c| c.column_name()).collect(),
        }
    }

    pub fn distinct(&self) -> Self {
        self.with_qualifier(Qualifier::Distinct)
    }

    pub fn all(&self) -> Self {
        self.with_qualifier(Qualifier::All)
    }

    fn with_qualifier(&self, qualifier: Qualifier) -> Self {
        Self {
            qualifier,
            ..self.clone()
        }
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn columns(&self) -> &[NameAlias] {
        &self.columns
    }

    /// Read from `adapter`'s table.
    pub fn from(&self, adapter: &impl Adapter) -> SelectFrom {
        SelectFrom::new(self.clone(), adapter.table())
    }

    pub fn query(&self) -> String {
        let mut sql = String::from("SELECT ");
        match self.qualifier {
            Qualifier::Distinct => sql.push_str("DISTINCT "),
            Qualifier::All => sql.push_str("ALL "),
            Qualifier::None => {}
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            let columns: Vec<String> = self.columns.iter().map(NameAlias::full_query).collect();
            sql.push_str(&columns.join(", "));
        }
        sql
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new(&[])
    }
}
