//! The [`Criteria`] context: every translation entry point, parameterised by
//! a [`CriteriaConfig`].

use std::collections::BTreeMap;

use docwhere_error::Result;
use docwhere_parser::{Parser, Token, Tokenizer, parse_where};
use docwhere_types::{
    Constraint, FindOptions, Predicate, Projection, SortDirection, SortSpec, Value,
};
use tracing::{debug, trace};

use crate::binds::{bind_format, bind_named, bind_positional};
use crate::config::CriteriaConfig;
use crate::hash::HashCondition;
use crate::statement::where_fragment;
use crate::trailing::read_trailing;

/// Field under which a server-side JavaScript condition is stored.
pub const WHERE_FUNC_FIELD: &str = "$where";

/// Translates SQL conditions into document predicates and find options.
///
/// Holds no state besides its configuration; share it freely.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    config: CriteriaConfig,
}

impl Criteria {
    /// # Errors
    ///
    /// Returns [`WhereError::Config`](docwhere_error::WhereError::Config) when
    /// `config` fails validation.
    pub fn new(config: CriteriaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &CriteriaConfig {
        &self.config
    }

    /// Parse a WHERE body. A trailing `ORDER`/`GROUP`/`LIMIT` clause ends
    /// the predicate and is ignored; use [`with_trailing`](Self::with_trailing)
    /// to translate it.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for text outside the supported subset.
    pub fn from_sql(&self, fragment: &str) -> Result<Predicate> {
        parse_where(fragment, self.config.strip_table_qualifiers)
    }

    /// Substitute positional `?` placeholders, then parse.
    ///
    /// # Errors
    ///
    /// Returns `BindCount` on a placeholder/value mismatch,
    /// `UnrepresentableBind` for a negative, fractional, boolean or null
    /// value, or a syntax error.
    pub fn from_binds(&self, template: &str, values: &[Value]) -> Result<Predicate> {
        let sql = bind_positional(template, values)?;
        trace!(template = template, sql = %sql, "bound positional values");
        self.from_sql(&sql)
    }

    /// Substitute named `:name` placeholders, then parse.
    ///
    /// # Errors
    ///
    /// Returns `MissingBind` for an unknown name, `UnrepresentableBind` as for
    /// [`from_binds`](Self::from_binds), or a syntax error.
    pub fn from_named_binds(
        &self,
        template: &str,
        values: &BTreeMap<String, Value>,
    ) -> Result<Predicate> {
        let sql = bind_named(template, values)?;
        trace!(template = template, sql = %sql, "bound named values");
        self.from_sql(&sql)
    }

    /// Substitute printf-style `%s` placeholders, then parse.
    ///
    /// # Errors
    ///
    /// Returns `BindCount` on a placeholder/value mismatch,
    /// `UnrepresentableBind` for a negative, fractional, boolean or null
    /// value, or a syntax error.
    pub fn from_format(&self, template: &str, values: &[Value]) -> Result<Predicate> {
        let sql = bind_format(template, values)?;
        trace!(template = template, sql = %sql, "bound format values");
        self.from_sql(&sql)
    }

    /// Add a server-side JavaScript condition to `predicate` under
    /// [`WHERE_FUNC_FIELD`], replacing any earlier one. `None` leaves the
    /// predicate as it is.
    ///
    /// [`Predicate::matches`] cannot run the function: a predicate carrying
    /// one never matches locally.
    #[must_use]
    pub fn with_where_func(&self, mut predicate: Predicate, code: Option<&str>) -> Predicate {
        if let Some(code) = code {
            let func: Predicate =
                [(WHERE_FUNC_FIELD, Constraint::Eq(Value::from(code)))].into_iter().collect();
            predicate.merge(func);
        }
        predicate
    }

    /// Build a predicate from hash conditions. Id aliases become the primary
    /// key; later entries for the same field replace earlier ones.
    #[must_use]
    pub fn from_hash<I, K>(&self, entries: I) -> Predicate
    where
        I: IntoIterator<Item = (K, HashCondition)>,
        K: AsRef<str>,
    {
        let predicate: Predicate = entries
            .into_iter()
            .map(|(field, condition)| {
                let field = self.config.canonical_field(field.as_ref()).to_owned();
                (field, condition.into_constraint())
            })
            .collect();
        debug!(fields = predicate.len(), "translated hash conditions");
        predicate
    }

    /// Match records by id: one id is an equality, several are `$in`
    /// (duplicates dropped, first occurrence kept). `None` for no ids.
    #[must_use]
    pub fn id_clause(&self, ids: &[Value]) -> Option<Predicate> {
        let mut unique: Vec<Value> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        let constraint = match unique.len() {
            0 => return None,
            1 => Constraint::Eq(unique.swap_remove(0)),
            _ => Constraint::In(unique),
        };
        let mut predicate = Predicate::new();
        predicate.insert(self.config.primary_key.clone(), constraint);
        Some(predicate)
    }

    /// Parse the WHERE clause of a complete statement such as
    /// `SELECT COUNT(*) FROM books WHERE n > 1`. No WHERE matches everything.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for an unsupported WHERE clause.
    pub fn from_statement(&self, sql: &str) -> Result<Predicate> {
        self.from_sql(where_fragment(sql))
    }

    /// Parse a WHERE body together with any trailing `ORDER BY`, `LIMIT` and
    /// `OFFSET` clauses. The body may be empty (`"ORDER BY n"`).
    ///
    /// # Errors
    ///
    /// Returns a syntax error for an unsupported body or trailing clause,
    /// including `GROUP BY`.
    pub fn with_trailing(&self, fragment: &str) -> Result<(Predicate, FindOptions)> {
        let mut tokenizer = Tokenizer::new(fragment);
        let first = tokenizer.next_token()?;
        let second = if first.is_some() { tokenizer.next_token()? } else { None };
        let starts_with_clause = first
            .as_ref()
            .is_some_and(|tok| opens_trailing_clause(tok, second.as_ref()));
        if let Some(tok) = second {
            tokenizer.push_back(tok);
        }
        if let Some(tok) = first {
            tokenizer.push_back(tok);
        }

        let mut parser = Parser::new(tokenizer);
        let predicate = if starts_with_clause {
            Predicate::new()
        } else {
            parser.parse_where(self.config.strip_table_qualifiers)?
        };
        let options = read_trailing(parser.tokenizer_mut(), &self.config)?;
        debug!(
            fields = predicate.len(),
            sorted = options.sort.is_some(),
            limit = options.limit,
            offset = options.offset,
            "translated where fragment with trailing clauses"
        );
        Ok((predicate, options))
    }

    /// Translate an ORDER BY list (without the keywords).
    #[must_use]
    pub fn sort(&self, order: &str) -> Option<SortSpec> {
        let parsed = SortSpec::parse(order)?;
        let mut sort = SortSpec::new();
        for (field, direction) in parsed.keys() {
            sort.push(self.config.column(field), *direction);
        }
        Some(sort)
    }

    /// Build a sort from `(field, direction)` pairs where a negative
    /// direction sorts descending. `None` for no pairs.
    #[must_use]
    pub fn sort_by_directions<I, K>(&self, pairs: I) -> Option<SortSpec>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut sort = SortSpec::new();
        for (field, direction) in pairs {
            sort.push(self.config.column(field.as_ref()), SortDirection::from_number(direction));
        }
        (!sort.is_empty()).then_some(sort)
    }

    /// Translate a SELECT list. `*` or an empty list selects every field.
    #[must_use]
    pub fn projection(&self, select: &str) -> Option<Projection> {
        let fields: Vec<&str> = select
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.contains(&"*") {
            return None;
        }
        Projection::from_fields(fields.into_iter().map(|f| self.config.column(f)))
    }

    /// Bundle finder arguments into [`FindOptions`].
    #[must_use]
    pub fn find_options(
        &self,
        select: Option<&str>,
        order: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> FindOptions {
        FindOptions {
            projection: select.and_then(|s| self.projection(s)),
            sort: order.and_then(|o| self.sort(o)),
            limit,
            offset,
        }
    }
}

/// `ORDER BY`, `GROUP BY` or `LIMIT <n>`. Anything else, such as
/// `limit = 5`, is a condition on a field with that name.
fn opens_trailing_clause(first: &Token, second: Option<&Token>) -> bool {
    if first.is_keyword("limit") {
        matches!(second, Some(Token::Integer(_)))
    } else {
        (first.is_keyword("order") || first.is_keyword("group"))
            && second.is_some_and(|tok| tok.is_keyword("by"))
    }
}
