use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Select};

/// Per-entity limits for the `limit` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

impl PageBounds {
    pub const DRIVES: PageBounds = PageBounds {
        min: 1,
        max: 500,
        default: 100,
    };
    pub const LOSS: PageBounds = PageBounds {
        min: 1,
        max: 500,
        default: 100,
    };
    pub const FINANCIAL: PageBounds = PageBounds {
        min: 1,
        max: 1000,
        default: 200,
    };
}

/// A bounded row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    /// Builds a window from raw query-string values. Unparsable input falls back
    /// to the defaults rather than failing the request.
    pub fn clamp(limit: Option<&str>, offset: Option<&str>, bounds: PageBounds) -> Self {
        let limit = limit
            .and_then(parse_integer)
            .map(|l| l.clamp(bounds.min as i64, bounds.max as i64) as u64)
            .unwrap_or(bounds.default);
        let offset = offset
            .and_then(parse_integer)
            .map(|o| o.max(0) as u64)
            .unwrap_or(0);

        Self { limit, offset }
    }

    pub fn apply<E: EntityTrait>(&self, query: Select<E>) -> Select<E> {
        query.limit(self.limit).offset(self.offset)
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// A column taking part in free-text search.
#[derive(Debug, Clone, Copy)]
pub enum SearchColumn<C> {
    Text(C),
    /// Numeric column compared through `CAST(col AS TEXT)`.
    Cast(C),
}

/// Escapes the LIKE wildcards so the term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Accumulates list filters. Every predicate is optional and absent values
/// leave the query untouched.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    condition: Condition,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
        }
    }

    /// Add an exact match condition
    pub fn eq<C, V>(mut self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<sea_orm::Value>,
    {
        if let Some(value) = value {
            self.condition = self.condition.add(column.eq(value));
        }
        self
    }

    /// Inclusive range; either bound may be missing.
    pub fn between<C, V>(mut self, column: C, start: Option<V>, end: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<sea_orm::Value>,
    {
        if let Some(start) = start {
            self.condition = self.condition.add(column.gte(start));
        }
        if let Some(end) = end {
            self.condition = self.condition.add(column.lte(end));
        }
        self
    }

    /// OR of case-insensitive contains predicates over `columns`.
    pub fn contains_any<C: ColumnTrait>(
        mut self,
        term: Option<&str>,
        columns: &[SearchColumn<C>],
    ) -> Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        if columns.is_empty() {
            return self;
        }

        let patterns = search_patterns(term);
        let any = columns.iter().fold(Condition::any(), |acc, column| {
            let target: SimpleExpr = match column {
                SearchColumn::Text(c) => Expr::col((c.entity_name(), *c)).into(),
                SearchColumn::Cast(c) => {
                    Expr::col((c.entity_name(), *c)).cast_as(Alias::new("TEXT"))
                }
            };
            patterns.iter().fold(acc, |acc, pattern| {
                acc.add(
                    Expr::expr(Func::lower(target.clone()))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
            })
        });
        self.condition = self.condition.add(any);
        self
    }

    pub fn apply<E: EntityTrait>(self, query: Select<E>) -> Select<E> {
        if self.condition.is_empty() {
            return query;
        }
        query.filter(self.condition)
    }
}

/// LIKE patterns for `term`, matched against `LOWER(column)`.
///
/// SQLite's `LOWER` folds ASCII only, so a stored `MANUTENÇÃO` lowers to
/// `manutenÇÃo`. The term is tried as typed, lower-cased and upper-cased,
/// each ASCII-folded, which covers all-caps and all-lowercase accented text
/// on SQLite and full Unicode folding on Postgres.
fn search_patterns(term: &str) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::with_capacity(3);
    for variant in [term.to_string(), term.to_lowercase(), term.to_uppercase()] {
        let pattern = format!("%{}%", escape_like(&variant.to_ascii_lowercase()));
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }
    patterns
}
