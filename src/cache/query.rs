//! Fingerprints for statement executions.

use super::key::CacheKey;
use super::part::KeyPart;

/// Builds the [`CacheKey`] an execution engine looks results up by.
///
/// Parts are always folded in the same order: statement id, offset, limit,
/// SQL text, each bound parameter, then the environment id if one is set.
#[derive(Debug, Clone)]
pub struct QueryKeyBuilder {
    statement_id: String,
    offset: usize,
    limit: usize,
    sql: String,
    params: Vec<KeyPart>,
    environment: Option<String>,
}

impl QueryKeyBuilder {
    /// Unbounded paging window by default.
    pub fn new(statement_id: impl Into<String>) -> Self {
        Self {
            statement_id: statement_id.into(),
            offset: 0,
            limit: i32::MAX as usize,
            sql: String::new(),
            params: Vec::new(),
            environment: None,
        }
    }

    pub fn with_paging(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = sql.into();
        self
    }

    pub fn with_param(mut self, value: impl Into<KeyPart>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn with_params<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyPart>,
    {
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn build(self) -> CacheKey {
        let mut parts = vec![
            KeyPart::Str(self.statement_id),
            KeyPart::from(self.offset),
            KeyPart::from(self.limit),
            KeyPart::Str(self.sql),
        ];
        parts.extend(self.params);
        if let Some(env) = self.environment {
            parts.push(KeyPart::Str(env));
        }
        CacheKey::from_parts(parts)
    }
}
