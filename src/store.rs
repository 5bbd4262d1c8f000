//! Read access to the data store, a PostgREST API (as exposed by Supabase).
//!
//! Queries are described by [`Select`], a plain value that can be inspected and tested,
//! and executed by a [`Backend`]. [`Store`] is the HTTP backend.

use std::future::Future;

use reqwest::{RequestBuilder, Response, header::CONTENT_RANGE};
use serde::de::DeserializeOwned;

use crate::{error::StoreError, model::Rows};

/// A row filter on one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Eq(&'static str, String),
    Gte(&'static str, String),
    Lte(&'static str, String),
    /// Case-insensitive match of a pattern where `*` stands for any string
    Ilike(&'static str, String),
    /// Rows matching at least one of the filters
    Or(Vec<Filter>),
}

impl Filter {
    /// Case-insensitive "contains".
    pub fn contains(column: &'static str, needle: &str) -> Self {
        Filter::Ilike(column, format!("*{needle}*"))
    }

    fn operator(&self) -> &'static str {
        match self {
            Filter::Eq(..) => "eq",
            Filter::Gte(..) => "gte",
            Filter::Lte(..) => "lte",
            Filter::Ilike(..) => "ilike",
            Filter::Or(..) => "or",
        }
    }

    /// Query-string pair of this filter.
    fn to_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(col, val)
            | Filter::Gte(col, val)
            | Filter::Lte(col, val)
            | Filter::Ilike(col, val) => (col.to_string(), format!("{}.{val}", self.operator())),
            Filter::Or(filters) => ("or".into(), format!("({})", nested(filters))),
        }
    }

    /// Form of this filter inside a logical operator: `col.op.value`.
    fn to_nested(&self) -> String {
        match self {
            Filter::Eq(col, val)
            | Filter::Gte(col, val)
            | Filter::Lte(col, val)
            | Filter::Ilike(col, val) => format!("{col}.{}.{val}", self.operator()),
            Filter::Or(filters) => format!("or({})", nested(filters)),
        }
    }
}

fn nested(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::to_nested)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
    pub nulls_last: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
            nulls_last: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
            nulls_last: false,
        }
    }

    pub fn nulls_last(self) -> Self {
        Self {
            nulls_last: true,
            ..self
        }
    }

    fn encode(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        if self.nulls_last {
            format!("{}.{direction}.nullslast", self.column)
        } else {
            format!("{}.{direction}", self.column)
        }
    }
}

/// A read query on one table or view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Select {
    table: &'static str,
    columns: &'static str,
    filters: Vec<Filter>,
    order: Vec<Order>,
    offset: Option<u64>,
    limit: Option<u64>,
    count: bool,
    head: bool,
}

impl Select {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: "*",
            filters: vec![],
            order: vec![],
            offset: None,
            limit: None,
            count: false,
            head: false,
        }
    }

    /// Comma-separated list of the columns to return.
    pub fn columns(self, columns: &'static str) -> Self {
        Self { columns, ..self }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &'static str, value: impl ToString) -> Self {
        self.filter(Filter::Eq(column, value.to_string()))
    }

    pub fn gte(self, column: &'static str, value: impl ToString) -> Self {
        self.filter(Filter::Gte(column, value.to_string()))
    }

    pub fn lte(self, column: &'static str, value: impl ToString) -> Self {
        self.filter(Filter::Lte(column, value.to_string()))
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Keep `limit` rows starting at row `offset` (0-based).
    pub fn range(self, offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            ..self
        }
    }

    pub fn limit(self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    /// Ask for the exact number of matching rows.
    pub fn exact_count(self) -> Self {
        Self {
            count: true,
            ..self
        }
    }

    /// Ask for the count only, without any row.
    pub fn head(self) -> Self {
        Self {
            head: true,
            count: true,
            ..self
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    #[cfg(test)]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[cfg(test)]
    pub fn orders(&self) -> &[Order] {
        &self.order
    }

    #[cfg(test)]
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    #[cfg(test)]
    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn wants_count(&self) -> bool {
        self.count
    }

    pub fn is_head(&self) -> bool {
        self.head
    }

    /// The PostgREST query string of this query, as key/value pairs.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.to_string())];
        pairs.extend(self.filters.iter().map(Filter::to_pair));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(Order::encode)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".into(), order));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".into(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        pairs
    }
}

/// Anything able to run [`Select`] queries and database functions.
pub trait Backend: Sync {
    fn select<T>(&self, query: &Select) -> impl Future<Output = Result<Rows<T>, StoreError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Call a database function returning a set of rows.
    fn rpc<T>(
        &self,
        function: &str,
        args: &serde_json::Value,
    ) -> impl Future<Output = Result<Vec<T>, StoreError>> + Send
    where
        T: DeserializeOwned + Send;
}

/// The HTTP client of the data store.
///
/// A store built without URL or key is "unconfigured": every query fails with
/// [`StoreError::NotConfigured`], so that every list renders empty.
#[derive(Clone)]
pub struct Store {
    client: reqwest::Client,
    endpoint: Option<Endpoint>,
}

#[derive(Clone)]
struct Endpoint {
    /// Root of the REST API, without trailing slash
    rest_url: String,
    key: String,
}

impl Endpoint {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.key).bearer_auth(&self.key)
    }
}

impl Store {
    pub fn new(url: Option<&str>, key: Option<&str>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        let endpoint = match (url.map(str::trim), key.map(str::trim)) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some(Endpoint {
                rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
                key: key.to_string(),
            }),
            _ => {
                log::debug!("Supabase URL or key missing");
                None
            }
        };
        Ok(Self { client, endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl Backend for Store {
    async fn select<T>(&self, query: &Select) -> Result<Rows<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        let endpoint = self.endpoint.as_ref().ok_or(StoreError::NotConfigured)?;
        let url = format!("{}/{}", endpoint.rest_url, query.table_name());
        let pairs = query.to_query_pairs();
        log::debug!("Selecting from {url} with {pairs:?}");

        let request = if query.is_head() {
            self.client.head(&url)
        } else {
            self.client.get(&url)
        };
        let mut request = endpoint.authorize(request).query(&pairs);
        if query.wants_count() {
            request = request.header("Prefer", "count=exact");
        }
        let response = request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(StoreError::http)?;
        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let items: Vec<T> = if query.is_head() {
            vec![]
        } else {
            response.json().await.map_err(StoreError::decode)?
        };
        let total = match content_range {
            Some(range) if query.wants_count() => parse_content_range(&range)?,
            _ => None,
        };
        let total = total.unwrap_or(items.len() as u64);
        log::trace!("{} rows of {total} from {url}", items.len());
        Ok(Rows { items, total })
    }

    async fn rpc<T>(&self, function: &str, args: &serde_json::Value) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        let endpoint = self.endpoint.as_ref().ok_or(StoreError::NotConfigured)?;
        let url = format!("{}/rpc/{function}", endpoint.rest_url);
        log::debug!("Calling {url} with {args}");
        endpoint
            .authorize(self.client.post(&url))
            .json(args)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(StoreError::http)?
            .json()
            .await
            .map_err(StoreError::decode)
    }
}

/// Extract the total from a `Content-Range` header such as `0-23/1234` or `*/0`.
///
/// Returns `None` when the total is unknown (`0-23/*`).
pub fn parse_content_range(header: &str) -> Result<Option<u64>, StoreError> {
    let malformed = || StoreError::ContentRange(header.to_string());
    let (_, total) = header.trim().rsplit_once('/').ok_or_else(malformed)?;
    match total {
        "*" => Ok(None),
        total => total.parse().map(Some).map_err(|_| malformed()),
    }
}
